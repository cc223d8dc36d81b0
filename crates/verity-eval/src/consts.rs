/// Avogadro constant (1/mol).
pub const AVOGADRO: f64 = 6.022_140_76e23;
/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Boltzmann constant (J/K).
pub const BOLTZMANN_J: f64 = 1.380_649e-23;
/// Boltzmann constant (eV/K).
pub const BOLTZMANN_EV: f64 = 8.617e-5;
/// Faraday constant (C/mol).
pub const FARADAY: f64 = 96_485.0;
/// Vacuum permittivity (F/m).
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_817e-12;
/// Lithium molar volume (m^3/mol).
pub const LI_MOLAR_VOLUME: f64 = 13.0e-6;
/// Zero Celsius in kelvin.
pub const ZERO_CELSIUS_K: f64 = 273.15;
/// Reference temperature for Arrhenius factors (K).
pub const REFERENCE_TEMPERATURE_K: f64 = 298.15;
/// Square angstrom per picosecond expressed in m^2/s.
pub const A2_PER_PS_TO_M2_PER_S: f64 = 1e-8;
