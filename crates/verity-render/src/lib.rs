//! Renderer boundary: turns result records into figure data files.
//!
//! Renderers never transform numbers. Every artefact carries its own SHA-256
//! and the checksum of the snapshot whose record it was drawn from.

pub mod artifact;
pub mod csv_series;
pub mod json_record;
pub mod output;
pub mod spec;

pub use artifact::RenderedArtifact;
pub use csv_series::CsvSeriesRenderer;
pub use json_record::JsonRecordRenderer;
pub use output::{write_artifacts, ArtifactManifest, ManifestEntry};
pub use spec::{FigureKind, FigureSpec, RenderSpec};

use verity_core::{ResultRecord, VerityError};

/// A renderer for one figure kind.
pub trait FigureRenderer: Send + Sync {
    /// Kind handled by this renderer.
    fn kind(&self) -> FigureKind;

    /// Renders `figure` from `record`.
    fn render(&self, figure: &FigureSpec, record: &ResultRecord) -> Result<RenderedArtifact, VerityError>;
}

/// Renders one figure with the built-in renderer for its kind.
pub fn render_figure(figure: &FigureSpec, record: &ResultRecord) -> Result<RenderedArtifact, VerityError> {
    match figure.kind {
        FigureKind::SeriesCsv => CsvSeriesRenderer.render(figure, record),
        FigureKind::RecordJson => JsonRecordRenderer.render(figure, record),
    }
}
