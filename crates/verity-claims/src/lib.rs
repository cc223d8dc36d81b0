#![deny(missing_docs)]
#![doc = "Claim registry and verifier: binds published numbers to evaluator outputs, checks them within tolerance and records provenance for every run."]

/// Cooperative cancellation between claims.
pub mod cancel;
pub mod claim;
pub mod claimset;
pub mod formula;
pub mod memo;
/// Run policy.
pub mod policy;
pub mod registry;
pub mod report;
pub mod verifier;

pub use cancel::CancelToken;
pub use claim::{Claim, Expectation, Source};
pub use claimset::{ClaimSet, ClaimSetFile, ClaimSpec};
pub use formula::Derivation;
pub use memo::MemoTable;
pub use policy::VerifyPolicy;
pub use registry::ClaimRegistry;
pub use report::{ClaimOutcome, ClaimStatus, FailingMargin, VerificationReport};
pub use verifier::Verifier;
