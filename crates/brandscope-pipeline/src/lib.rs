//! Comparative analysis orchestration for brandscope.
//!
//! [`Analyzer`] sequences the collaborators in `brandscope-sources` and the
//! computations in `brandscope-metrics` into one [`AnalysisReport`];
//! [`run_session`] drives a stored session through it and persists the
//! result.

pub mod analyzer;
pub mod collect;
pub mod error;
pub mod insights;
pub mod options;
pub mod report;
pub mod session;

pub use analyzer::Analyzer;
pub use error::PipelineError;
pub use insights::{finalize_insights, strip_frequency_advice, INSIGHT_TEMPERATURE};
pub use options::AnalysisOptions;
pub use report::{AnalysisReport, BrandKeywords};
pub use session::{run_session, session_request};
