//! Document assembly engine - turns a report submission into a finished PDF.
//!
//! The pipeline has four independent resolvers feeding one assembler:
//! - `people` normalizes the dynamic attendee lists,
//! - `images` validates gallery and annexure uploads,
//! - `charts` renders feedback tallies to bar-chart images,
//! - `template` picks the organization's report skeleton,
//! and `engine` substitutes all of it into the template and compiles the
//! result with the Typst CLI.

pub mod charts;
pub mod common;
pub mod engine;
pub mod images;
pub mod people;
pub mod request;
pub mod template;

pub use charts::{render_feedback_charts, ChartOutcome, ChartSet};
pub use engine::{assemble, generate_report};
pub use images::{resolve_image_groups, ImageFailure, ImageResolution, ResolvedImage};
pub use people::resolve_person_groups;
pub use request::{
    FeedbackCounts, FeedbackQuestion, ImagePolicy, PersonEntry, ReportRequest, ReportSubmission,
};
pub use template::{Organization, Template};

use thiserror::Error;

/// Errors that can occur while assembling a report document.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("unknown organization '{0}'")]
    UnknownOrganization(String),
    #[error("failed to load report template '{name}': {source}")]
    TemplateLoad {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{} image slot(s) failed validation", .0.len())]
    InvalidImages(Vec<ImageFailure>),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write embedded image '{name}': {source}")]
    WriteImage {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write Typst source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
}

impl AssemblyError {
    /// True when the error is the caller's fault rather than a server-side
    /// failure, so HTTP handlers can pick a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssemblyError::UnknownOrganization(_) | AssemblyError::InvalidImages(_)
        )
    }
}

/// Result of a successful report generation.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub generated_at: String,
}
