use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::assembly::ImageFailure;

/// Multipart form shape for report generation, for API documentation. The
/// real payload additionally carries repeated person arrays, numbered image
/// slots, and per-question feedback counts as described in the form
/// contract.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateReportRequest {
    #[allow(unused)]
    #[schema(example = "RRECL")]
    pub organization: String,
    #[allow(unused)]
    pub event_title: Option<String>,
    #[allow(unused)]
    pub event_date: Option<String>,
    #[allow(unused)]
    pub venue: Option<String>,
    #[allow(unused)]
    pub gallery_image_1: Option<Vec<u8>>,
    #[allow(unused)]
    pub gallery_caption_1: Option<String>,
    #[allow(unused)]
    pub question_1_strongly_agree: Option<u32>,
}

/// Successful generation response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    #[schema(example = "rrecl-report-20250806120000-1a2b3c4d.pdf")]
    pub filename: String,
    #[schema(example = "/api/reports/rrecl-report-20250806120000-1a2b3c4d.pdf")]
    pub download_url: String,
    pub generated_at: String,
}

/// Rejection body listing every image slot that failed validation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageRejectionResponse {
    pub error: String,
    pub failures: Vec<ImageFailure>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: String,
}
