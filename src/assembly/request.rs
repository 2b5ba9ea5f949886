//! Report request data model.
//!
//! `ReportSubmission` is the raw payload as the form layer hands it over;
//! `ReportRequest` is the normalized form the assembler consumes, after the
//! person and image resolvers have run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use super::images::ResolvedImage;
use super::template::Organization;

/// One person row as submitted (positionally aligned prefix/name/designation
/// arrays). Rows with neither a name nor a designation are dropped by the
/// person resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PersonEntry {
    #[serde(default)]
    pub prefix: String,
    pub name: String,
    #[serde(default)]
    pub designation: String,
}

/// One numbered image slot as submitted. Slots without an uploaded payload
/// never reach this type; the slot number survives for error reporting and
/// ordering.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub slot: u32,
    pub binary_content: Vec<u8>,
    pub caption: String,
}

/// Tallies for one feedback question, categories fixed by the survey form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackCounts {
    pub strongly_agree: u32,
    pub agree: u32,
    pub partially_agree: u32,
}

impl FeedbackCounts {
    pub fn total(&self) -> u32 {
        self.strongly_agree + self.agree + self.partially_agree
    }
}

/// One feedback survey question with its response tallies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackQuestion {
    pub number: u32,
    pub text: String,
    pub counts: FeedbackCounts,
}

/// Policy for submissions where some image slots fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    /// Reject the whole request, reporting every failed slot.
    Strict,
    /// Drop the failed slots and assemble the document from the valid ones.
    BestEffort,
}

impl ImagePolicy {
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" | "lenient" => ImagePolicy::BestEffort,
            _ => ImagePolicy::Strict,
        }
    }
}

/// Raw report payload straight off the wire, before resolution.
#[derive(Debug, Default)]
pub struct ReportSubmission {
    pub organization_id: String,
    pub scalar_fields: HashMap<String, String>,
    pub person_groups: HashMap<String, Vec<PersonEntry>>,
    pub image_groups: HashMap<String, Vec<ImageEntry>>,
    pub feedback: Vec<FeedbackQuestion>,
}

/// Normalized input to the document assembler. Every person entry and image
/// in here has already passed resolution; the assembler only lays out.
#[derive(Debug)]
pub struct ReportRequest {
    pub organization: Organization,
    pub scalar_fields: HashMap<String, String>,
    pub person_groups: HashMap<String, Vec<PersonEntry>>,
    pub image_groups: HashMap<String, Vec<ResolvedImage>>,
    pub feedback: Vec<FeedbackQuestion>,
}
