//! Template selection.
//!
//! Maps an organization identifier to one of the five bundled report
//! skeletons. The organization set, the asset mapping, and the placeholder
//! vocabulary are static configuration; nothing here is computed from user
//! data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AssemblyError;

/// Placeholder anchor where the feedback chart sequence is inserted.
pub const FEEDBACK_CHARTS_ANCHOR: &str = "{{FEEDBACK_CHARTS}}";

/// Person group name -> repeating-region anchor in the templates.
pub const PERSON_REGIONS: &[(&str, &str)] = &[
    ("rrecl", "{{RRECL_PEOPLE}}"),
    ("guest", "{{GUEST_TRAINERS}}"),
    ("chief", "{{CHIEF_GUESTS}}"),
    ("guidance", "{{GUIDANCE_PERSON}}"),
];

/// Image group name -> region anchor in the templates.
pub const IMAGE_REGIONS: &[(&str, &str)] = &[
    ("gallery", "{{GALLERY_TABLE}}"),
    ("annexure1", "{{ANNEXURE1_TABLE}}"),
    ("annexure2", "{{ANNEXURE2_TABLE}}"),
    ("annexure3", "{{ANNEXURE3_TABLE}}"),
    ("annexure4", "{{ANNEXURE4_TABLE}}"),
    ("annexure5", "{{ANNEXURE5_TABLE}}"),
];

/// The organizations with a bundled report template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Organization {
    Rrecl,
    Geda,
    Hareda,
    Ureda,
    SdaOdisha,
}

impl Organization {
    pub const ALL: [Organization; 5] = [
        Organization::Rrecl,
        Organization::Geda,
        Organization::Hareda,
        Organization::Ureda,
        Organization::SdaOdisha,
    ];

    /// Parse an organization identifier as submitted by the form.
    pub fn parse(id: &str) -> Result<Self, AssemblyError> {
        let normalized = id.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "RRECL" => Ok(Organization::Rrecl),
            "GEDA" => Ok(Organization::Geda),
            "HAREDA" => Ok(Organization::Hareda),
            "UREDA" => Ok(Organization::Ureda),
            "SDA_ODISHA" | "SDA" => Ok(Organization::SdaOdisha),
            _ => Err(AssemblyError::UnknownOrganization(id.trim().to_string())),
        }
    }

    /// Lowercase slug used in template asset names and output filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            Organization::Rrecl => "rrecl",
            Organization::Geda => "geda",
            Organization::Hareda => "hareda",
            Organization::Ureda => "ureda",
            Organization::SdaOdisha => "sda-odisha",
        }
    }

    /// Full organization name as printed in the reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Organization::Rrecl => "Rajasthan Renewable Energy Corporation Limited",
            Organization::Geda => "Gujarat Energy Development Agency",
            Organization::Hareda => "Haryana Renewable Energy Development Agency",
            Organization::Ureda => "Uttarakhand Renewable Energy Development Agency",
            Organization::SdaOdisha => "State Designated Agency, Odisha",
        }
    }

    /// Template asset file for this organization.
    pub fn template_file(&self) -> &'static str {
        match self {
            Organization::Rrecl => "report_rrecl.typ",
            Organization::Geda => "report_geda.typ",
            Organization::Hareda => "report_hareda.typ",
            Organization::Ureda => "report_ureda.typ",
            Organization::SdaOdisha => "report_sda_odisha.typ",
        }
    }
}

/// An immutable report skeleton: the organization it belongs to plus its
/// Typst source. Each assembly works on its own owned copy of the source.
#[derive(Debug, Clone)]
pub struct Template {
    pub organization: Organization,
    pub source: String,
}

impl Template {
    /// Load the template skeleton for an organization from the asset
    /// directory.
    pub fn load(template_dir: &Path, organization: Organization) -> Result<Self, AssemblyError> {
        let name = organization.template_file();
        let source =
            fs::read_to_string(template_dir.join(name)).map_err(|source| {
                AssemblyError::TemplateLoad {
                    name: name.to_string(),
                    source,
                }
            })?;
        Ok(Self {
            organization,
            source,
        })
    }
}
