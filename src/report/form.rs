//! Report form parsing.
//!
//! Drains the multipart submission into a flat field/file form, then maps
//! it onto a `ReportSubmission` following the form's naming contract:
//! array-style person fields (`<group>_prefix[]`, `<group>_name[]`,
//! `<group>_designation[]`, positionally aligned), numbered image slots
//! (`<group>_image_<n>` with `<group>_caption_<n>`), and
//! `question_<q>_<category>` feedback tallies.

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use std::collections::HashMap;

use crate::assembly::request::{
    FeedbackCounts, FeedbackQuestion, ImageEntry, PersonEntry, ReportSubmission,
};
use crate::ErrorResponse;

/// Person group names the templates know about.
pub const PERSON_GROUPS: [&str; 4] = ["rrecl", "guest", "chief", "guidance"];

/// Image group names the templates know about.
pub const IMAGE_GROUPS: [&str; 6] = [
    "gallery",
    "annexure1",
    "annexure2",
    "annexure3",
    "annexure4",
    "annexure5",
];

/// The feedback survey questions, fixed to match the form.
pub const FEEDBACK_QUESTIONS: [&str; 4] = [
    "The trainer was able to communicate clearly.",
    "The Content of ECSBC / ENS covered was satisfactory.",
    "Adequate time was provided for question-and-answer session.",
    "The content was appropriately described and key concepts conveyed properly.",
];

/// Scalar form field -> template placeholder key.
const SCALAR_FIELDS: [(&str, &str); 8] = [
    ("event_title", "EVENT_TITLE"),
    ("event_details_line1", "EVENT_DETAILS"),
    ("event_date", "EVENT_DATE"),
    ("workshop_type", "WORKSHOP_TYPE"),
    ("organizer", "ORGANIZER"),
    ("venue", "VENUE"),
    ("date", "DATETIME"),
    ("cell_name", "CELL_NAME"),
];

#[derive(Debug, thiserror::Error)]
pub enum FormParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<FormParseError> for HttpResponse {
    fn from(error: FormParseError) -> Self {
        match error {
            FormParseError::Utf8Error(_) | FormParseError::FieldError(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            _ => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

/// The drained multipart payload: text fields with repeats preserved in
/// submission order, and uploaded files keyed by field name.
#[derive(Debug, Default)]
pub struct RawReportForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, Vec<u8>)>,
}

impl RawReportForm {
    /// Drain an incoming multipart stream.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormParseError> {
        let mut form = RawReportForm::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| FormParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                FormParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| FormParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let is_file = content_disposition.get_filename().is_some();

            let mut buffer = Vec::new();
            while let Some(chunk) = field.next().await {
                let data_chunk = chunk.map_err(|e| FormParseError::IoError(e.to_string()))?;
                buffer.extend_from_slice(&data_chunk);
            }

            if is_file {
                form.files.push((name, buffer));
            } else {
                let value = String::from_utf8(buffer)
                    .map_err(|e| FormParseError::Utf8Error(e.to_string()))?;
                form.fields.push((name, value));
            }
        }

        Ok(form)
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn list(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Map the flat form onto the structured submission.
    pub fn into_submission(self) -> ReportSubmission {
        let organization_id = self.first("organization").unwrap_or_default().to_string();

        let mut scalar_fields = HashMap::new();
        for (field, placeholder) in SCALAR_FIELDS {
            if let Some(value) = self.first(field) {
                scalar_fields.insert(placeholder.to_string(), value.to_string());
            }
        }
        let address: Vec<&str> = ["address_line1", "address_line2", "address_line3"]
            .iter()
            .filter_map(|line| self.first(line))
            .filter(|line| !line.trim().is_empty())
            .collect();
        if !address.is_empty() {
            scalar_fields.insert("ADDRESS".to_string(), address.join("\n"));
        }

        let mut person_groups = HashMap::new();
        for group in PERSON_GROUPS {
            let prefixes = self.list(&format!("{group}_prefix[]"));
            let names = self.list(&format!("{group}_name[]"));
            let designations = self.list(&format!("{group}_designation[]"));

            let row_count = prefixes.len().max(names.len()).max(designations.len());
            let rows = (0..row_count)
                .map(|i| PersonEntry {
                    prefix: prefixes.get(i).copied().unwrap_or_default().to_string(),
                    name: names.get(i).copied().unwrap_or_default().to_string(),
                    designation: designations.get(i).copied().unwrap_or_default().to_string(),
                })
                .collect();
            person_groups.insert(group.to_string(), rows);
        }

        let feedback = (1..=FEEDBACK_QUESTIONS.len() as u32)
            .map(|number| {
                let count = |category: &str| {
                    self.first(&format!("question_{number}_{category}"))
                        .and_then(|value| value.trim().parse().ok())
                        .unwrap_or(0)
                };
                FeedbackQuestion {
                    number,
                    text: FEEDBACK_QUESTIONS[(number - 1) as usize].to_string(),
                    counts: FeedbackCounts {
                        strongly_agree: count("strongly_agree"),
                        agree: count("agree"),
                        partially_agree: count("partially_agree"),
                    },
                }
            })
            .collect();

        let mut image_groups: HashMap<String, Vec<ImageEntry>> = HashMap::new();
        for group in IMAGE_GROUPS {
            image_groups.insert(group.to_string(), Vec::new());
        }
        for (name, bytes) in self.files {
            let Some((group, slot)) = parse_image_field(&name) else {
                continue;
            };
            let caption = self
                .fields
                .iter()
                .find(|(key, _)| key == &format!("{group}_caption_{slot}"))
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            image_groups.entry(group).or_default().push(ImageEntry {
                slot,
                binary_content: bytes,
                caption,
            });
        }

        ReportSubmission {
            organization_id,
            scalar_fields,
            person_groups,
            image_groups,
            feedback,
        }
    }
}

/// Split `<group>_image_<n>` into its group and slot number. Only groups
/// the templates know about are accepted.
fn parse_image_field(name: &str) -> Option<(String, u32)> {
    let (group, slot) = name.rsplit_once("_image_")?;
    if !IMAGE_GROUPS.contains(&group) {
        return None;
    }
    let slot: u32 = slot.parse().ok()?;
    Some((group.to_string(), slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_field_names_parse_group_and_slot() {
        assert_eq!(
            parse_image_field("gallery_image_3"),
            Some(("gallery".to_string(), 3))
        );
        assert_eq!(
            parse_image_field("annexure2_image_10"),
            Some(("annexure2".to_string(), 10))
        );
        assert_eq!(parse_image_field("banner_image_1"), None);
        assert_eq!(parse_image_field("gallery_image_x"), None);
    }

    #[test]
    fn person_arrays_align_positionally() {
        let form = RawReportForm {
            fields: vec![
                ("guest_prefix[]".to_string(), "Shri".to_string()),
                ("guest_prefix[]".to_string(), "Smt.".to_string()),
                ("guest_name[]".to_string(), "A. Sharma".to_string()),
                ("guest_name[]".to_string(), "B. Patel".to_string()),
                ("guest_designation[]".to_string(), "CE".to_string()),
            ],
            files: Vec::new(),
        };

        let submission = form.into_submission();
        let guests = &submission.person_groups["guest"];
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].prefix, "Shri");
        assert_eq!(guests[0].designation, "CE");
        assert_eq!(guests[1].name, "B. Patel");
        assert_eq!(guests[1].designation, "");
    }

    #[test]
    fn feedback_counts_default_to_zero_on_blank_or_garbage() {
        let form = RawReportForm {
            fields: vec![
                ("question_1_strongly_agree".to_string(), "5".to_string()),
                ("question_1_agree".to_string(), "".to_string()),
                ("question_1_partially_agree".to_string(), "abc".to_string()),
            ],
            files: Vec::new(),
        };

        let submission = form.into_submission();
        assert_eq!(submission.feedback.len(), FEEDBACK_QUESTIONS.len());
        assert_eq!(submission.feedback[0].counts.strongly_agree, 5);
        assert_eq!(submission.feedback[0].counts.agree, 0);
        assert_eq!(submission.feedback[0].counts.partially_agree, 0);
    }

    #[test]
    fn address_lines_join_into_one_placeholder() {
        let form = RawReportForm {
            fields: vec![
                ("address_line1".to_string(), "Plot 5".to_string()),
                ("address_line2".to_string(), "Energy Bhawan".to_string()),
                ("address_line3".to_string(), "  ".to_string()),
            ],
            files: Vec::new(),
        };

        let submission = form.into_submission();
        assert_eq!(
            submission.scalar_fields["ADDRESS"],
            "Plot 5\nEnergy Bhawan"
        );
    }

    #[test]
    fn uploaded_files_pair_with_their_captions() {
        let form = RawReportForm {
            fields: vec![(
                "gallery_caption_2".to_string(),
                "Inauguration".to_string(),
            )],
            files: vec![
                ("gallery_image_2".to_string(), vec![1, 2, 3]),
                ("resume".to_string(), vec![9]),
            ],
        };

        let submission = form.into_submission();
        let gallery = &submission.image_groups["gallery"];
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].slot, 2);
        assert_eq!(gallery[0].caption, "Inauguration");
    }
}
