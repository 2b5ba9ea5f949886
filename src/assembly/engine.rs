//! Document assembler.
//!
//! Takes the selected template plus the outputs of the person, image, and
//! chart stages, substitutes everything into the template's placeholder
//! positions, and compiles the result to PDF with the Typst CLI. All
//! temporary state (embedded image files, chart images, the compile
//! context) lives in request-scoped directories that are removed on every
//! exit path.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tempfile::TempDir;

use super::charts::{render_feedback_charts, ChartConfig, ChartOutcome, ChartSet};
use super::common::{escape_typst_markup, filename_timestamp, request_token};
use super::images::{resolve_image_groups, ResolvedImage};
use super::people::{person_line, resolve_person_groups};
use super::request::{ImagePolicy, PersonEntry, ReportRequest, ReportSubmission};
use super::template::{
    Organization, Template, FEEDBACK_CHARTS_ANCHOR, IMAGE_REGIONS, PERSON_REGIONS,
};
use super::{AssemblyError, GeneratedDocument};

const SOURCE_FILE: &str = "report.typ";
const OUTPUT_FILE: &str = "report.pdf";

/// Message substituted at the feedback anchor when no question has
/// responses.
pub const NO_FEEDBACK_MESSAGE: &str = "No feedback data provided";

/// Gallery layout recovered from the report formats: two columns, six
/// photos per page.
const GALLERY_COLUMNS: usize = 2;
const GALLERY_PER_PAGE: usize = 6;

/// Knobs the assembly engine needs from the configuration surface.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub template_dir: PathBuf,
    pub max_image_bytes: usize,
    pub image_policy: ImagePolicy,
    pub chart: ChartConfig,
}

/// A file the rendered source references, to be written into the compile
/// context next to it.
pub enum Attachment<'a> {
    Bytes { name: String, bytes: &'a [u8] },
    File { name: String, path: &'a Path },
}

impl Attachment<'_> {
    pub fn name(&self) -> &str {
        match self {
            Attachment::Bytes { name, .. } => name,
            Attachment::File { name, .. } => name,
        }
    }
}

/// Run the whole pipeline for one submission: select and load the template,
/// resolve people and images, render charts, assemble.
pub fn generate_report(
    submission: ReportSubmission,
    options: &AssemblyOptions,
) -> Result<GeneratedDocument, AssemblyError> {
    let organization = Organization::parse(&submission.organization_id)?;
    let template = Template::load(&options.template_dir, organization)?;

    let person_groups = resolve_person_groups(submission.person_groups);
    let images = resolve_image_groups(submission.image_groups, options.max_image_bytes);
    log::debug!(
        "resolved {} image(s) across {} group(s)",
        images.resolved_count(),
        images.groups.len()
    );
    if !images.failures.is_empty() {
        match options.image_policy {
            ImagePolicy::Strict => return Err(AssemblyError::InvalidImages(images.failures)),
            ImagePolicy::BestEffort => log::warn!(
                "assembling without {} image slot(s) that failed validation",
                images.failures.len()
            ),
        }
    }

    let charts = render_feedback_charts(&submission.feedback, options.chart);

    let request = ReportRequest {
        organization,
        scalar_fields: submission.scalar_fields,
        person_groups,
        image_groups: images.groups,
        feedback: submission.feedback,
    };

    assemble(&template, &request, charts)
}

/// Substitute the request into the template and compile it to PDF.
///
/// The chart set is consumed so its scratch files are released when this
/// function returns, on the success and failure paths alike.
pub fn assemble(
    template: &Template,
    request: &ReportRequest,
    charts: ChartSet,
) -> Result<GeneratedDocument, AssemblyError> {
    let (source, attachments) = render_source(template, request, &charts);

    let compile_dir = TempDir::new().map_err(AssemblyError::TempDir)?;
    for attachment in &attachments {
        let target = compile_dir.path().join(attachment.name());
        match attachment {
            Attachment::Bytes { bytes, .. } => {
                fs::write(&target, bytes).map_err(|source| AssemblyError::WriteImage {
                    name: attachment.name().to_string(),
                    source,
                })?
            }
            Attachment::File { path, .. } => {
                fs::copy(path, &target).map(|_| ()).map_err(|source| {
                    AssemblyError::WriteImage {
                        name: attachment.name().to_string(),
                        source,
                    }
                })?
            }
        }
    }

    fs::write(compile_dir.path().join(SOURCE_FILE), &source)
        .map_err(AssemblyError::WriteSource)?;

    let pdf = compile_typst_to_pdf(&compile_dir)?;

    let filename = format!(
        "{}-report-{}-{}.pdf",
        template.organization.slug(),
        filename_timestamp(),
        request_token()
    );

    log::info!(
        "assembled {} ({} bytes, {} embedded files, {} chart slots)",
        filename,
        pdf.len(),
        attachments.len(),
        charts.len()
    );

    Ok(GeneratedDocument {
        filename,
        pdf,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Produce the fully substituted Typst source plus the files it references.
///
/// Substitution order: person regions, image regions, the feedback chart
/// anchor, scalar fields, then a final sweep that blanks any placeholder
/// token left unresolved.
pub fn render_source<'a>(
    template: &Template,
    request: &'a ReportRequest,
    charts: &'a ChartSet,
) -> (String, Vec<Attachment<'a>>) {
    let mut source = template.source.clone();
    let mut attachments: Vec<Attachment<'a>> = Vec::new();

    for (group, anchor) in PERSON_REGIONS {
        let entries = request
            .person_groups
            .get(*group)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        source = source.replace(anchor, &person_region_markup(entries));
    }

    let last_image_region = IMAGE_REGIONS
        .iter()
        .rev()
        .find(|(group, _)| {
            request
                .image_groups
                .get(*group)
                .is_some_and(|images| !images.is_empty())
        })
        .map(|(group, _)| *group);

    for (group, anchor) in IMAGE_REGIONS {
        let images = request
            .image_groups
            .get(*group)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let markup = if *group == "gallery" {
            gallery_markup(group, images, &mut attachments)
        } else {
            let is_last = last_image_region == Some(*group);
            annexure_markup(group, images, is_last, &mut attachments)
        };
        source = source.replace(anchor, &markup);
    }

    source = source.replace(FEEDBACK_CHARTS_ANCHOR, &charts_markup(charts, &mut attachments));

    for (key, value) in &request.scalar_fields {
        source = source.replace(&format!("{{{{{key}}}}}"), &escape_typst_markup(value));
    }

    (sweep_unresolved(&source), attachments)
}

/// One generated row per resolved entry; an empty group collapses the
/// region to nothing.
fn person_region_markup(entries: &[PersonEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("- {}", escape_typst_markup(&person_line(entry))))
        .collect::<Vec<_>>()
        .join("\n")
}

fn image_block(name: &str, caption: &str, width: &str, height: &str, caption_size: &str) -> String {
    let mut block = format!(
        "#align(center)[\n  #image(\"{name}\", width: {width}, height: {height}, fit: \"contain\")"
    );
    if !caption.is_empty() {
        block.push_str(&format!(
            "\n  #v(2pt)\n  #text(size: {caption_size}, weight: \"bold\")[{}]",
            escape_typst_markup(caption)
        ));
    }
    block.push_str("\n]");
    block
}

/// Photo gallery region: pages of six photos in a two-column grid, page
/// break between pages. Zero photos collapse the region.
fn gallery_markup<'a>(
    group: &str,
    images: &'a [ResolvedImage],
    attachments: &mut Vec<Attachment<'a>>,
) -> String {
    if images.is_empty() {
        return String::new();
    }

    let mut pages = Vec::new();
    for (page_index, page) in images.chunks(GALLERY_PER_PAGE).enumerate() {
        let mut cells = Vec::new();
        for (index, image) in page.iter().enumerate() {
            let position = page_index * GALLERY_PER_PAGE + index + 1;
            let name = format!("{group}-{position:02}.{}", image.kind.extension());
            cells.push(format!(
                "  [{}]",
                image_block(&name, &image.caption, "8.13cm", "5.81cm", "10pt")
            ));
            attachments.push(Attachment::Bytes {
                name,
                bytes: &image.bytes,
            });
        }
        pages.push(format!(
            "#grid(\n  columns: ({}),\n  gutter: 14pt,\n{}\n)",
            vec!["1fr"; GALLERY_COLUMNS].join(", "),
            cells.join(",\n")
        ));
    }

    pages.join("\n#pagebreak()\n")
}

/// Annexure region: one full-page image per slot with page breaks between,
/// and a trailing break unless this is the document's last populated image
/// region.
fn annexure_markup<'a>(
    group: &str,
    images: &'a [ResolvedImage],
    is_last_region: bool,
    attachments: &mut Vec<Attachment<'a>>,
) -> String {
    if images.is_empty() {
        return String::new();
    }

    let mut blocks = Vec::new();
    for (index, image) in images.iter().enumerate() {
        let name = format!("{group}-{:02}.{}", index + 1, image.kind.extension());
        blocks.push(image_block(&name, &image.caption, "15cm", "20cm", "11pt"));
        attachments.push(Attachment::Bytes {
            name,
            bytes: &image.bytes,
        });
    }

    let mut markup = blocks.join("\n#pagebreak()\n");
    if !is_last_region {
        markup.push_str("\n#pagebreak()");
    }
    markup
}

/// Chart sequence at the feedback anchor: each rendered chart at document
/// width with vertical spacing after it, failed slots as their message, an
/// empty sequence as the literal no-data message.
fn charts_markup<'a>(charts: &'a ChartSet, attachments: &mut Vec<Attachment<'a>>) -> String {
    if charts.is_empty() {
        return NO_FEEDBACK_MESSAGE.to_string();
    }

    let mut blocks = Vec::new();
    for outcome in charts.outcomes() {
        match outcome {
            ChartOutcome::Rendered(chart) => {
                let name = format!("feedback-chart-q{}.png", chart.question);
                blocks.push(format!(
                    "#align(center)[#image(\"{name}\", width: 100%)]\n#v(0.8cm)"
                ));
                attachments.push(Attachment::File {
                    name,
                    path: &chart.path,
                });
            }
            ChartOutcome::Failed { question, message } => {
                blocks.push(format!(
                    "#emph[Chart for question {question} could not be generated: {}]\n#v(0.8cm)",
                    escape_typst_markup(message)
                ));
            }
        }
    }

    blocks.join("\n")
}

/// Placeholders with no matching key become empty text, never literal
/// `{{...}}` in the output document.
fn sweep_unresolved(source: &str) -> String {
    // The token grammar is fixed, so the pattern always compiles.
    let token = Regex::new(r"\{\{\s*[A-Za-z0-9_.]+\s*\}\}").expect("valid placeholder pattern");
    token.replace_all(source, "").into_owned()
}

fn compile_typst_to_pdf(compile_dir: &TempDir) -> Result<Vec<u8>, AssemblyError> {
    let source_path = compile_dir.path().join(SOURCE_FILE);
    let output_path = compile_dir.path().join(OUTPUT_FILE);

    let status = Command::new("typst")
        .arg("compile")
        .arg(&source_path)
        .arg(&output_path)
        .current_dir(compile_dir.path())
        .status()
        .map_err(AssemblyError::TypstIo)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(AssemblyError::TypstExit(code));
    }

    fs::read(&output_path).map_err(AssemblyError::ReadPdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_blanks_unknown_tokens() {
        let swept = sweep_unresolved("a {{MISSING_FIELD}} b {{ OTHER }} c");
        assert_eq!(swept, "a  b  c");
    }

    #[test]
    fn person_markup_collapses_empty_group() {
        assert_eq!(person_region_markup(&[]), "");
    }

    #[test]
    fn gallery_markup_paginates_after_six_images() {
        let images: Vec<ResolvedImage> = (1..=7)
            .map(|slot| ResolvedImage {
                slot,
                kind: crate::assembly::images::ImageKind::Png,
                bytes: vec![0],
                caption: String::new(),
            })
            .collect();
        let mut attachments = Vec::new();
        let markup = gallery_markup("gallery", &images, &mut attachments);
        assert_eq!(markup.matches("#grid").count(), 2);
        assert_eq!(markup.matches("#pagebreak()").count(), 1);
        assert_eq!(attachments.len(), 7);
    }
}
