//! Feedback chart rendering.
//!
//! One horizontal bar chart per feedback question with at least one
//! response; questions whose every tally is zero are skipped. Rendering is
//! best-effort per question: a failed draw becomes a textual fallback slot
//! in the sequence and never aborts the batch. Chart files live in a
//! request-scoped temporary directory owned by the returned `ChartSet`, so
//! they are deleted on every exit path once the set is dropped.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tempfile::TempDir;

use super::request::FeedbackQuestion;

/// Category order is fixed by the survey form; colors match it.
const CATEGORY_LABELS: [&str; 3] = ["Strongly Agree", "Agree", "Partially Agree"];
const CATEGORY_COLORS: [RGBColor; 3] = [
    RGBColor(0x10, 0xb9, 0x81),
    RGBColor(0x3b, 0x82, 0xf6),
    RGBColor(0xf5, 0x9e, 0x0b),
];
const GRID_COLOR: RGBColor = RGBColor(0xe5, 0xe7, 0xeb);

/// Pixel geometry for rendered charts. The defaults approximate a 10x3 inch
/// figure at 300 DPI, legible when embedded at document width.
#[derive(Debug, Clone, Copy)]
pub struct ChartConfig {
    pub dpi: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { dpi: 300 }
    }
}

impl ChartConfig {
    fn pixel_size(&self) -> (u32, u32) {
        (10 * self.dpi, 3 * self.dpi)
    }
}

/// A successfully rendered chart image.
#[derive(Debug)]
pub struct GeneratedChart {
    pub question: u32,
    pub path: PathBuf,
}

/// One slot in the chart sequence: either an image or the message shown in
/// its place.
#[derive(Debug)]
pub enum ChartOutcome {
    Rendered(GeneratedChart),
    Failed { question: u32, message: String },
}

impl ChartOutcome {
    pub fn question(&self) -> u32 {
        match self {
            ChartOutcome::Rendered(chart) => chart.question,
            ChartOutcome::Failed { question, .. } => *question,
        }
    }
}

/// The rendered chart sequence plus the scratch directory keeping the image
/// files alive. Dropping the set removes the files.
#[derive(Debug)]
pub struct ChartSet {
    outcomes: Vec<ChartOutcome>,
    _scratch: Option<TempDir>,
}

impl ChartSet {
    pub fn outcomes(&self) -> &[ChartOutcome] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }
}

/// Render the chart sequence for a feedback survey. Pure projection of the
/// tallies: identical input yields charts with identical bars and labels,
/// and the input is never mutated.
pub fn render_feedback_charts(feedback: &[FeedbackQuestion], config: ChartConfig) -> ChartSet {
    let with_responses: Vec<&FeedbackQuestion> =
        feedback.iter().filter(|q| q.counts.total() > 0).collect();

    if with_responses.is_empty() {
        return ChartSet {
            outcomes: Vec::new(),
            _scratch: None,
        };
    }

    let scratch = match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => {
            // No scratch space means no rendering backend at all; every
            // question degrades to its textual fallback.
            log::error!("chart rendering unavailable: {e}");
            let outcomes = with_responses
                .iter()
                .map(|q| ChartOutcome::Failed {
                    question: q.number,
                    message: format!("chart rendering unavailable: {e}"),
                })
                .collect();
            return ChartSet {
                outcomes,
                _scratch: None,
            };
        }
    };

    let mut outcomes = Vec::with_capacity(with_responses.len());
    for question in with_responses {
        let path = scratch
            .path()
            .join(format!("feedback-chart-q{}.png", question.number));
        match draw_question_chart(question, &path, config) {
            Ok(()) => {
                log::debug!("rendered feedback chart for question {}", question.number);
                outcomes.push(ChartOutcome::Rendered(GeneratedChart {
                    question: question.number,
                    path,
                }));
            }
            Err(message) => {
                log::warn!(
                    "chart rendering failed for question {}: {message}",
                    question.number
                );
                outcomes.push(ChartOutcome::Failed {
                    question: question.number,
                    message,
                });
            }
        }
    }

    ChartSet {
        outcomes,
        _scratch: Some(scratch),
    }
}

fn draw_question_chart(
    question: &FeedbackQuestion,
    path: &Path,
    config: ChartConfig,
) -> Result<(), String> {
    render_bars(question, path, config).map_err(|e| e.to_string())
}

fn render_bars(
    question: &FeedbackQuestion,
    path: &Path,
    config: ChartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = config.pixel_size();
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    // Top-to-bottom display order follows CATEGORY_LABELS; the segmented
    // y axis counts bands from the bottom, so band 2 is the top row.
    let values = [
        question.counts.strongly_agree,
        question.counts.agree,
        question.counts.partially_agree,
    ];

    let max_value = *values.iter().max().unwrap_or(&1);
    let x_max = (f64::from(max_value) * 1.2).max(5.0);
    let font_scale = config.dpi as f64 / 100.0;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Q{}: {}", question.number, question.text),
            ("sans-serif", (14.0 * font_scale) as u32),
        )
        .margin((10.0 * font_scale) as u32)
        .x_label_area_size((16.0 * font_scale) as u32)
        .y_label_area_size((52.0 * font_scale) as u32)
        .build_cartesian_2d(0f64..x_max, (0u32..3u32).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Number of Responses")
        .axis_desc_style(("sans-serif", (11.0 * font_scale) as u32))
        .label_style(("sans-serif", (10.0 * font_scale) as u32))
        .light_line_style(GRID_COLOR)
        .bold_line_style(GRID_COLOR)
        .y_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(band) => {
                let band = *band as usize;
                CATEGORY_LABELS
                    .get(2 - band.min(2))
                    .map(|label| label.to_string())
                    .unwrap_or_default()
            }
            _ => String::new(),
        })
        .draw()?;

    for (index, value) in values.iter().enumerate() {
        let band = 2 - index as u32;
        let color = CATEGORY_COLORS[index];
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (0.0, SegmentValue::Exact(band)),
                (f64::from(*value), SegmentValue::Exact(band + 1)),
            ],
            color.mix(0.8).filled(),
        )))?;

        // Numeric label at the bar's end, skipped for zero-length bars.
        if *value > 0 {
            chart.draw_series(std::iter::once(Text::new(
                value.to_string(),
                (f64::from(*value) + x_max * 0.01, SegmentValue::CenterOf(band)),
                ("sans-serif", (11.0 * font_scale) as u32).into_font(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}
