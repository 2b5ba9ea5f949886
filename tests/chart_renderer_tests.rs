use training_report_server::assembly::charts::{ChartConfig, ChartOutcome};
use training_report_server::assembly::{render_feedback_charts, FeedbackCounts, FeedbackQuestion};

fn question(number: u32, strongly_agree: u32, agree: u32, partially_agree: u32) -> FeedbackQuestion {
    FeedbackQuestion {
        number,
        text: format!("Survey question {number}"),
        counts: FeedbackCounts {
            strongly_agree,
            agree,
            partially_agree,
        },
    }
}

// Small charts keep the test fast; geometry scales linearly with DPI.
const TEST_CONFIG: ChartConfig = ChartConfig { dpi: 50 };

#[test]
fn one_outcome_per_question_with_responses() {
    let feedback = vec![
        question(1, 5, 2, 0),
        question(2, 0, 0, 0),
        question(3, 1, 1, 1),
        question(4, 0, 0, 0),
    ];

    let charts = render_feedback_charts(&feedback, TEST_CONFIG);
    assert_eq!(charts.len(), 2);
    let questions: Vec<u32> = charts.outcomes().iter().map(|o| o.question()).collect();
    assert_eq!(questions, vec![1, 3]);
}

#[test]
fn all_zero_feedback_renders_nothing() {
    let feedback = vec![question(1, 0, 0, 0), question(2, 0, 0, 0)];
    let charts = render_feedback_charts(&feedback, TEST_CONFIG);
    assert!(charts.is_empty());
}

#[test]
fn rendered_charts_exist_as_png_files() {
    let feedback = vec![question(1, 5, 2, 0)];
    let charts = render_feedback_charts(&feedback, TEST_CONFIG);
    assert_eq!(charts.len(), 1);

    if let ChartOutcome::Rendered(chart) = &charts.outcomes()[0] {
        assert!(chart.path.exists());
        let bytes = std::fs::read(&chart.path).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Png
        );
    }
}

#[test]
fn rendering_is_idempotent_over_identical_feedback() {
    let feedback = vec![question(1, 3, 4, 1), question(2, 0, 2, 0)];

    let first = render_feedback_charts(&feedback, TEST_CONFIG);
    let second = render_feedback_charts(&feedback, TEST_CONFIG);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.outcomes().iter().zip(second.outcomes()) {
        assert_eq!(a.question(), b.question());
        assert_eq!(
            matches!(a, ChartOutcome::Rendered(_)),
            matches!(b, ChartOutcome::Rendered(_))
        );
    }
}

#[test]
fn feedback_is_not_mutated_by_rendering() {
    let feedback = vec![question(1, 5, 2, 0)];
    let snapshot = feedback.clone();
    let _charts = render_feedback_charts(&feedback, TEST_CONFIG);
    for (before, after) in snapshot.iter().zip(&feedback) {
        assert_eq!(before.counts, after.counts);
        assert_eq!(before.text, after.text);
    }
}
