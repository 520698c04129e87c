//! Terminal rendering of a scorecard.

use std::fmt::Write;

use crate::data::{Category, Grade, ScoreResult};

const BAR_WIDTH: u32 = 20;
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Returns the ANSI color escape for a grade.
pub(crate) fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::A | Grade::B => "\x1b[32m",
        Grade::C => "\x1b[33m",
        Grade::D | Grade::F => "\x1b[31m",
    }
}

/// Renders a fixed-width progress bar for `score` out of `max`.
pub(crate) fn score_bar(score: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        (score.min(max) * BAR_WIDTH) / max
    };
    let empty = BAR_WIDTH - filled;
    format!(
        "{}{}",
        "\u{2588}".repeat(filled as usize),
        "\u{2591}".repeat(empty as usize)
    )
}

/// Formats one breakdown row: label, bar, score and any failure note.
pub(crate) fn format_category_line(result: &ScoreResult, category: Category) -> String {
    let (score, max) = result.breakdown.score_of(category);
    let mut line = format!(
        "  {:<14} {} {:>2}/{}",
        category.label(),
        score_bar(score, max),
        score,
        max
    );
    if let Some(error) = result.breakdown.error_of(category) {
        let _ = write!(line, "  {DIM}({error}){RESET}");
    }
    line
}

/// Renders the full human-readable scorecard.
pub fn render_text(result: &ScoreResult) -> String {
    let color = grade_color(result.grade);
    let mut out = String::new();

    let _ = writeln!(out, "{BOLD}\u{1f4ca} Skill Scorecard: {}{RESET}", result.skill);
    let _ = writeln!(out, "{DIM}{}{RESET}", result.path.display());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Overall: {color}{BOLD}{}/{} (Grade {}){RESET}",
        result.overall_score, result.max_score, result.grade
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Breakdown:");
    for category in Category::ALL {
        let _ = writeln!(out, "{}", format_category_line(result, category));
    }

    if result.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "\u{2705} No recommendations");
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recommendations:");
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {recommendation}", i + 1);
        }
    }

    let _ = write!(out, "{DIM}Scanned in {}ms{RESET}", result.duration_ms);
    out
}
