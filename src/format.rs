//! Itinerary post-processing
//!
//! Turns the model's plain-text itinerary into styled HTML: bullet markers
//! become em dashes, day headers and time-of-day sections become headings,
//! and each remaining line is classified for indentation. The inline styles
//! reference the site's CSS custom properties.

use regex::Regex;
use std::sync::LazyLock;

/// Lines longer than this render as justified paragraphs
const PARAGRAPH_THRESHOLD: usize = 80;

static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\s]*[-*\u{2022}]\s*").unwrap());

static RE_DAY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^(Day\s+\d+[:\-\s]*.*?)$").unwrap());

static RE_TIME_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^((?:Morning|Afternoon|Evening|Night)[\s:]*.*?)$").unwrap());

static RE_NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*").unwrap());

static RE_CATEGORY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[A-Z][^:]*:").unwrap());

static RE_EXTRA_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<br>\s*){3,}").unwrap());

/// Format itinerary text with headings, em dashes and indentation
#[must_use]
pub fn format_itinerary(text: &str) -> String {
    // Normalize list markers to em dashes
    let text = RE_BULLET.replace_all(text, "\u{2014} ");

    // Promote day headers and time-of-day sections to headings
    let text = RE_DAY_HEADER.replace_all(
        &text,
        "<h3 style=\"color: var(--primary-color); margin: 2rem 0 1rem 0; padding: 0.5rem 0; border-bottom: 2px solid var(--primary-color);\">$1</h3>",
    );
    let text = RE_TIME_SECTION.replace_all(
        &text,
        "<h4 style=\"color: var(--secondary-color); margin: 1.5rem 0 0.5rem 0; font-weight: 600;\">$1</h4>",
    );

    let mut formatted_lines = Vec::new();

    for line in text.lines() {
        let stripped = line.trim();

        if stripped.is_empty() {
            formatted_lines.push("<br>".to_string());
            continue;
        }

        // Headings were already emitted above
        if stripped.starts_with("<h") {
            formatted_lines.push(line.to_string());
            continue;
        }

        let formatted = if stripped.starts_with('\u{2014}') {
            format!("<div style=\"margin: 0.5rem 0; padding-left: 1rem;\">{stripped}</div>")
        } else if RE_NUMBERED.is_match(stripped) {
            format!(
                "<div style=\"margin: 0.5rem 0; padding-left: 1rem; font-weight: 500;\">{stripped}</div>"
            )
        } else if RE_CATEGORY.is_match(stripped) {
            format!(
                "<div style=\"margin: 0.8rem 0 0.3rem 0; font-weight: 600; color: var(--text-color);\">{stripped}</div>"
            )
        } else if stripped.chars().count() > PARAGRAPH_THRESHOLD {
            format!(
                "<p style=\"margin: 1rem 0; line-height: 1.6; text-align: justify;\">{stripped}</p>"
            )
        } else {
            format!("<div style=\"margin: 0.3rem 0; padding-left: 0.5rem;\">{stripped}</div>")
        };

        formatted_lines.push(formatted);
    }

    let body = formatted_lines.join("\n");
    let body = RE_EXTRA_BREAKS.replace_all(&body, "<br><br>");

    format!(
        "<div style=\"font-family: var(--font-body); color: var(--text-color); line-height: 1.6; max-width: none;\">\n{body}\n</div>"
    )
}
