//! Rendering of record views for the terminal, JSON, and HTML.
//!
//! Highlighting works on the segment lists produced by
//! [`rolodex_core::highlight::project`], so every renderer shows exactly
//! the original text with matched spans marked.

use anyhow::{bail, Result};
use std::str::FromStr;

use rolodex_core::highlight::Segment;
use rolodex_core::models::DATE_FORMAT;
use rolodex_core::view::RecordView;

const ANSI_MATCH: &str = "\x1b[1;33m";
const ANSI_RESET: &str = "\x1b[0m";

/// How matched spans are marked in text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    /// Bold yellow ANSI escapes.
    Ansi,
    /// `[...]` around each match; safe for pipes and files.
    Brackets,
}

impl HighlightStyle {
    /// ANSI when stdout is a terminal, brackets otherwise.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stdout) {
            HighlightStyle::Ansi
        } else {
            HighlightStyle::Brackets
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => bail!("Unknown output format: {}. Use text, json, or html.", other),
        }
    }
}

/// Render views in the requested format.
pub fn render(views: &[RecordView], format: OutputFormat, style: HighlightStyle) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text_listing(views, style)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(views)?)),
        OutputFormat::Html => Ok(html_listing(views)),
    }
}

pub fn segments_text(segments: &[Segment], style: HighlightStyle) -> String {
    let mut out = String::new();
    for segment in segments {
        if !segment.is_matched() {
            out.push_str(&segment.text);
            continue;
        }
        match style {
            HighlightStyle::Ansi => {
                out.push_str(ANSI_MATCH);
                out.push_str(&segment.text);
                out.push_str(ANSI_RESET);
            }
            HighlightStyle::Brackets => {
                out.push('[');
                out.push_str(&segment.text);
                out.push(']');
            }
        }
    }
    out
}

/// Multi-line block for one view, numbered from 1.
pub fn text_view(view: &RecordView, number: usize, style: HighlightStyle) -> String {
    let mut out = match view.score {
        Some(score) => format!(
            "{}. [{:.3}] {}\n",
            number,
            score,
            segments_text(&view.name, style)
        ),
        None => format!("{}. {}\n", number, segments_text(&view.name, style)),
    };

    let notes = segments_text(&view.notes, style);
    if !notes.is_empty() {
        out.push_str(&format!("    notes: {}\n", notes.replace('\n', " ")));
    }
    let where_met = segments_text(&view.where_met, style);
    if !where_met.is_empty() {
        out.push_str(&format!("    where met: {}\n", where_met));
    }
    if let Some(date) = view.when_met {
        out.push_str(&format!("    when met: {}\n", date.format(DATE_FORMAT)));
    }
    if !view.tags.is_empty() {
        let tags: Vec<String> = view
            .tags
            .iter()
            .map(|tag| segments_text(tag, style))
            .collect();
        out.push_str(&format!("    tags: {}\n", tags.join(", ")));
    }
    out.push_str(&format!("    id: {}\n", view.id));
    out
}

pub fn text_listing(views: &[RecordView], style: HighlightStyle) -> String {
    if views.is_empty() {
        return "No results.\n".to_string();
    }
    views
        .iter()
        .enumerate()
        .map(|(i, view)| text_view(view, i + 1, style))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn segments_html(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            let text = escape_html(&segment.text);
            if segment.is_matched() {
                format!("<mark>{}</mark>", text)
            } else {
                text
            }
        })
        .collect()
}

fn has_text(segments: &[Segment]) -> bool {
    segments.iter().any(|s| !s.text.is_empty())
}

pub fn html_listing(views: &[RecordView]) -> String {
    let mut out = String::from("<ul class=\"rolodex-results\">\n");
    for view in views {
        out.push_str(&format!(
            "  <li data-id=\"{}\">\n",
            escape_html(&view.id)
        ));
        out.push_str(&format!(
            "    <h3 class=\"name\">{}</h3>\n",
            segments_html(&view.name)
        ));
        if has_text(&view.notes) {
            out.push_str(&format!(
                "    <p class=\"notes\">{}</p>\n",
                segments_html(&view.notes)
            ));
        }
        if has_text(&view.where_met) {
            out.push_str(&format!(
                "    <p class=\"where-met\">{}</p>\n",
                segments_html(&view.where_met)
            ));
        }
        if let Some(date) = view.when_met {
            out.push_str(&format!(
                "    <time>{}</time>\n",
                date.format(DATE_FORMAT)
            ));
        }
        if !view.tags.is_empty() {
            out.push_str("    <ul class=\"tags\">");
            for tag in &view.tags {
                out.push_str(&format!("<li>{}</li>", segments_html(tag)));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("  </li>\n");
    }
    out.push_str("</ul>\n");
    out
}
