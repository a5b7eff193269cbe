// src/report/mod.rs
//! Presenting a `ComparisonResult` as a standalone document.
use std::fmt::Write as _;
use std::str::FromStr;

use crate::compare::{ComparisonResult, ComparisonSections, SectionComparison, SectionComparisons};
use crate::compare::version::format_version_timestamp;
use crate::utils::error::ReportError;

/// Longest list of diff entries shown per section before truncating.
const MAX_ITEMS_PER_LIST: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Pdf,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::UnsupportedOutputFormat(other.to_string())),
        }
    }
}

/// Turns a comparison result into document bytes.
pub trait ReportRenderer {
    fn render(&self, result: &ComparisonResult, format: OutputFormat) -> Result<Vec<u8>, ReportError>;
}

/// Renders HTML and JSON. PDF output is left to an external renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReportRenderer;

impl ReportRenderer for HtmlReportRenderer {
    fn render(&self, result: &ComparisonResult, format: OutputFormat) -> Result<Vec<u8>, ReportError> {
        match format {
            OutputFormat::Html => Ok(render_html(result).into_bytes()),
            OutputFormat::Json => Ok(result.to_json_pretty()?.into_bytes()),
            OutputFormat::Pdf => Err(ReportError::UnsupportedOutputFormat("pdf".to_string())),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn page_ref(page: Option<usize>) -> String {
    page.map_or_else(|| "-".to_string(), |p| p.to_string())
}

fn render_html(result: &ComparisonResult) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Version comparison for case {}</title>", escape_html(&result.case_id));
    html.push_str("<style>\n");
    html.push_str(".added { background-color: #E6FFEC; }\n");
    html.push_str(".removed { background-color: #FFEBE9; }\n");
    html.push_str(".modified { background-color: #FFF8C5; }\n");
    html.push_str(".unchanged { color: #57606A; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(html, "<h1>Version comparison for case {}</h1>", escape_html(&result.case_id));
    let _ = writeln!(
        html,
        "<p>Mode: {} | Generated: {}</p>",
        result.mode,
        result.comparison_timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    html.push_str("<h2>Versions</h2>\n<ol>\n");
    for version in &result.versions {
        let stamp = version.order_timestamp.as_ref().map(format_version_timestamp).unwrap_or_else(|| "undated".to_string());
        let _ = writeln!(
            html,
            "<li>{} ({}, {} pages, {} sections)</li>",
            escape_html(&version.filename),
            stamp,
            version.page_count,
            version.section_count
        );
    }
    html.push_str("</ol>\n");

    let summary = result.summary();
    let _ = writeln!(
        html,
        "<p>Sections: {} total, {} added, {} removed, {} modified, {} unchanged</p>",
        summary.total, summary.added, summary.removed, summary.modified, summary.unchanged
    );

    match &result.sections {
        ComparisonSections::Flat(sections) => render_sections(&mut html, sections),
        ComparisonSections::ByPair(pairs) => {
            for pair in &pairs.0 {
                let _ = writeln!(html, "<h2>{} &rarr; {}</h2>", escape_html(&pair.older), escape_html(&pair.newer));
                render_sections(&mut html, &pair.sections);
            }
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_sections(html: &mut String, sections: &SectionComparisons) {
    if sections.is_empty() {
        html.push_str("<p>No canonical sections found.</p>\n");
        return;
    }
    for (key, section) in sections {
        let status = section.status.as_str();
        let _ = writeln!(html, "<div class=\"section {}\">", status);
        let _ = writeln!(
            html,
            "<h3>{} <small>[{}] pages {} / {}</small></h3>",
            escape_html(key.as_str()),
            status,
            page_ref(section.pages.old),
            page_ref(section.pages.new)
        );
        render_section_body(html, section);
        html.push_str("</div>\n");
    }
}

fn render_section_body(html: &mut String, section: &SectionComparison) {
    if let Some(line_diff) = &section.line_diff {
        render_list(html, "Added", line_diff.added.iter().map(|l| escape_html(l)));
        render_list(html, "Removed", line_diff.removed.iter().map(|l| escape_html(l)));
        render_list(
            html,
            "Changed",
            line_diff.changed.iter().map(|c| format!("{} &rarr; {}", escape_html(&c.old), escape_html(&c.new))),
        );
    }
    if let Some(numeric) = &section.numeric_diff {
        render_list(
            html,
            "Changed amounts",
            numeric.changed.iter().map(|c| {
                format!("{}: ${:.2} &rarr; ${:.2} ({:+.2})", escape_html(&c.label), c.old, c.new, c.delta)
            }),
        );
        render_list(html, "New amounts", numeric.added.iter().map(|a| format!("{}: ${:.2}", escape_html(&a.label), a.new)));
        render_list(
            html,
            "Dropped amounts",
            numeric.removed.iter().map(|r| format!("{}: ${:.2}", escape_html(&r.label), r.old)),
        );
    }
    if section.line_diff.is_none() {
        // added and removed sections carry their whole body
        if let Some(content) = section.new_content.as_ref().or(section.old_content.as_ref()) {
            let _ = writeln!(html, "<pre>{}</pre>", escape_html(content));
        }
    }
}

fn render_list<I>(html: &mut String, title: &str, items: I)
where
    I: ExactSizeIterator<Item = String>,
{
    let total = items.len();
    if total == 0 {
        return;
    }
    let _ = writeln!(html, "<h4>{}</h4>\n<ul>", title);
    for item in items.take(MAX_ITEMS_PER_LIST) {
        let _ = writeln!(html, "<li>{}</li>", item);
    }
    if total > MAX_ITEMS_PER_LIST {
        let _ = writeln!(html, "<li>... and {} more</li>", total - MAX_ITEMS_PER_LIST);
    }
    html.push_str("</ul>\n");
}
