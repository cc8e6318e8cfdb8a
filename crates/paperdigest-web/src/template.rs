use axum::response::Html;

use paperdigest_core::SummaryLength;
use paperdigest_ingest::DocumentOutcome;

use crate::pipeline::DigestPage;

const INDEX_HTML: &str = include_str!("../templates/index.html");
const RESULT_HTML: &str = include_str!("../templates/result.html");

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Substitute `{{ name }}` placeholders in one pass, so inserted values are
/// never scanned for placeholders themselves. Unknown names render empty.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after[..end].trim();
        if let Some((_, value)) = values.iter().find(|(k, _)| *k == name) {
            out.push_str(value);
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Render the search form, optionally with an error message and the
/// previously entered topic.
pub fn render_index(topic: &str, error: Option<&str>, default_length: SummaryLength) -> Html<String> {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();
    Html(fill(
        INDEX_HTML,
        &[
            ("error", &error_html),
            ("topic", &escape_html(topic)),
            ("length", &default_length.to_string()),
        ],
    ))
}

/// Render per-document summaries and the aggregate summary.
pub fn render_result(topic: &str, page: &DigestPage) -> Html<String> {
    let mut documents = String::new();
    if page.report.is_empty() {
        documents.push_str("<p>No documents could be downloaded for this topic.</p>\n");
    }
    for document in &page.report.documents {
        documents.push_str(&format!(
            "<h3>{}</h3>\n",
            escape_html(document.filename())
        ));
        match document {
            DocumentOutcome::Summarized { summary, .. } => {
                documents.push_str(&format!("<p>{}</p>\n", escape_html(summary)));
            }
            DocumentOutcome::Failed { error, .. } => {
                documents.push_str(&format!(
                    "<p class=\"failed\">Could not read this document: {}</p>\n",
                    escape_html(error)
                ));
            }
        }
    }

    let mut skipped = String::new();
    if !page.downloads.skipped.is_empty() {
        skipped.push_str("<ul class=\"skipped\">\n");
        for item in &page.downloads.skipped {
            skipped.push_str(&format!(
                "<li>Skipped {} ({})</li>\n",
                escape_html(&item.url),
                escape_html(&item.reason.to_string())
            ));
        }
        skipped.push_str("</ul>\n");
    }

    Html(fill(
        RESULT_HTML,
        &[
            ("topic", &escape_html(topic)),
            ("summary", &escape_html(&page.report.aggregate)),
            ("documents", &documents),
            ("skipped", &skipped),
        ],
    ))
}
