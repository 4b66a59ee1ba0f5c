//! Markdown rendering for the report pane.
//!
//! The model answers in markdown (headings, bold, the visual table and the
//! fenced CSV block). The page shows it rendered, re-rendering the whole
//! transcript as each fragment arrives so half-written tables settle once
//! their last row lands.

use pulldown_cmark::{html, Event, Options, Parser};

/// Render markdown to HTML
///
/// Raw HTML in the input is escaped, never passed through.
///
/// # Examples
///
/// ```
/// use auditor_web::markdown::render_markdown;
///
/// assert_eq!(render_markdown("**Ativo**"), "<p><strong>Ativo</strong></p>\n");
/// ```
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
