//! HTML rendering of the table of contents panel.
//!
//! Header text is untrusted document content: both the text and the slug are
//! escaped before they go anywhere near markup.

use std::fmt::Write;

use crate::config::Config;
use crate::outline::Toc;

/// Message name the click script posts back to the host.
pub const SCROLL_MESSAGE: &str = "scrollToHash";

const STYLESHEET: &str = r#".container { font-family: sans-serif; font-size: 13px; padding: 4px 8px; }
.toc-item { margin: 2px 0; }
.toc-item-link { color: inherit; text-decoration: none; }
.toc-item-link:hover { text-decoration: underline; }"#;

/// Posts the clicked slug to the host bridge when there is one.
const CLICK_SCRIPT: &str = r#"document.addEventListener('click', event => {
  const element = event.target;
  if (element.className !== 'toc-item-link') return;
  event.preventDefault();
  const slug = element.dataset.slug;
  if (typeof webviewApi !== 'undefined') {
    webviewApi.postMessage({ name: 'scrollToHash', hash: slug });
  } else {
    console.info('Clicked header slug: ' + slug);
  }
});"#;

pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Panel body: one indented link per header, or the empty-state message.
pub fn render_html(toc: &Toc, config: &Config) -> String {
    let entries = match toc {
        Toc::NoDocument => return escape_html(&config.empty_message),
        Toc::Ready { entries } => entries,
    };

    let mut out = String::from("<div class=\"container\">\n");
    for entry in entries {
        let padding = (entry.level.saturating_sub(1) as u64) * u64::from(config.indent_px);
        let _ = writeln!(
            out,
            "<p class=\"toc-item\" style=\"padding-left:{padding}px\"><a class=\"toc-item-link\" href=\"#\" data-slug=\"{}\">{}</a></p>",
            escape_html(&entry.slug),
            escape_html(&entry.text),
        );
    }
    out.push_str("</div>");
    out
}

pub fn render_loading(config: &Config) -> String {
    escape_html(&config.loading_message)
}

/// Standalone page with stylesheet and click script, for viewing a panel
/// outside a host application.
pub fn render_page(toc: &Toc, config: &Config) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n{}\n<script>\n{CLICK_SCRIPT}\n</script>\n</body>\n</html>\n",
        render_html(toc, config)
    )
}
