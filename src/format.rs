use std::fmt::Write;
use std::path::Path;

use crate::config::Config;
use crate::outline::Toc;

/// Build the standard header line:
/// `# path/to/note.md (N headers)`
pub fn outline_header(path: &Path, count: usize) -> String {
    let noun = if count == 1 { "header" } else { "headers" };
    format!("# {} ({count} {noun})", path.display())
}

/// Plain-text outline, one header per line:
/// `[line] <indent>text  #slug`
pub fn render_text(toc: &Toc, config: &Config) -> String {
    let entries = match toc {
        Toc::NoDocument => return config.empty_message.clone(),
        Toc::Ready { entries } => entries,
    };
    let last = entries.last().map_or(1, |e| e.line.max(1));
    let width = (last.ilog10() + 1) as usize;

    let mut out = String::new();
    for entry in entries {
        let indent = " ".repeat(config.text_indent * entry.level.saturating_sub(1));
        let _ = writeln!(
            out,
            "[{:>width$}] {indent}{}  #{}",
            entry.line, entry.text, entry.slug
        );
    }
    out
}

pub fn render_json(toc: &Toc) -> String {
    // A Toc is plain strings and integers; serialization cannot fail.
    serde_json::to_string_pretty(toc).unwrap_or_default()
}
