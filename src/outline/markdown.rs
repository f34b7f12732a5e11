/// A header line found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Number of leading `#` characters. Not clamped to 6.
    pub level: usize,
    /// Everything after the marker and its single separating whitespace, raw.
    pub text: String,
    /// 1-based line number in the source document.
    pub line: u32,
}

/// Header extraction via memchr line scan — no markdown parser needed.
/// A header is one or more `#` at column 0 followed by exactly one
/// whitespace character; the rest of the line is the text, verbatim.
/// Code fences are not tracked: a `# comment` inside a fence is a header too.
pub fn extract(text: &str) -> Vec<HeaderRecord> {
    let buf = text.as_bytes();
    let mut headers = Vec::new();
    let mut pos = 0;
    let mut line_num = 0u32;

    while pos <= buf.len() {
        line_num += 1;

        let line_end = memchr::memchr(b'\n', &buf[pos..]).map_or(buf.len(), |i| pos + i);

        // Splitting on an ASCII byte keeps both halves on char boundaries
        let line = &text[pos..line_end];

        // `\r` may be the separator itself (`"#\r"`), so strip it from the text only
        if let Some((level, body)) = parse_header(line) {
            headers.push(HeaderRecord {
                level,
                text: body.strip_suffix('\r').unwrap_or(body).to_string(),
                line: line_num,
            });
        }

        pos = line_end + 1;
    }

    headers
}

/// Split a single line into (level, text) if it is a header line.
fn parse_header(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    let sep = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some((level, &rest[sep.len_utf8()..]))
}
