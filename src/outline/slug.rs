use std::collections::{HashMap, HashSet};

/// Base used when header text has nothing slug-worthy in it.
pub const EMPTY_SLUG: &str = "section";

/// Map arbitrary text to a URL-safe token: transliterate to ASCII,
/// lowercase, drop apostrophes, fold every other run of non-alphanumerics
/// into a single `-`, trim hyphens at both ends.
///
/// Collision-prone by design — `"A b"` and `"a-B"` share a base.
pub fn slugify_base(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut out = String::with_capacity(ascii.len());
    let mut pending_sep = false;

    for c in ascii.chars() {
        if c == '\'' {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        out
    }
}

/// Per-pass bookkeeping: base slug → next suffix to try, plus every slug
/// handed out so far. Never outlives one extraction pass.
#[derive(Debug, Default)]
pub struct CollisionTable {
    next_suffix: HashMap<String, usize>,
    emitted: HashSet<String>,
}

impl CollisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.next_suffix.clear();
        self.emitted.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    /// Claim a unique slug for `base`. First claim gets `base` itself,
    /// later ones `base-2`, `base-3`, … skipping anything already emitted.
    fn claim(&mut self, base: String) -> String {
        let mut n = self.next_suffix.get(&base).copied().unwrap_or(1);
        let mut candidate = if n == 1 {
            base.clone()
        } else {
            format!("{base}-{n}")
        };
        while self.emitted.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.next_suffix.insert(base, n + 1);
        self.emitted.insert(candidate.clone());
        candidate
    }
}

/// Hands out unique slugs for headers, in document order.
///
/// Must be fed headers in the order they appear: the first occurrence of a
/// base wins the plain form, so feeding out of order renumbers everything.
#[derive(Debug, Default)]
pub struct SlugGenerator {
    table: CollisionTable,
}

impl SlugGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every slug from the previous pass.
    pub fn reset(&mut self) {
        self.table.clear();
    }

    pub fn slugify(&mut self, text: &str) -> String {
        self.table.claim(slugify_base(text))
    }

    pub fn table(&self) -> &CollisionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_lowercases_and_hyphenates() {
        assert_eq!(slugify_base("My Header"), "my-header");
        assert_eq!(slugify_base("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify_base("a--b__c"), "a-b-c");
    }

    #[test]
    fn base_strips_diacritics() {
        assert_eq!(slugify_base("Café Überblick"), "cafe-uberblick");
        assert_eq!(slugify_base("Ñandú"), "nandu");
    }

    #[test]
    fn base_drops_apostrophes() {
        assert_eq!(slugify_base("Don't Panic"), "dont-panic");
    }

    #[test]
    fn base_of_degenerate_text() {
        assert_eq!(slugify_base(""), EMPTY_SLUG);
        assert_eq!(slugify_base("   "), EMPTY_SLUG);
        assert_eq!(slugify_base("!?*"), EMPTY_SLUG);
    }

    #[test]
    fn base_is_url_safe() {
        let s = slugify_base("<script>alert(\"x\")</script>");
        assert_eq!(s, "script-alert-x-script");
        assert!(s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'));
    }

    #[test]
    fn first_occurrence_wins_plain_form() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.slugify("Sub"), "sub");
        assert_eq!(slugs.slugify("Sub"), "sub-2");
        assert_eq!(slugs.slugify("sub"), "sub-3");
        assert_eq!(slugs.slugify("Other"), "other");
    }

    #[test]
    fn empty_text_collides_uniformly() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.slugify(""), "section");
        assert_eq!(slugs.slugify("  "), "section-2");
        assert_eq!(slugs.slugify("Section"), "section-3");
    }

    #[test]
    fn literal_suffix_does_not_duplicate_generated_one() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.slugify("Sub"), "sub");
        assert_eq!(slugs.slugify("Sub"), "sub-2");
        // "Sub 2" has base "sub-2", already handed out
        assert_eq!(slugs.slugify("Sub 2"), "sub-2-2");
        assert_eq!(slugs.slugify("Sub"), "sub-3");
    }

    #[test]
    fn generated_suffix_skips_literal_one() {
        let mut slugs = SlugGenerator::new();
        assert_eq!(slugs.slugify("Sub 2"), "sub-2");
        assert_eq!(slugs.slugify("Sub"), "sub");
        assert_eq!(slugs.slugify("Sub"), "sub-3");
    }

    #[test]
    fn reset_reproduces_first_pass() {
        let texts = ["Intro", "Intro", "Usage", "Intro 2", ""];
        let mut slugs = SlugGenerator::new();
        let first: Vec<String> = texts.iter().map(|t| slugs.slugify(t)).collect();
        slugs.reset();
        assert!(slugs.table().is_empty());
        let second: Vec<String> = texts.iter().map(|t| slugs.slugify(t)).collect();
        assert_eq!(first, second);
    }
}
