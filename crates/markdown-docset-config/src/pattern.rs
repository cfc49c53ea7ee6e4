use globset::{GlobBuilder, GlobMatcher};

/// Glob pattern plus its compiled matcher.
///
/// Patterns are matched against base names only, so `*` never has to cross a
/// path separator.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    /// Compile `value` with shell-glob semantics (`*` stops at `/`).
    pub fn new(value: impl Into<String>) -> Result<Self, globset::Error> {
        let original = value.into();
        let glob = GlobBuilder::new(&original)
            .literal_separator(true)
            .build()?;
        Ok(Pattern {
            matcher: glob.compile_matcher(),
            original,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns true when the base name `name` matches the pattern.
    pub fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }
}

/// Ordered list of glob patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        PatternList { patterns }
    }

    /// True when any pattern in the list matches `name`.
    pub fn matches_any(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_does_not_cross_separator() {
        let pattern = Pattern::new("*.md").unwrap();
        assert!(pattern.is_match("guide.md"));
        assert!(pattern.is_match(".hidden.md"));
        assert!(!pattern.is_match("docs/guide.md"));
        assert!(!pattern.is_match("guide.txt"));
    }

    #[test]
    fn list_matches_any_entry() {
        let list = PatternList::new(vec![
            Pattern::new("draft-*").unwrap(),
            Pattern::new("CHANGELOG.md").unwrap(),
        ]);
        assert!(list.matches_any("draft-intro.md"));
        assert!(list.matches_any("CHANGELOG.md"));
        assert!(!list.matches_any("intro.md"));
        assert!(!PatternList::default().matches_any("intro.md"));
    }
}
