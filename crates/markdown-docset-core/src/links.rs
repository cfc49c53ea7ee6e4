//! Line-level content rewriting applied to merged documents.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Remove a leading front-matter block.
///
/// The first line must be exactly `---`; everything through the next bare
/// `---` line is dropped. Without a closing delimiter the whole document is
/// treated as front matter and nothing remains.
pub fn strip_front_matter(content: &str) -> &str {
    let mut segments = content.split_inclusive('\n');
    let Some(first) = segments.next().filter(|first| is_delimiter(first)) else {
        return content;
    };

    let mut offset = first.len();
    for segment in segments {
        offset += segment.len();
        if is_delimiter(segment) {
            return &content[offset..];
        }
    }

    ""
}

fn is_delimiter(segment: &str) -> bool {
    segment.trim_end_matches(&['\r', '\n'][..]) == "---"
}

/// Return true if the target points to an external resource (http/mailto/etc.).
pub fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

/// Re-anchor relative link targets at `base`.
///
/// External URLs, same-document anchors and absolute paths are left alone so
/// the merged output still resolves back to the original files.
pub fn rewrite_relative_links(content: &str, base: &Path) -> String {
    LINK_PATTERN
        .replace_all(content, |caps: &Captures<'_>| {
            let text = &caps[1];
            let target = &caps[2];

            if is_external(target) || target.starts_with('#') || Path::new(target).is_absolute() {
                return caps[0].to_string();
            }

            let joined = clean_join(base, target);
            format!("[{text}]({})", joined.display())
        })
        .into_owned()
}

/// Join `target` onto `base` and resolve `.`/`..` lexically.
///
/// Leading `..` segments that cannot be popped are kept, so `../docs` joined
/// with `a.md` stays `../docs/a.md`.
pub fn clean_join(base: &Path, target: &str) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in base.join(target).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    cleaned.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_front_matter_block() {
        let content = "---\ntitle: Guide\ntags: [a]\n---\n# Guide\nBody\n";
        assert_eq!(strip_front_matter(content), "# Guide\nBody\n");
    }

    #[test]
    fn front_matter_requires_bare_delimiters() {
        let horizontal_rule = "----\n# Title\n";
        assert_eq!(strip_front_matter(horizontal_rule), horizontal_rule);

        let unterminated = "---\ntitle: x\n# Body\ntext";
        assert_eq!(strip_front_matter(unterminated), "");

        let crlf = "---\r\ntitle: x\r\n---\r\nBody";
        assert_eq!(strip_front_matter(crlf), "Body");
    }

    #[test]
    fn rewrites_relative_links_only() {
        let base = Path::new("docs");
        assert_eq!(
            rewrite_relative_links("[see](./other.md)", base),
            "[see](docs/other.md)"
        );
        assert_eq!(
            rewrite_relative_links("[site](https://example.com)", base),
            "[site](https://example.com)"
        );
        assert_eq!(
            rewrite_relative_links("[anchor](#section)", base),
            "[anchor](#section)"
        );
        assert_eq!(
            rewrite_relative_links("[abs](/etc/hosts) and [up](../README.md#top)", base),
            "[abs](/etc/hosts) and [up](README.md#top)"
        );
    }

    #[test]
    fn clean_join_keeps_unresolvable_parents() {
        assert_eq!(clean_join(Path::new("../docs"), "a.md"), PathBuf::from("../docs/a.md"));
        assert_eq!(clean_join(Path::new("."), "a.md"), PathBuf::from("a.md"));
        assert_eq!(clean_join(Path::new("docs"), "../../x.md"), PathBuf::from("../x.md"));
    }
}
