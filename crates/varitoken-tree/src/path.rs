//! Token path normalization.
//!
//! Variable names in the export mix `/` (design-tool folders) and `.` (token
//! notation) freely. Both are path separators; segments are trimmed and empty
//! ones dropped, so `" colors/brand "` + `"accent.bg"` and
//! `"colors/brand/"` + `"accent/bg"` land on the same path.

use std::fmt;

/// Characters that split a group or name into segments.
pub const SEPARATORS: [char; 2] = ['/', '.'];

/// An ordered, non-empty-segment path into a token tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath {
    segments: Vec<String>,
}

impl TokenPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self {
            segments: segments
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Normalize a row's `group` and `name` into one path.
    ///
    /// Group segments come first. With `kebab_names`, each name segment is
    /// kebab-cased; group segments are never rewritten.
    pub fn from_group_and_name(group: Option<&str>, name: &str, kebab_names: bool) -> Self {
        let mut segments: Vec<String> = group.map(split_segments).unwrap_or_default();
        let name_segments = split_segments(name);
        if kebab_names {
            segments.extend(
                name_segments
                    .iter()
                    .map(|s| kebab_case(s))
                    .filter(|s| !s.is_empty()),
            );
        } else {
            segments.extend(name_segments);
        }
        Self { segments }
    }

    /// Parse a dotted (or slashed) path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: split_segments(path),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> TokenPath {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Segments joined with `.`, the form used in alias references.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

fn split_segments(raw: &str) -> Vec<String> {
    raw.split(SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase, collapse runs of anything outside `[a-z0-9]` into `-`, and strip
/// leading/trailing dashes: `"Beaver Orange"` → `"beaver-orange"`.
pub fn kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}
