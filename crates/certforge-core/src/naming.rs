//! Output file naming.

use std::collections::HashSet;

/// Stem used when a name has no usable characters
pub const FALLBACK_STEM: &str = "certificado";

/// Turn a display name into a file stem.
///
/// Letters and digits (any script), spaces, hyphens and underscores are
/// kept; everything else is dropped. Trailing whitespace is trimmed and the
/// remaining spaces become underscores.
pub fn sanitize_stem(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    let stem = kept.trim_end().replace(' ', "_");
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// Hands out unique prefixed stems within one run
#[derive(Debug, Clone, Default)]
pub struct FileNamer {
    prefix: String,
    used: HashSet<String>,
}

impl FileNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            used: HashSet::new(),
        }
    }

    /// Prefixed stem for `name`; repeats get `_2`, `_3`, ...
    pub fn next_stem(&mut self, name: &str) -> String {
        let base = format!("{}{}", self.prefix, sanitize_stem(name));

        let mut candidate = base.clone();
        let mut counter = 1;
        while self.used.contains(&candidate) {
            counter += 1;
            candidate = format!("{}_{}", base, counter);
        }

        self.used.insert(candidate.clone());
        candidate
    }
}
