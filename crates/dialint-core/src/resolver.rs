//! Replacement selection for undeclared references.
//!
//! Used only by `fix --rewrite-references`. The default strategy is a cheap
//! name heuristic and its guesses should be reviewed by a human.

/// Picks a declared symbol to stand in for an undeclared one.
pub trait SimilarityStrategy: Send + Sync {
    /// `None` when `candidates` is empty.
    fn resolve(&self, undefined: &str, candidates: &[String]) -> Option<String>;
}

/// Matches names after stripping a shared reserved prefix.
///
/// A candidate wins when its stem contains the undefined stem or is
/// contained in it. Otherwise the first candidate
/// with the same prefix is returned, then the first candidate overall.
#[derive(Debug, Clone, Default)]
pub struct PrefixSimilarity {
    prefixes: Vec<String>,
}

impl PrefixSimilarity {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn split<'a>(&self, name: &'a str) -> (&'a str, &'a str) {
        for prefix in &self.prefixes {
            if let Some(stem) = name.strip_prefix(prefix.as_str()) {
                return (&name[..prefix.len()], stem);
            }
        }
        ("", name)
    }
}

impl SimilarityStrategy for PrefixSimilarity {
    fn resolve(&self, undefined: &str, candidates: &[String]) -> Option<String> {
        let (prefix, stem) = self.split(undefined);
        let same_prefix: Vec<&String> = candidates
            .iter()
            .filter(|c| self.split(c).0 == prefix)
            .collect();

        let related = |candidate: &&String| {
            let other = self.split(candidate).1;
            !other.is_empty()
                && !stem.is_empty()
                && (stem.contains(other) || other.contains(stem))
        };

        same_prefix
            .iter()
            .copied()
            .find(related)
            .or_else(|| same_prefix.first().copied())
            .cloned()
            .or_else(|| candidates.first().cloned())
    }
}
