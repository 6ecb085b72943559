//! GPU selector domain type
//!
//! Parses the raw selector strings coming from the `--gpu` flag and the
//! selection environment variable.
//!
//! Parsing is fail-closed: anything that is not a comma-separated list of
//! non-negative integers (an unknown token such as `NoDevFiles`, a negative
//! index, an empty item) selects no GPUs instead of failing the launch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a raw selector string came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorSource {
    /// The `--gpu` command-line flag
    Cmdline,
    /// The selection environment variable
    Env,
}

impl fmt::Display for SelectorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorSource::Cmdline => write!(f, "command line"),
            SelectorSource::Env => write!(f, "environment"),
        }
    }
}

/// A parsed GPU selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "indices", rename_all = "lowercase")]
pub enum GpuSelector {
    /// Not provided by this source
    Unspecified,
    /// Explicitly selects no GPUs
    None,
    /// Ordered, deduplicated GPU indices (first occurrence wins)
    Indices(Vec<u32>),
}

impl GpuSelector {
    /// Parse a raw selector. `None` input means the source did not provide one.
    pub fn parse(raw: Option<&str>, source: SelectorSource) -> Self {
        let Some(raw) = raw else {
            return GpuSelector::Unspecified;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            log::debug!("Empty GPU selector from {}: no GPUs", source);
            return GpuSelector::None;
        }

        match parse_index_list(trimmed) {
            Some(indices) => GpuSelector::Indices(indices),
            None => {
                log::warn!(
                    "Unrecognized GPU selector {:?} from {}: exposing no GPUs",
                    raw,
                    source
                );
                GpuSelector::None
            }
        }
    }

    /// Build a selector directly from indices, deduplicating in order
    pub fn from_indices<I: IntoIterator<Item = u32>>(indices: I) -> Self {
        let mut out = Vec::new();
        for idx in indices {
            if !out.contains(&idx) {
                out.push(idx);
            }
        }
        GpuSelector::Indices(out)
    }

    /// Whether this source provided a selector at all
    pub fn is_specified(&self) -> bool {
        !matches!(self, GpuSelector::Unspecified)
    }

    /// Selected indices in order; empty for `Unspecified` and `None`
    pub fn indices(&self) -> &[u32] {
        match self {
            GpuSelector::Indices(indices) => indices,
            _ => &[],
        }
    }
}

impl fmt::Display for GpuSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuSelector::Unspecified => write!(f, "unspecified"),
            GpuSelector::None => write!(f, "none"),
            GpuSelector::Indices(indices) => write!(f, "{}", join_indices(indices)),
        }
    }
}

/// Join indices the way selectors are written (`0,1`)
pub fn join_indices(indices: &[u32]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_index_list(s: &str) -> Option<Vec<u32>> {
    let mut indices = Vec::new();
    for item in s.split(',') {
        let item = item.trim();
        // u32::from_str accepts a leading '+'
        if item.is_empty() || !item.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let idx: u32 = item.parse().ok()?;
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    Some(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(s: &str) -> GpuSelector {
        GpuSelector::parse(Some(s), SelectorSource::Env)
    }

    #[test]
    fn test_absent_is_unspecified() {
        assert_eq!(
            GpuSelector::parse(None, SelectorSource::Cmdline),
            GpuSelector::Unspecified
        );
        assert!(!GpuSelector::Unspecified.is_specified());
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(env(""), GpuSelector::None);
        assert_eq!(env("   "), GpuSelector::None);
        assert!(GpuSelector::None.is_specified());
    }

    #[test]
    fn test_unknown_token_is_none() {
        assert_eq!(env("NoDevFiles"), GpuSelector::None);
        assert_eq!(
            GpuSelector::parse(Some("NoDevFiles"), SelectorSource::Cmdline),
            GpuSelector::None
        );
    }

    #[test]
    fn test_index_list_keeps_order() {
        assert_eq!(env("0,1"), GpuSelector::Indices(vec![0, 1]));
        assert_eq!(env("1,0"), GpuSelector::Indices(vec![1, 0]));
        assert_eq!(env(" 2 , 0 "), GpuSelector::Indices(vec![2, 0]));
    }

    #[test]
    fn test_duplicates_removed_first_seen() {
        assert_eq!(env("1,0,1,0"), GpuSelector::Indices(vec![1, 0]));
        assert_eq!(
            GpuSelector::from_indices([3, 3, 1]),
            GpuSelector::Indices(vec![3, 1])
        );
    }

    #[test]
    fn test_malformed_lists_fail_closed() {
        for raw in ["-1", "0,-1", "0,,1", "0,", "+1", "0,abc", "1.5", "4294967296"] {
            assert_eq!(env(raw), GpuSelector::None, "input {:?}", raw);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(GpuSelector::Indices(vec![1, 0]).to_string(), "1,0");
        assert_eq!(GpuSelector::None.to_string(), "none");
        assert_eq!(GpuSelector::Unspecified.to_string(), "unspecified");
    }

    #[test]
    fn test_indices_accessor() {
        assert!(GpuSelector::None.indices().is_empty());
        assert_eq!(env("0,1").indices(), &[0, 1]);
    }
}
