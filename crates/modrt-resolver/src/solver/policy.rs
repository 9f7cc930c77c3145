use serde::{Deserialize, Serialize};

use crate::package::EntryRef;

/// Policy for ordering candidate exporters of a package.
///
/// Candidates are tried in the returned order and the first acceptable one
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderPolicy {
    /// Registration order
    #[default]
    FirstFit,
    /// Highest version first, registration order among equal versions
    HighestVersion,
}

impl ProviderPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first-fit" => Some(ProviderPolicy::FirstFit),
            "highest-version" => Some(ProviderPolicy::HighestVersion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderPolicy::FirstFit => "first-fit",
            ProviderPolicy::HighestVersion => "highest-version",
        }
    }

    /// Return the exporters in the order they should be tried.
    pub fn order_candidates(&self, exporters: &[EntryRef]) -> Vec<EntryRef> {
        let mut candidates = exporters.to_vec();
        if *self == ProviderPolicy::HighestVersion {
            // Stable sort keeps registration order for equal versions
            candidates.sort_by(|a, b| b.version().cmp(a.version()));
        }
        candidates
    }
}
