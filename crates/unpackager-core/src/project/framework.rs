//! Windows TargetFramework extraction.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::descriptor::ProjectDescriptor;
use super::editor::property_groups;

/// Multi-targeting property holding the framework list
pub const TARGET_FRAMEWORKS_TAG: &str = "TargetFrameworks";

/// Attribute that marks a platform-specific framework list
pub const CONDITION_ATTR: &str = "Condition";

static MONIKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"net\d+\.\d+-windows\d+\.\d+\.\d+\.\d+").expect("moniker pattern is valid")
});

/// A Windows target framework moniker such as `net8.0-windows10.0.19041.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFramework(String);

impl TargetFramework {
    /// Wrap a moniker string
    pub fn new(moniker: impl Into<String>) -> Self {
        Self(moniker.into())
    }

    /// The moniker text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TargetFramework {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// All versioned Windows monikers appearing in `text`, in order.
pub fn extract_monikers(text: &str) -> Vec<&str> {
    MONIKER_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Find the first Windows moniker inside a conditional `TargetFrameworks`.
///
/// Property groups are visited in document order, then their direct
/// children in document order. The first match wins.
pub fn find_target_framework(descriptor: &ProjectDescriptor) -> Option<TargetFramework> {
    for group in property_groups(descriptor) {
        for element in group.child_elements() {
            if element.name != TARGET_FRAMEWORKS_TAG {
                continue;
            }
            if element.attribute(CONDITION_ATTR).unwrap_or_default().is_empty() {
                continue;
            }

            let text = element.text();
            if let Some(found) = extract_monikers(&text)
                .into_iter()
                .find(|m| m.contains("windows"))
            {
                tracing::debug!("Found target framework {}", found);
                return Some(TargetFramework::new(found));
            }
        }
    }
    None
}
