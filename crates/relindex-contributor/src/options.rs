//! Contributor configuration.

use serde::{Deserialize, Serialize};

/// Options for one contributor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributorOptions {
    /// Keep a line-per-event trace of recorded relationships and misses.
    pub trace: bool,
}

impl ContributorOptions {
    /// Options with tracing enabled.
    pub fn traced() -> Self {
        ContributorOptions { trace: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let options: ContributorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ContributorOptions::default());
        assert!(!options.trace);
        assert!(ContributorOptions::traced().trace);
    }
}
