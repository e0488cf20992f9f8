//! Configuration for placement services and the sync client.

use crate::placement::domain::DEFAULT_POSITION_GAP;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the placement state machine.
///
/// # Examples
///
/// ```
/// use sprintboard::placement::config::PlacementConfig;
///
/// let config = PlacementConfig::default();
/// assert_eq!(config.position_gap, 1024);
/// assert!(config.allow_force_override);
///
/// let strict = PlacementConfig::strict();
/// assert!(!strict.allow_force_override);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Spacing between positions after an append or a renumber.
    pub position_gap: u64,
    /// Whether `force` may override a blocking denial.
    pub allow_force_override: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            position_gap: DEFAULT_POSITION_GAP,
            allow_force_override: true,
        }
    }
}

impl PlacementConfig {
    /// Creates a configuration with the smallest usable gap.
    ///
    /// Every midpoint insert between adjacent tasks renumbers the
    /// container, which makes renumbering easy to observe in tests.
    #[must_use]
    pub const fn dense() -> Self {
        Self {
            position_gap: 2,
            allow_force_override: true,
        }
    }

    /// Creates a configuration where blocking denials cannot be forced.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            position_gap: DEFAULT_POSITION_GAP,
            allow_force_override: false,
        }
    }

    /// Parses a configuration from JSON, filling missing fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the input is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Configuration for [`crate::placement::sync::SyncClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long the client waits for the server before rolling back.
    pub request_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
        }
    }
}

impl SyncConfig {
    /// Creates a configuration with the given timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            request_timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
