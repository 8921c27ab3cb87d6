//! Named policy presets.

use crate::policy::{Policy, PolicyError, PolicyResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shared hosting: every capability denied
pub static SHARED: Lazy<Policy> = Lazy::new(|| Policy::restrictive("shared"));

/// Dedicated hosting: every capability granted
pub static PRO: Lazy<Policy> = Lazy::new(|| Policy::permissive("pro"));

/// Known preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// See [`SHARED`]
    Shared,
    /// See [`PRO`]
    Pro,
}

impl Preset {
    /// All presets
    pub const ALL: [Preset; 2] = [Self::Shared, Self::Pro];

    /// The preset's policy
    #[must_use]
    pub fn policy(&self) -> &'static Policy {
        match self {
            Self::Shared => &SHARED,
            Self::Pro => &PRO,
        }
    }

    /// Preset name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == lowered)
            .ok_or_else(|| PolicyError::UnknownPreset {
                name: s.to_string(),
            })
    }
}

/// Look up a preset policy by name
///
/// # Errors
///
/// Returns error if no preset has this name
pub fn preset(name: &str) -> PolicyResult<&'static Policy> {
    Ok(name.parse::<Preset>()?.policy())
}
