//! User preferences model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tiendita_core::ProfileId;

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    System,
    Light,
    Dark,
}

/// Preferences attached to a profile.
///
/// Keyed by a freshly generated id with a back-reference to the profile.
/// Created best-effort alongside the profile; its absence does not
/// invalidate the profile and other flows may recreate it lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub profile_id: ProfileId,
    pub theme: Theme,
    pub locale: String,
    pub enabled: bool,
    /// Free-form feature flags; structured but schema-less by design.
    #[serde(default)]
    pub flags: Map<String, Value>,
}

impl Preferences {
    /// Build the default preferences created alongside a new profile.
    #[must_use]
    pub fn defaults(profile_id: ProfileId, locale: impl Into<String>) -> Self {
        Self {
            profile_id,
            theme: Theme::System,
            locale: locale.into(),
            enabled: true,
            flags: Map::new(),
        }
    }
}
