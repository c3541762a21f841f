//! # IC Catalog
//!
//! The registry of every chip the emulator knows about. The built-in catalog
//! is a JSON document compiled into the binary; further catalogs can be
//! loaded from disk and merged on top, so adding a chip never touches the
//! evaluator.
//!
//! ## Catalog File Format
//!
//! ```json
//! {
//!   "ics": [
//!     {
//!       "name": "7404",
//!       "description": "Hex inverter",
//!       "pins": [{"pin": 1, "role": "INPUT", "label": "1A"}, ...],
//!       "gates": [{"kind": "NOT", "inputs": [1], "output": 2}, ...]
//!     }
//!   ]
//! }
//! ```

use crate::error::ConfigError;
use crate::profile::IcProfile;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const BUILTIN_CATALOG: &str = include_str!("../catalog/ics.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub ics: Vec<IcProfile>,
}

/// One row of the `LIST` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub pin_count: usize,
    pub gate_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IcRegistry {
    profiles: Vec<Arc<IcProfile>>,
}

impl IcRegistry {
    /// Registry holding the catalog compiled into the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_profiles(file.ics)
    }

    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Validate and register a list of profiles.
    pub fn from_profiles(profiles: Vec<IcProfile>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut registry = IcRegistry::default();

        for profile in profiles {
            if !seen.insert(profile.name.clone()) {
                return Err(ConfigError::InvalidProfile {
                    profile: profile.name,
                    reason: "duplicate name in catalog".to_string(),
                });
            }
            for finding in profile.validate()? {
                warn!("Catalog entry {}: {}", profile.name, finding);
            }
            debug!(
                "Registered {} ({} pins, {} gates)",
                profile.name,
                profile.pin_count(),
                profile.gate_count()
            );
            registry.profiles.push(Arc::new(profile));
        }

        Ok(registry)
    }

    /// Overlay another registry. Profiles with a name already present are
    /// replaced in place; new ones are appended.
    pub fn merge(&mut self, other: IcRegistry) {
        for profile in other.profiles {
            match self.profiles.iter_mut().find(|p| p.name == profile.name) {
                Some(existing) => {
                    debug!("Catalog entry {} replaced", profile.name);
                    *existing = profile;
                }
                None => self.profiles.push(profile),
            }
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn find(&self, name: &str) -> Option<Arc<IcProfile>> {
        self.profiles.iter().find(|p| p.name == name).cloned()
    }

    pub fn list(&self) -> Vec<CatalogEntry> {
        self.profiles
            .iter()
            .map(|p| CatalogEntry {
                name: p.name.clone(),
                pin_count: p.pin_count(),
                gate_count: p.gate_count(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
