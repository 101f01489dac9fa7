//! Mapper settings loadable from JSON
//!
//! `MapperSettings` selects which bundled converter families are registered
//! and optionally describes a fallback name-based convention.

use std::path::Path;

use beancp_core::{MapperBuilder, NameBasedMapConvention};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::{datetime_converters, number_converters};

/// Settings for a [`NameBasedMapConvention`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionSettings {
    /// Case-insensitive patterns; when non-empty only matching destination members are bound
    pub include_destination_members: Vec<String>,

    /// Case-insensitive patterns for destination members never bound
    pub exclude_destination_members: Vec<String>,

    pub flattening: bool,

    pub fail_if_not_all_destination_members_mapped: bool,

    pub fail_if_not_all_source_members_mapped: bool,
}

impl ConventionSettings {
    pub fn into_convention(self) -> Result<NameBasedMapConvention> {
        let mut convention = NameBasedMapConvention::new()
            .include_destination_members(&self.include_destination_members)?
            .exclude_destination_members(&self.exclude_destination_members)?;
        if self.flattening {
            convention = convention.enable_flattening();
        }
        if self.fail_if_not_all_destination_members_mapped {
            convention = convention.fail_if_not_all_destination_members_mapped();
        }
        if self.fail_if_not_all_source_members_mapped {
            convention = convention.fail_if_not_all_source_members_mapped();
        }
        Ok(convention)
    }
}

/// Which bundled rules to register on a builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    pub number_converters: bool,

    pub datetime_converters: bool,

    /// Registered with `add_map_any_by_convention` when present
    pub map_any_convention: Option<ConventionSettings>,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            number_converters: true,
            datetime_converters: true,
            map_any_convention: None,
        }
    }
}

impl MapperSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Json {
            message: "Failed to parse mapper settings".to_string(),
            source: e,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read mapper settings from {:?}", path),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Json {
            message: format!("Failed to parse mapper settings from {:?}", path),
            source: e,
        })
    }
}

/// Register the bundled rules selected by `settings`.
///
/// Converters are appended after anything already registered, so earlier
/// user converters win ties.
pub fn register_defaults(mut builder: MapperBuilder, settings: &MapperSettings) -> Result<MapperBuilder> {
    if settings.number_converters {
        builder = builder.add_converters(number_converters())?;
    }
    if settings.datetime_converters {
        builder = builder.add_converters(datetime_converters())?;
    }
    if let Some(convention) = &settings.map_any_convention {
        builder = builder.add_map_any_by_convention(convention.clone().into_convention()?);
    }
    debug!(
        numbers = settings.number_converters,
        datetime = settings.datetime_converters,
        map_any = settings.map_any_convention.is_some(),
        "bundled rules registered"
    );
    Ok(builder)
}
