//! Mapping conventions
//!
//! A convention derives bindings between two types without the user listing
//! them. Conventions are used inside declarative maps (`use_convention`) and
//! as "map-any" fallbacks registered on the mapper builder.

mod name_based;

pub use name_based::NameBasedMapConvention;

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::binding::Binding;
use crate::error::Result;
use crate::types::TypeInfo;

/// Read-only view of what a mapper can do, offered to conventions while
/// they resolve bindings
pub trait MappingInfo {
    fn is_converter_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool;

    fn is_map_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool;
}

/// Strategy deriving bindings for a (source, destination) type pair
pub trait MapConvention: Send + Sync {
    /// Bindings for the pair; an empty list means the convention does not apply
    fn bindings(
        &self,
        info: &dyn MappingInfo,
        source: &TypeInfo,
        destination: &TypeInfo,
    ) -> Result<Vec<Binding>>;
}

/// Map-any fallback: a convention plus the bindings it resolved so far
pub(crate) struct ConventionExecutor {
    convention: Arc<dyn MapConvention>,
    cache: RwLock<HashMap<(TypeId, TypeId), Arc<Vec<Binding>>>>,
}

impl ConventionExecutor {
    pub(crate) fn new(convention: Arc<dyn MapConvention>) -> Self {
        Self {
            convention,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Bindings for the pair, resolved once and cached
    pub(crate) fn resolve(
        &self,
        info: &dyn MappingInfo,
        source: &TypeInfo,
        destination: &TypeInfo,
    ) -> Result<Arc<Vec<Binding>>> {
        let key = (source.id(), destination.id());
        if let Ok(cache) = self.cache.read() {
            if let Some(bindings) = cache.get(&key) {
                return Ok(bindings.clone());
            }
        }

        let bindings = Arc::new(self.convention.bindings(info, source, destination)?);
        debug!(
            source = source.name(),
            destination = destination.name(),
            count = bindings.len(),
            "resolved convention bindings"
        );
        match self.cache.write() {
            Ok(mut cache) => Ok(cache.entry(key).or_insert(bindings).clone()),
            Err(_) => Ok(bindings),
        }
    }

    /// Whether the convention yields bindings for the pair; resolution
    /// errors such as coverage violations are returned to the caller
    pub(crate) fn can_map(
        &self,
        info: &dyn MappingInfo,
        source: &TypeInfo,
        destination: &TypeInfo,
    ) -> Result<bool> {
        if !source.is_bean() || !destination.is_bean() {
            return Ok(false);
        }
        Ok(!self.resolve(info, source, destination)?.is_empty())
    }
}

impl fmt::Debug for ConventionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.cache.read().map(|c| c.len()).unwrap_or_default();
        f.debug_struct("ConventionExecutor")
            .field("cached_pairs", &cached)
            .finish()
    }
}
