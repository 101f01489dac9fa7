//! Mapper facade and rule registry
//!
//! The [`Mapper`] owns every registered converter, declarative map and
//! map-any convention. It is immutable once built and may be shared across
//! threads; all per-call state lives in a [`MappingContext`].
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

mod builder;
mod context;
mod dispatch;


pub use builder::MapperBuilder;
pub use context::MappingContext;

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;

use tracing::warn;

use crate::convention::{ConventionExecutor, MappingInfo};
use crate::converter::Converter;
use crate::declarative::MapExecutor;
use crate::error::{Error, Result};
use crate::types::TypeInfo;
use crate::value::MapValue;

use dispatch::Strictness;

/// Immutable, thread-safe entry point for mapping operations
pub struct Mapper {
    registry: Registry,
}

impl Mapper {
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    /// Fresh context for a top-level call; dropped when the call returns
    pub fn context(&self) -> MappingContext<'_> {
        MappingContext::new(self)
    }

    /// Map `source` into the existing `destination`
    pub fn map<S: MapValue, D: MapValue>(&self, source: &S, destination: &D) -> Result<()> {
        self.context().map(source, destination)
    }

    pub fn map_if_available<S: MapValue, D: MapValue>(&self, source: &S, destination: &D) -> Result<bool> {
        self.context().map_if_available(source, destination)
    }

    /// Produce a new `D` from `source`
    pub fn map_to<D: MapValue>(&self, source: &impl MapValue) -> Result<D> {
        self.context().map_to(source)
    }

    pub fn map_to_if_available<D: MapValue>(&self, source: &impl MapValue) -> Result<Option<D>> {
        self.context().map_to_if_available(source)
    }
}

impl MappingInfo for Mapper {
    fn is_converter_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool {
        self.registry.info().is_converter_available(source, destination)
    }

    fn is_map_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool {
        self.registry.info().is_map_available(source, destination)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("maps", &self.registry.maps.len())
            .field("converters", &self.registry.converters)
            .field("conventions", &self.registry.conventions.len())
            .finish()
    }
}

/// Registered rules, in registration order
#[derive(Default)]
pub(crate) struct Registry {
    maps: Vec<Box<dyn MapExecutor>>,
    converters: Vec<Converter>,
    conventions: Vec<ConventionExecutor>,
}

impl Registry {
    pub(crate) fn select_map(&self, source: &TypeInfo, destination: &TypeInfo) -> Option<&dyn MapExecutor> {
        dispatch::select(
            &self.maps,
            |map| (map.source_type(), map.destination_type()),
            source,
            destination,
            Strictness::Relaxed,
        )
        .map(|map| map.as_ref())
    }

    pub(crate) fn select_converter(&self, source: &TypeInfo, destination: &TypeInfo) -> Option<&Converter> {
        dispatch::select(
            &self.converters,
            |converter| (converter.source_type(), converter.destination_type()),
            source,
            destination,
            Strictness::StrictDestination,
        )
    }

    fn has_map(&self, source: &TypeInfo, destination: &TypeInfo) -> bool {
        self.maps
            .iter()
            .any(|map| map.source_type() == *source && map.destination_type() == *destination)
    }

    pub(crate) fn info(&self) -> RegistryInfo<'_> {
        RegistryInfo {
            registry: self,
            resolving: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
        }
    }
}

/// Availability queries over a registry.
///
/// A pair whose convention bindings are being resolved is reported as
/// available, which lets self-referencing and mutually referencing types
/// resolve without recursing forever. A configuration error raised while
/// probing a map-any convention is kept so the caller can surface it.
pub(crate) struct RegistryInfo<'r> {
    registry: &'r Registry,
    resolving: RefCell<Vec<(TypeId, TypeId)>>,
    failure: RefCell<Option<Error>>,
}

impl RegistryInfo<'_> {
    /// First configuration error recorded by availability probes
    pub(crate) fn take_failure(&self) -> Option<Error> {
        self.failure.borrow_mut().take()
    }

    fn record_failure(&self, source: &TypeInfo, destination: &TypeInfo, err: Error) {
        warn!(
            source = source.name(),
            destination = destination.name(),
            error = %err,
            "convention failed while probing availability"
        );
        if err.is_configuration() {
            let mut failure = self.failure.borrow_mut();
            if failure.is_none() {
                *failure = Some(err);
            }
        }
    }
}

impl MappingInfo for RegistryInfo<'_> {
    fn is_converter_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool {
        self.registry.select_converter(source, destination).is_some()
    }

    fn is_map_available(&self, source: &TypeInfo, destination: &TypeInfo) -> bool {
        if self.registry.select_map(source, destination).is_some() {
            return true;
        }
        let pair = (source.id(), destination.id());
        if self.resolving.borrow().contains(&pair) {
            return true;
        }
        self.resolving.borrow_mut().push(pair);
        let available = self.registry.conventions.iter().any(|convention| {
            convention
                .can_map(self, source, destination)
                .unwrap_or_else(|err| {
                    self.record_failure(source, destination, err);
                    false
                })
        });
        self.resolving.borrow_mut().retain(|p| *p != pair);
        available
    }
}
