//! Per-call mapping context
//!
//! A [`MappingContext`] lives for one top-level mapping call. It remembers
//! which destination was created for which source object so that shared and
//! cyclic references keep their shape, and which (source, destination)
//! object pairs are currently being mapped so re-entrant calls stop.
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::Mapper;
use crate::error::{Error, Result};
use crate::types::TypeInfo;
use crate::value::{MapValue, Value};

pub struct MappingContext<'m> {
    mapper: &'m Mapper,
    /// `(source address, destination type) -> (source, destination)`; the
    /// source is held so its address cannot be reused during the call
    results: HashMap<(usize, TypeId), (Value, Value)>,
    in_progress: HashSet<(usize, usize)>,
}

impl<'m> MappingContext<'m> {
    pub(crate) fn new(mapper: &'m Mapper) -> Self {
        Self {
            mapper,
            results: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn mapper(&self) -> &'m Mapper {
        self.mapper
    }

    /// Map `source` into the existing `destination`
    pub fn map<S: MapValue, D: MapValue>(&mut self, source: &S, destination: &D) -> Result<()> {
        self.map_value_into(&source.clone().into_value(), &destination.clone().into_value())
    }

    /// Like [`map`](Self::map), returning `false` instead of failing when no
    /// rule applies
    pub fn map_if_available<S: MapValue, D: MapValue>(&mut self, source: &S, destination: &D) -> Result<bool> {
        self.try_map_into(&source.clone().into_value(), &destination.clone().into_value())
    }

    /// Produce a new `D` from `source`
    pub fn map_to<D: MapValue>(&mut self, source: &impl MapValue) -> Result<D> {
        let mapped = self.map_value_to(&source.clone().into_value(), D::type_info())?;
        typed(&mapped)
    }

    pub fn map_to_if_available<D: MapValue>(&mut self, source: &impl MapValue) -> Result<Option<D>> {
        match self.try_map_to(&source.clone().into_value(), D::type_info())? {
            Some(mapped) => typed(&mapped).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn map_value_into(&mut self, source: &Value, destination: &Value) -> Result<()> {
        if self.try_map_into(source, destination)? {
            Ok(())
        } else {
            Err(no_mapping(&source.type_info(), &destination.type_info()))
        }
    }

    pub(crate) fn map_value_to(&mut self, source: &Value, destination: TypeInfo) -> Result<Value> {
        self.try_map_to(source, destination)?
            .ok_or_else(|| no_mapping(&source.type_info(), &destination))
    }

    /// Destination already produced for `source` during this call
    pub(crate) fn known_result(&self, source: &Value, destination: &TypeInfo) -> Option<Value> {
        let identity = source.identity()?;
        self.results
            .get(&(identity, destination.id()))
            .map(|(_, mapped)| mapped.clone())
    }

    fn try_map_into(&mut self, source: &Value, destination: &Value) -> Result<bool> {
        let mapper = self.mapper;
        let source_type = source.type_info();
        let destination_type = destination.type_info();

        if let Some(map) = mapper.registry.select_map(&source_type, &destination_type) {
            self.remember(source, &destination_type, destination);
            return self.guarded(source, destination, |cx| map.execute(cx, source, destination));
        }

        if !source_type.is_bean() || !destination_type.is_bean() {
            return Ok(false);
        }
        let info = mapper.registry.info();
        for convention in &mapper.registry.conventions {
            let bindings = convention.resolve(&info, &source_type, &destination_type)?;
            if bindings.is_empty() {
                continue;
            }
            self.remember(source, &destination_type, destination);
            return self.guarded(source, destination, |cx| {
                bindings
                    .iter()
                    .try_for_each(|binding| binding.execute(cx, source, destination))
            });
        }
        Ok(false)
    }

    fn try_map_to(&mut self, source: &Value, destination_type: TypeInfo) -> Result<Option<Value>> {
        let mapper = self.mapper;
        let source_type = source.type_info();

        if let Some(converter) = mapper.registry.select_converter(&source_type, &destination_type) {
            trace!(
                source = source_type.name(),
                destination = destination_type.name(),
                "converting"
            );
            return converter.convert(self, source).map(Some);
        }

        if let Some(map) = mapper.registry.select_map(&source_type, &destination_type) {
            let declared = map.destination_type() == destination_type;
            let destination = declared
                .then(|| map.construct_destination())
                .flatten()
                .or_else(|| destination_type.construct())
                .ok_or_else(|| not_constructible(&destination_type))?;
            self.remember(source, &destination_type, &destination);
            self.guarded(source, &destination, |cx| map.execute(cx, source, &destination))?;
            return Ok(Some(destination));
        }

        if source_type.is_bean() && destination_type.is_bean() {
            let info = mapper.registry.info();
            for convention in &mapper.registry.conventions {
                let bindings = convention.resolve(&info, &source_type, &destination_type)?;
                if bindings.is_empty() {
                    continue;
                }
                let destination = destination_type
                    .construct()
                    .ok_or_else(|| not_constructible(&destination_type))?;
                self.remember(source, &destination_type, &destination);
                self.guarded(source, &destination, |cx| {
                    bindings
                        .iter()
                        .try_for_each(|binding| binding.execute(cx, source, &destination))
                })?;
                return Ok(Some(destination));
            }
        }
        Ok(None)
    }

    fn remember(&mut self, source: &Value, destination_type: &TypeInfo, destination: &Value) {
        if let Some(identity) = source.identity() {
            self.results
                .entry((identity, destination_type.id()))
                .or_insert_with(|| (source.clone(), destination.clone()));
        }
    }

    /// Run `action` unless the same object pair is already being mapped
    fn guarded(
        &mut self,
        source: &Value,
        destination: &Value,
        action: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<bool> {
        let key = match (source.identity(), destination.identity()) {
            (Some(source), Some(destination)) => Some((source, destination)),
            _ => None,
        };
        if let Some(key) = key {
            if !self.in_progress.insert(key) {
                trace!(
                    source = source.type_info().name(),
                    "pair already being mapped, skipping re-entry"
                );
                return Ok(true);
            }
        }
        let outcome = action(self);
        if let Some(key) = key {
            self.in_progress.remove(&key);
        }
        outcome.map(|()| true)
    }
}

fn typed<T: MapValue>(value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| Error::type_mismatch(T::type_info().name(), value.type_info().name()))
}

fn no_mapping(source: &TypeInfo, destination: &TypeInfo) -> Error {
    Error::NoMapping {
        from: source.name().to_string(),
        to: destination.name().to_string(),
    }
}

fn not_constructible(destination: &TypeInfo) -> Error {
    Error::NotConstructible {
        type_name: destination.name().to_string(),
    }
}
