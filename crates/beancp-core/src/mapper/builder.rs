//! Mapper builder
//!
//! Rules are registered in order; registration order breaks ties between
//! equally specific rules. Declarative maps are sealed and checked in
//! [`MapperBuilder::build`], so every configuration error surfaces before the
//! first mapping call.
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use std::sync::Arc;

use tracing::{debug, info};

use super::{Mapper, MappingContext, Registry};
use crate::bean::Bean;
use crate::convention::{ConventionExecutor, MapConvention};
use crate::converter::Converter;
use crate::declarative::DeclarativeMap;
use crate::error::{Error, Result};
use crate::types::TypeInfo;
use crate::value::MapValue;

#[derive(Default)]
pub struct MapperBuilder {
    registry: Registry,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter built from a plain function
    pub fn add_converter<S, D>(self, convert: impl Fn(&S) -> D + Send + Sync + 'static) -> Result<Self>
    where
        S: MapValue,
        D: MapValue,
    {
        self.add_converters([Converter::new::<S, D>(convert)])
    }

    /// Register a converter that maps nested values through the mapper
    pub fn add_converter_with_mapper<S, D>(
        self,
        convert: impl Fn(&mut MappingContext<'_>, &S) -> anyhow::Result<D> + Send + Sync + 'static,
    ) -> Result<Self>
    where
        S: MapValue,
        D: MapValue,
    {
        self.add_converters([Converter::with_mapper::<S, D>(convert)])
    }

    pub fn add_converters(mut self, converters: impl IntoIterator<Item = Converter>) -> Result<Self> {
        for converter in converters {
            self.ensure_no_map(&converter.source_type(), &converter.destination_type())?;
            debug!(
                source = converter.source_type().name(),
                destination = converter.destination_type().name(),
                "converter registered"
            );
            self.registry.converters.push(converter);
        }
        Ok(self)
    }

    /// Register a declarative map from `S` to `D`.
    ///
    /// Statement ordering errors are reported here; convention coverage and
    /// constructability are checked by [`build`](Self::build).
    pub fn add_map<S, D>(
        mut self,
        program: impl FnOnce(DeclarativeMap<S, D>) -> DeclarativeMap<S, D>,
    ) -> Result<Self>
    where
        S: Bean,
        D: Bean,
    {
        let source = TypeInfo::bean::<S>();
        let destination = TypeInfo::bean::<D>();
        self.ensure_no_map(&source, &destination)?;

        let map = program(DeclarativeMap::new()).finish()?;
        debug!(
            source = source.name(),
            destination = destination.name(),
            statements = ?map.statement_kinds(),
            "declarative map registered"
        );
        self.registry.maps.push(Box::new(map));
        Ok(self)
    }

    /// Register a convention consulted when no converter or map applies
    pub fn add_map_any_by_convention(mut self, convention: impl MapConvention + 'static) -> Self {
        self.registry
            .conventions
            .push(ConventionExecutor::new(Arc::new(convention)));
        self
    }

    /// Seal every declarative map and produce the immutable mapper
    pub fn build(self) -> Result<Mapper> {
        {
            let info = self.registry.info();
            for map in &self.registry.maps {
                map.seal(&info)?;
                if let Some(err) = info.take_failure() {
                    return Err(err);
                }
                if !map.can_construct_destination() {
                    return Err(Error::NotConstructible {
                        type_name: map.destination_type().name().to_string(),
                    });
                }
            }
        }

        info!(
            maps = self.registry.maps.len(),
            converters = self.registry.converters.len(),
            conventions = self.registry.conventions.len(),
            "mapper built"
        );
        Ok(Mapper {
            registry: self.registry,
        })
    }

    fn ensure_no_map(&self, source: &TypeInfo, destination: &TypeInfo) -> Result<()> {
        if self.registry.has_map(source, destination) {
            return Err(Error::Configuration {
                message: format!("mapping from {} to {} already defined", source, destination),
            });
        }
        Ok(())
    }
}
