//! Sealing and executing declarative maps
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use tracing::{debug, trace, warn};

use super::types::{Callback, MapState, Statement};
use super::{DeclarativeMap, MapExecutor, Sealed};
use crate::bean::{Bean, ObjectView};
use crate::convention::MappingInfo;
use crate::error::{Error, Result};
use crate::mapper::MappingContext;
use crate::types::TypeInfo;
use crate::value::{shared, Value};

impl<S: Bean, D: Bean> DeclarativeMap<S, D> {
    fn invoke(
        &self,
        callback: &Callback<S, D>,
        cx: &mut MappingContext<'_>,
        source: &Value,
        destination: &Value,
    ) -> Result<()> {
        let source = ObjectView::new(source.clone());
        let destination = ObjectView::new(destination.clone());
        callback(cx, &source, &destination).map_err(Error::from_callback)
    }
}

impl<S: Bean, D: Bean> MapExecutor for DeclarativeMap<S, D> {
    fn source_type(&self) -> TypeInfo {
        TypeInfo::bean::<S>()
    }

    fn destination_type(&self) -> TypeInfo {
        TypeInfo::bean::<D>()
    }

    fn seal(&self, info: &dyn MappingInfo) -> Result<()> {
        if self.sealed.get().is_some() {
            return Err(Error::InvalidState {
                message: format!(
                    "map from {} to {} is already in execution state",
                    self.source_type(),
                    self.destination_type()
                ),
            });
        }

        let mut convention_bindings = Vec::new();
        for statement in &self.statements {
            if let Statement::UseConvention(convention) = statement {
                convention_bindings =
                    convention.bindings(info, &self.source_type(), &self.destination_type())?;
                if convention_bindings.is_empty() {
                    warn!(
                        source = self.source_type().name(),
                        destination = self.destination_type().name(),
                        "convention produced no bindings"
                    );
                }
            }
        }

        debug!(
            source = self.source_type().name(),
            destination = self.destination_type().name(),
            statements = self.statements.len(),
            convention_bindings = convention_bindings.len(),
            "declarative map sealed"
        );
        self.sealed
            .set(Sealed {
                convention_bindings,
            })
            .map_err(|_| Error::InvalidState {
                message: format!(
                    "map from {} to {} was sealed concurrently",
                    self.source_type(),
                    self.destination_type()
                ),
            })
    }

    fn state(&self) -> MapState {
        DeclarativeMap::state(self)
    }

    fn can_construct_destination(&self) -> bool {
        self.construct_using.is_some() || self.destination_type().is_constructible()
    }

    fn construct_destination(&self) -> Option<Value> {
        self.construct_using
            .as_ref()
            .map(|factory| Value::object(shared(factory())))
    }

    fn execute(&self, cx: &mut MappingContext<'_>, source: &Value, destination: &Value) -> Result<()> {
        let sealed = self.sealed.get().ok_or_else(|| Error::InvalidState {
            message: format!(
                "map from {} to {} is still in configuration state",
                self.source_type(),
                self.destination_type()
            ),
        })?;

        trace!(
            source = self.source_type().name(),
            destination = self.destination_type().name(),
            "executing declarative map"
        );
        for statement in &self.statements {
            match statement {
                Statement::ConstructDestinationUsing => {}
                Statement::BeforeMap(callback) | Statement::AfterMap(callback) => {
                    self.invoke(callback, cx, source, destination)?
                }
                Statement::UseConvention(_) => {
                    for binding in &sealed.convention_bindings {
                        binding.execute(cx, source, destination)?;
                    }
                }
                Statement::Bind(step) | Statement::BindConstant(step) | Statement::MapInner(step) => {
                    step(cx, source, destination)?
                }
            }
        }
        Ok(())
    }
}
