//! Statement-recording DSL for declarative maps
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use std::sync::Arc;

use tracing::warn;

use super::types::{BindOptions, Callback, Statement, StatementKind, Step};
use super::DeclarativeMap;
use crate::bean::{Bean, ObjectView};
use crate::convention::MapConvention;
use crate::error::{Error, Result};
use crate::mapper::MappingContext;
use crate::value::{MapValue, Value};

type ExistingGetter<D, DI> = Arc<dyn Fn(&D) -> Option<DI> + Send + Sync>;

impl<S: Bean, D: Bean> DeclarativeMap<S, D> {
    /// Create destination instances with `factory` instead of `D::instantiate`.
    ///
    /// Must be the first statement.
    pub fn construct_destination_using(self, factory: impl Fn() -> D + Send + Sync + 'static) -> Self {
        let mut map = self.record(Statement::ConstructDestinationUsing);
        if map.error.is_none() {
            map.construct_using = Some(Arc::new(factory));
        }
        map
    }

    pub fn before_map<F>(self, callback: F) -> Self
    where
        F: Fn(&mut MappingContext<'_>, &ObjectView<S>, &ObjectView<D>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        let callback: Callback<S, D> = Arc::new(callback);
        self.record(Statement::BeforeMap(callback))
    }

    /// Resolve the remaining members through `convention` when the mapper is built
    pub fn use_convention(self, convention: impl MapConvention + 'static) -> Self {
        self.record(Statement::UseConvention(Arc::new(convention)))
    }

    /// Copy the value produced by `from` into the destination through `to`
    pub fn bind<T>(
        self,
        from: impl Fn(&S) -> Option<T> + Send + Sync + 'static,
        to: impl Fn(&mut D, Option<T>) + Send + Sync + 'static,
        options: BindOptions<S, T>,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let BindOptions {
            when,
            null_substitution,
        } = options;
        let step: Step = Arc::new(
            move |_cx: &mut MappingContext<'_>, source: &Value, destination: &Value| -> Result<()> {
                let read = source.read_as::<S, _>(|s| {
                    let applies = when.as_ref().map_or(true, |when| when(s));
                    applies.then(|| from(s))
                })?;
                let Some(value) = read else {
                    return Ok(());
                };
                let value = value.or_else(|| null_substitution.clone());
                destination.write_as::<D, _>(|d| to(d, value))
            },
        );
        self.record(Statement::Bind(step))
    }

    /// Write a constant into the destination through `to`.
    ///
    /// Null substitution makes no sense for a constant and is rejected.
    pub fn bind_constant<T>(
        self,
        value: impl Into<Option<T>>,
        to: impl Fn(&mut D, Option<T>) + Send + Sync + 'static,
        options: BindOptions<S, T>,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        if options.null_substitution.is_some() {
            return self.fail(Error::Configuration {
                message: "null substitution is not allowed for bind_constant".to_string(),
            });
        }
        let value = value.into();
        let when = options.when;
        let step: Step = Arc::new(
            move |_cx: &mut MappingContext<'_>, source: &Value, destination: &Value| -> Result<()> {
                if let Some(when) = &when {
                    if !source.read_as::<S, _>(|s| when(s))? {
                        return Ok(());
                    }
                }
                destination.write_as::<D, _>(|d| to(d, value.clone()))
            },
        );
        self.record(Statement::BindConstant(step))
    }

    /// Map a nested value into a freshly created `DI` and store it through `to`
    pub fn map_inner<SI, DI>(
        self,
        from: impl Fn(&S) -> Option<SI> + Send + Sync + 'static,
        to: impl Fn(&mut D, Option<DI>) + Send + Sync + 'static,
        options: BindOptions<S, DI>,
    ) -> Self
    where
        SI: MapValue,
        DI: MapValue,
    {
        self.inner(from, to, None, options)
    }

    /// Like [`map_inner`](Self::map_inner), but map into the value returned
    /// by `existing` when the destination already holds one
    pub fn map_inner_reusing<SI, DI>(
        self,
        from: impl Fn(&S) -> Option<SI> + Send + Sync + 'static,
        to: impl Fn(&mut D, Option<DI>) + Send + Sync + 'static,
        existing: impl Fn(&D) -> Option<DI> + Send + Sync + 'static,
        options: BindOptions<S, DI>,
    ) -> Self
    where
        SI: MapValue,
        DI: MapValue,
    {
        self.inner(from, to, Some(Arc::new(existing)), options)
    }

    pub fn after_map<F>(self, callback: F) -> Self
    where
        F: Fn(&mut MappingContext<'_>, &ObjectView<S>, &ObjectView<D>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        let callback: Callback<S, D> = Arc::new(callback);
        self.record(Statement::AfterMap(callback))
    }

    fn inner<SI, DI>(
        self,
        from: impl Fn(&S) -> Option<SI> + Send + Sync + 'static,
        to: impl Fn(&mut D, Option<DI>) + Send + Sync + 'static,
        existing: Option<ExistingGetter<D, DI>>,
        options: BindOptions<S, DI>,
    ) -> Self
    where
        SI: MapValue,
        DI: MapValue,
    {
        let BindOptions {
            when,
            null_substitution,
        } = options;
        let step: Step = Arc::new(
            move |cx: &mut MappingContext<'_>, source: &Value, destination: &Value| -> Result<()> {
                let read = source.read_as::<S, _>(|s| {
                    let applies = when.as_ref().map_or(true, |when| when(s));
                    applies.then(|| from(s))
                })?;
                let Some(inner) = read else {
                    return Ok(());
                };
                let Some(inner) = inner else {
                    let substitute = null_substitution.clone();
                    return destination.write_as::<D, _>(|d| to(d, substitute));
                };

                let inner = inner.into_value();
                let target = DI::type_info();
                if let Some(existing) = &existing {
                    let current = destination.read_as::<D, _>(|d| existing(d))?;
                    if let Some(current) = current {
                        return cx.map_value_into(&inner, &current.into_value());
                    }
                    if let Some(known) = cx.known_result(&inner, &target) {
                        let known = typed::<DI>(&known)?;
                        return destination.write_as::<D, _>(|d| to(d, Some(known)));
                    }
                }
                let mapped = typed::<DI>(&cx.map_value_to(&inner, target)?)?;
                destination.write_as::<D, _>(|d| to(d, Some(mapped)))
            },
        );
        self.record(Statement::MapInner(step))
    }

    fn record(mut self, statement: Statement<S, D>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.check_order(statement.kind()) {
            Ok(()) => self.statements.push(statement),
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn fail(mut self, err: Error) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    fn check_order(&self, kind: StatementKind) -> Result<()> {
        if kind.is_unique() && self.statements.iter().any(|s| s.kind() == kind) {
            warn!(statement = %kind, "statement declared twice");
            return Err(Error::DuplicateStatement {
                statement: kind.as_str(),
            });
        }
        if let Some(previous) = self.statements.last().map(Statement::kind) {
            if previous.phase() > kind.phase() {
                warn!(statement = %kind, previous = %previous, "statement out of order");
                return Err(Error::InvalidStatementOrder {
                    statement: kind.as_str(),
                    previous: previous.as_str(),
                });
            }
        }
        Ok(())
    }
}

fn typed<T: MapValue>(value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| Error::type_mismatch(T::type_info().name(), value.type_info().name()))
}
