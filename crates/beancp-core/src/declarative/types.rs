//! Statement and option types for declarative maps
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::sync::Arc;

use crate::bean::ObjectView;
use crate::convention::MapConvention;
use crate::error::Result;
use crate::mapper::MappingContext;
use crate::value::Value;

/// Kinds of statements a declarative map may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    ConstructDestinationUsing,
    BeforeMap,
    UseConvention,
    Bind,
    BindConstant,
    MapInner,
    AfterMap,
}

impl StatementKind {
    /// Statements must appear in non-decreasing phase order
    pub(crate) fn phase(self) -> u8 {
        match self {
            StatementKind::ConstructDestinationUsing => 0,
            StatementKind::BeforeMap => 1,
            StatementKind::UseConvention => 2,
            StatementKind::Bind | StatementKind::BindConstant | StatementKind::MapInner => 3,
            StatementKind::AfterMap => 4,
        }
    }

    pub(crate) fn is_unique(self) -> bool {
        matches!(
            self,
            StatementKind::ConstructDestinationUsing | StatementKind::UseConvention
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::ConstructDestinationUsing => "construct_destination_using",
            StatementKind::BeforeMap => "before_map",
            StatementKind::UseConvention => "use_convention",
            StatementKind::Bind => "bind",
            StatementKind::BindConstant => "bind_constant",
            StatementKind::MapInner => "map_inner",
            StatementKind::AfterMap => "after_map",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a declarative map.
///
/// Maps start in `Configuration` and move to `Execution` exactly once, when
/// the owning mapper is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Configuration,
    Execution,
}

/// Per-binding options
pub struct BindOptions<S, T> {
    pub(crate) when: Option<Arc<dyn Fn(&S) -> bool + Send + Sync>>,
    pub(crate) null_substitution: Option<T>,
}

impl<S, T> BindOptions<S, T> {
    pub fn new() -> Self {
        Self {
            when: None,
            null_substitution: None,
        }
    }

    /// Apply the binding only when the predicate holds for the source
    pub fn when(mut self, predicate: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(predicate));
        self
    }

    /// Value written instead of an absent source value
    pub fn null_substitution(mut self, value: T) -> Self {
        self.null_substitution = Some(value);
        self
    }
}

impl<S, T> Default for BindOptions<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) type Step = Arc<dyn Fn(&mut MappingContext<'_>, &Value, &Value) -> Result<()> + Send + Sync>;

pub(crate) type Callback<S, D> = Arc<
    dyn Fn(&mut MappingContext<'_>, &ObjectView<S>, &ObjectView<D>) -> anyhow::Result<()> + Send + Sync,
>;

pub(crate) enum Statement<S, D> {
    ConstructDestinationUsing,
    BeforeMap(Callback<S, D>),
    UseConvention(Arc<dyn MapConvention>),
    Bind(Step),
    BindConstant(Step),
    MapInner(Step),
    AfterMap(Callback<S, D>),
}

impl<S, D> Statement<S, D> {
    pub(crate) fn kind(&self) -> StatementKind {
        match self {
            Statement::ConstructDestinationUsing => StatementKind::ConstructDestinationUsing,
            Statement::BeforeMap(_) => StatementKind::BeforeMap,
            Statement::UseConvention(_) => StatementKind::UseConvention,
            Statement::Bind(_) => StatementKind::Bind,
            Statement::BindConstant(_) => StatementKind::BindConstant,
            Statement::MapInner(_) => StatementKind::MapInner,
            Statement::AfterMap(_) => StatementKind::AfterMap,
        }
    }
}
