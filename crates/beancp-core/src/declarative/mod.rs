//! Declarative maps
//!
//! A [`DeclarativeMap`] is an ordered list of statements describing how one
//! source type is copied into one destination type: optional factory,
//! before/after callbacks, an optional convention and explicit bindings.
//! Ordering is validated as statements are recorded; the convention is
//! resolved when the owning mapper is built, after which the map is sealed.
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

mod builder;
mod execution;
mod types;


pub use types::{BindOptions, MapState, StatementKind};

use std::sync::{Arc, OnceLock};

use crate::binding::Binding;
use crate::convention::MappingInfo;
use crate::error::{Error, Result};
use crate::mapper::MappingContext;
use crate::types::TypeInfo;
use crate::value::Value;

use types::Statement;

/// Statement program for mapping `S` into `D`
pub struct DeclarativeMap<S, D> {
    statements: Vec<Statement<S, D>>,
    construct_using: Option<Arc<dyn Fn() -> D + Send + Sync>>,
    error: Option<Error>,
    sealed: OnceLock<Sealed>,
}

/// State fixed when the map leaves configuration
struct Sealed {
    convention_bindings: Vec<Binding>,
}

impl<S, D> DeclarativeMap<S, D> {
    pub(crate) fn new() -> Self {
        Self {
            statements: Vec::new(),
            construct_using: None,
            error: None,
            sealed: OnceLock::new(),
        }
    }

    pub fn state(&self) -> MapState {
        if self.sealed.get().is_some() {
            MapState::Execution
        } else {
            MapState::Configuration
        }
    }

    /// Kinds of the recorded statements, in order
    pub fn statement_kinds(&self) -> Vec<StatementKind> {
        self.statements.iter().map(Statement::kind).collect()
    }

    /// Surface the first configuration error recorded while statements were added
    pub(crate) fn finish(mut self) -> Result<Self> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Erased view of a declarative map held by the mapper
pub(crate) trait MapExecutor: Send + Sync {
    fn source_type(&self) -> TypeInfo;

    fn destination_type(&self) -> TypeInfo;

    /// Resolve the convention and switch to execution; fails if already sealed
    fn seal(&self, info: &dyn MappingInfo) -> Result<()>;

    fn state(&self) -> MapState;

    fn can_construct_destination(&self) -> bool;

    /// Fresh destination from the declared factory, if any
    fn construct_destination(&self) -> Option<Value>;

    fn execute(&self, cx: &mut MappingContext<'_>, source: &Value, destination: &Value) -> Result<()>;
}
