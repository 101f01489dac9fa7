//! Resolved member-to-member bindings
//!
//! A [`Binding`] connects a path of readable source members to one writable
//! destination member. Conventions produce bindings; declarative maps and
//! map-any conventions execute them.

use tracing::trace;

use crate::accessor::Accessor;
use crate::error::{Error, Result};
use crate::mapper::MappingContext;
use crate::value::Value;

/// How the value read from the source path reaches the destination member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Stored as is (or widened)
    Direct,
    /// Passed through the converter registered for the pair
    Converted,
    /// Mapped recursively, reusing an existing destination value when there is one
    RecursiveMap,
}

#[derive(Debug, Clone)]
pub struct Binding {
    source_path: Vec<Accessor>,
    destination: Accessor,
    kind: BindingKind,
}

impl Binding {
    pub fn new(source_path: Vec<Accessor>, destination: Accessor, kind: BindingKind) -> Result<Self> {
        if source_path.is_empty() {
            return Err(Error::Configuration {
                message: format!("binding for '{}' has an empty source path", destination.name()),
            });
        }
        if !destination.is_writable() {
            return Err(Error::Configuration {
                message: format!("binding destination '{}' is not writable", destination.name()),
            });
        }
        Ok(Self {
            source_path,
            destination,
            kind,
        })
    }

    pub fn source_path(&self) -> &[Accessor] {
        &self.source_path
    }

    pub fn destination(&self) -> &Accessor {
        &self.destination
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Dotted source path followed by the destination member, for diagnostics
    pub fn describe(&self) -> String {
        let path: Vec<&str> = self.source_path.iter().map(Accessor::name).collect();
        format!("{} -> {}", path.join("."), self.destination.name())
    }

    pub fn execute(&self, cx: &mut MappingContext<'_>, source: &Value, destination: &Value) -> Result<()> {
        let mut current = source.clone();
        for accessor in &self.source_path {
            match accessor.get(&current)? {
                Some(next) => current = next,
                None => {
                    trace!(binding = %self.describe(), "null on source path, clearing destination");
                    return self.destination.set(destination, None);
                }
            }
        }

        let target_type = self.destination.value_type();
        let value = match self.kind {
            BindingKind::Direct => current,
            BindingKind::Converted => cx.map_value_to(&current, target_type)?,
            BindingKind::RecursiveMap => {
                if self.destination.is_readable() {
                    if let Some(existing) = self.destination.get(destination)? {
                        return cx.map_value_into(&current, &existing);
                    }
                    if let Some(known) = cx.known_result(&current, &target_type) {
                        return self.destination.set(destination, Some(known));
                    }
                }
                cx.map_value_to(&current, target_type)?
            }
        };
        self.destination.set(destination, Some(value))
    }
}
