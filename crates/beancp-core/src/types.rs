//! Runtime type descriptors
//!
//! Every type that takes part in mapping is described by a [`TypeInfo`]: its
//! identity, whether it is a leaf value or a bean, how to enumerate its
//! members, which composed parents it can be viewed as, and how to create a
//! fresh instance. Descriptors are plain `Copy` values built from function
//! pointers so they can be compared and stored without allocation.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::accessor::Accessor;
use crate::bean::Bean;
use crate::value::{shared, MapValue, Value};

/// Broad classification of a mapped type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Opaque value copied or converted as a whole (numbers, strings, collections)
    Leaf,
    /// Shared object with named members
    Bean,
}

/// Runtime descriptor of a mapped type
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    members: fn() -> Vec<Accessor>,
    supertypes: fn() -> Vec<Upcast>,
    construct: fn() -> Option<Value>,
    accepts: fn(TypeId) -> bool,
}

impl TypeInfo {
    /// Descriptor of a leaf value type
    pub fn leaf<T: MapValue>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: TypeKind::Leaf,
            members: Vec::new,
            supertypes: Vec::new,
            construct: no_instance,
            accepts: T::accepts,
        }
    }

    /// Descriptor of a bean type
    pub fn bean<T: Bean>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: TypeKind::Bean,
            members: T::members,
            supertypes: T::supertypes,
            construct: instantiate::<T>,
            accepts: exact::<T>,
        }
    }

    /// Descriptor of any [`MapValue`] type
    pub fn of<T: MapValue>() -> Self {
        T::type_info()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_bean(&self) -> bool {
        self.kind == TypeKind::Bean
    }

    /// Members declared by this type, in declaration order
    pub fn members(&self) -> Vec<Accessor> {
        (self.members)()
    }

    /// Direct composed parents
    pub fn supertypes(&self) -> Vec<Upcast> {
        (self.supertypes)()
    }

    /// Create a fresh instance, if the type supports it
    pub fn construct(&self) -> Option<Value> {
        (self.construct)()
    }

    pub fn is_constructible(&self) -> bool {
        self.construct().is_some()
    }

    /// True when a value of `other` may be stored where `self` is expected.
    ///
    /// Beans accept only themselves; numeric leaves also accept their
    /// lossless narrower counterparts.
    pub fn is_assignable_from(&self, other: &TypeInfo) -> bool {
        (self.accepts)(other.id)
    }

    /// True when `self` is `base` or can be projected onto it
    pub fn is_subtype_of(&self, base: &TypeInfo) -> bool {
        self.upcast_path(base.id).is_some()
    }

    /// Chain of projections leading from this type to `target`.
    ///
    /// Returns an empty chain for the type itself and `None` when `target`
    /// is not reachable.
    pub fn upcast_path(&self, target: TypeId) -> Option<Vec<Upcast>> {
        if self.id == target {
            return Some(Vec::new());
        }
        for upcast in self.supertypes() {
            if let Some(mut rest) = upcast.target.upcast_path(target) {
                rest.insert(0, upcast);
                return Some(rest);
            }
        }
        None
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn no_instance() -> Option<Value> {
    None
}

fn instantiate<T: Bean>() -> Option<Value> {
    T::instantiate().map(|bean| Value::object(shared(bean)))
}

fn exact<T: 'static>(id: TypeId) -> bool {
    id == TypeId::of::<T>()
}

/// Projection from a bean onto a composed parent bean.
///
/// Rust has no inheritance; a type that embeds its "base" declares the
/// embedding through [`Bean::supertypes`] and mapping rules written for the
/// base then apply to it.
#[derive(Clone)]
pub struct Upcast {
    target: TypeInfo,
    view: Arc<dyn View>,
}

impl Upcast {
    pub fn of<S: Bean, B: Bean>(view: fn(&S) -> &B, view_mut: fn(&mut S) -> &mut B) -> Self {
        Self {
            target: TypeInfo::bean::<B>(),
            view: Arc::new(FieldView { view, view_mut }),
        }
    }

    /// Parent type this projection yields
    pub fn target(&self) -> TypeInfo {
        self.target
    }

    pub(crate) fn project<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        self.view.view(value)
    }

    pub(crate) fn project_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.view.view_mut(value)
    }
}

impl fmt::Debug for Upcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upcast({})", self.target.name)
    }
}

trait View: Send + Sync {
    fn view<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any>;
    fn view_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

struct FieldView<S, B> {
    view: fn(&S) -> &B,
    view_mut: fn(&mut S) -> &mut B,
}

impl<S: Bean, B: Bean> View for FieldView<S, B> {
    fn view<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = value.downcast_ref::<S>()?;
        Some((self.view)(owner) as &dyn Any)
    }

    fn view_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let owner = value.downcast_mut::<S>()?;
        Some((self.view_mut)(owner) as &mut dyn Any)
    }
}

/// Apply a projection chain to a borrowed bean
pub(crate) fn project<'a>(value: &'a dyn Any, path: &[Upcast]) -> Option<&'a dyn Any> {
    let mut current = value;
    for step in path {
        current = step.project(current)?;
    }
    Some(current)
}

/// Apply a projection chain to a mutably borrowed bean
pub(crate) fn project_mut<'a>(value: &'a mut dyn Any, path: &[Upcast]) -> Option<&'a mut dyn Any> {
    let mut current = value;
    for step in path {
        current = step.project_mut(current)?;
    }
    Some(current)
}
