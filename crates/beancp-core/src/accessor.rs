//! Named member accessors
//!
//! An [`Accessor`] is the erased pair of getter and setter for one member of
//! a bean. Either half may be missing: read-only members can still serve as
//! a binding source and write-only members as a destination.

use std::fmt;
use std::sync::Arc;

use crate::bean::Bean;
use crate::error::{Error, Result};
use crate::types::TypeInfo;
use crate::value::{MapValue, Value};

/// How a member is exposed by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Plain data slot
    Field,
    /// Getter/setter pair
    Property,
}

impl MemberKind {
    pub fn other(self) -> Self {
        match self {
            MemberKind::Field => MemberKind::Property,
            MemberKind::Property => MemberKind::Field,
        }
    }
}

type Getter = Arc<dyn Fn(&Value) -> Result<Option<Value>> + Send + Sync>;
type Setter = Arc<dyn Fn(&Value, Option<Value>) -> Result<()> + Send + Sync>;

/// Erased getter/setter pair for one named member
#[derive(Clone)]
pub struct Accessor {
    name: String,
    kind: MemberKind,
    owner: TypeInfo,
    value_type: TypeInfo,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Accessor {
    /// Member whose absence is represented by `None`
    pub fn optional<S, V>(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<V> + Send + Sync + 'static,
        set: impl Fn(&mut S, Option<V>) + Send + Sync + 'static,
    ) -> Self
    where
        S: Bean,
        V: MapValue,
    {
        Self::new::<S, V>(name, Some(erase_getter(get)), Some(erase_setter(set)))
    }

    /// Member that always holds a value; an absent value resets it to `V::default()`
    pub fn required<S, V>(
        name: impl Into<String>,
        get: impl Fn(&S) -> V + Send + Sync + 'static,
        set: impl Fn(&mut S, V) + Send + Sync + 'static,
    ) -> Self
    where
        S: Bean,
        V: MapValue + Default,
    {
        Self::new::<S, V>(
            name,
            Some(erase_getter(move |s: &S| Some(get(s)))),
            Some(erase_setter(move |s: &mut S, v: Option<V>| {
                set(s, v.unwrap_or_default())
            })),
        )
    }

    pub fn read_only<S, V>(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<V> + Send + Sync + 'static,
    ) -> Self
    where
        S: Bean,
        V: MapValue,
    {
        Self::new::<S, V>(name, Some(erase_getter(get)), None)
    }

    pub fn write_only<S, V>(
        name: impl Into<String>,
        set: impl Fn(&mut S, Option<V>) + Send + Sync + 'static,
    ) -> Self
    where
        S: Bean,
        V: MapValue,
    {
        Self::new::<S, V>(name, None, Some(erase_setter(set)))
    }

    fn new<S: Bean, V: MapValue>(
        name: impl Into<String>,
        getter: Option<Getter>,
        setter: Option<Setter>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            owner: TypeInfo::bean::<S>(),
            value_type: V::type_info(),
            getter,
            setter,
        }
    }

    /// Mark the member as a plain field rather than a property
    pub fn as_field(mut self) -> Self {
        self.kind = MemberKind::Field;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Type declaring the member
    pub fn owner(&self) -> TypeInfo {
        self.owner
    }

    /// Declared type of the member's value
    pub fn value_type(&self) -> TypeInfo {
        self.value_type
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// True when both accessors denote the same member of the same type
    pub fn same_member(&self, other: &Accessor) -> bool {
        self.owner == other.owner && self.kind == other.kind && self.name == other.name
    }

    pub fn get(&self, object: &Value) -> Result<Option<Value>> {
        let getter = self.getter.as_ref().ok_or_else(|| self.access_error("not readable"))?;
        getter(object)
    }

    pub fn set(&self, object: &Value, value: Option<Value>) -> Result<()> {
        let setter = self.setter.as_ref().ok_or_else(|| self.access_error("not writable"))?;
        setter(object, value)
    }

    fn access_error(&self, message: &str) -> Error {
        Error::MemberAccess {
            member: format!("{}.{}", self.owner.name(), self.name),
            message: message.to_string(),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("owner", &self.owner.name())
            .field("value_type", &self.value_type.name())
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

fn erase_getter<S, V>(get: impl Fn(&S) -> Option<V> + Send + Sync + 'static) -> Getter
where
    S: Bean,
    V: MapValue,
{
    Arc::new(move |object: &Value| object.read_as::<S, _>(|s| get(s).map(MapValue::into_value)))
}

fn erase_setter<S, V>(set: impl Fn(&mut S, Option<V>) + Send + Sync + 'static) -> Setter
where
    S: Bean,
    V: MapValue,
{
    Arc::new(move |object: &Value, value: Option<Value>| {
        let typed = value
            .map(|v| {
                V::from_value(&v).ok_or_else(|| {
                    Error::type_mismatch(V::type_info().name(), v.type_info().name())
                })
            })
            .transpose()?;
        object.write_as::<S, _>(|s| set(s, typed))
    })
}
