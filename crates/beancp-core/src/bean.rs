//! Bean trait and typed views over erased objects

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::accessor::Accessor;
use crate::error::Result;
use crate::types::Upcast;
use crate::value::{Shared, Value};

/// A structured object with named members.
///
/// Beans travel through the engine as [`Shared`] handles. `members` lists the
/// readable and writable members conventions may bind; `supertypes` lists
/// embedded parents so rules declared for a parent also apply to the child;
/// `instantiate` lets the engine create fresh destination instances.
///
/// ```
/// use beancp_core::{Accessor, Bean};
///
/// #[derive(Default)]
/// struct Customer {
///     full_name: Option<String>,
/// }
///
/// impl Bean for Customer {
///     fn members() -> Vec<Accessor> {
///         vec![Accessor::optional(
///             "full_name",
///             |c: &Customer| c.full_name.clone(),
///             |c: &mut Customer, v| c.full_name = v,
///         )]
///     }
///
///     fn instantiate() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
/// ```
pub trait Bean: Any + Send + Sync + Sized {
    fn members() -> Vec<Accessor>;

    fn supertypes() -> Vec<Upcast> {
        Vec::new()
    }

    fn instantiate() -> Option<Self> {
        None
    }
}

/// Typed handle over an erased bean handed to map callbacks.
///
/// Each `read`/`write` holds the object's lock only while the closure runs,
/// so callbacks may freely call back into the mapping context between them.
pub struct ObjectView<T> {
    value: Value,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> ObjectView<T> {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.value.read_as::<T, R>(f)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.value.write_as::<T, R>(f)
    }

    /// The underlying erased value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<T: Bean> ObjectView<T> {
    /// The shared handle, when the object is exactly `T` rather than a child of it
    pub fn shared(&self) -> Option<Shared<T>> {
        self.value.downcast_object::<T>()
    }
}

impl<T> fmt::Debug for ObjectView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectView").field(&self.value).finish()
    }
}
