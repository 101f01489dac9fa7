//! Type-erased values flowing through the mapping engine
//!
//! Leaves are carried as immutable shared payloads. Beans are carried as
//! [`Shared`] objects so that two references to the same instance stay the
//! same instance after mapping. Locks are taken only for the duration of a
//! single read or write closure.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::bean::Bean;
use crate::error::{Error, Result};
use crate::types::{project, project_mut, TypeInfo};

/// Shared, lockable bean instance
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap a bean into a [`Shared`] handle
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// A value that can be handed to the mapping engine.
///
/// Implemented for common leaf types, for standard collections of mapped
/// values and for `Shared<T>` of every [`Bean`].
pub trait MapValue: Clone + Send + Sync + 'static {
    fn type_info() -> TypeInfo;

    fn into_value(self) -> Value;

    /// Recover a typed value, applying lossless widening where supported
    fn from_value(value: &Value) -> Option<Self>;

    /// True when values of the type identified by `id` can be read as `Self`
    fn accepts(id: TypeId) -> bool {
        id == Self::type_info().id()
    }
}

/// Erased value: either an immutable leaf or a shared bean
#[derive(Clone)]
pub struct Value {
    info: TypeInfo,
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Leaf(Arc<dyn Any + Send + Sync>),
    Object(Arc<dyn ErasedObject>),
}

trait ErasedObject: Send + Sync {
    fn read_any(&self, f: &mut dyn FnMut(&dyn Any)) -> Result<()>;
    fn write_any(&self, f: &mut dyn FnMut(&mut dyn Any)) -> Result<()>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Bean> ErasedObject for RwLock<T> {
    fn read_any(&self, f: &mut dyn FnMut(&dyn Any)) -> Result<()> {
        let guard = self.read().map_err(|_| poisoned::<T>())?;
        f(&*guard);
        Ok(())
    }

    fn write_any(&self, f: &mut dyn FnMut(&mut dyn Any)) -> Result<()> {
        let mut guard = self.write().map_err(|_| poisoned::<T>())?;
        f(&mut *guard);
        Ok(())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn poisoned<T>() -> Error {
    Error::LockPoisoned {
        type_name: type_name::<T>().to_string(),
    }
}

impl Value {
    pub fn leaf<T: MapValue>(value: T) -> Self {
        Self {
            info: T::type_info(),
            repr: Repr::Leaf(Arc::new(value)),
        }
    }

    pub fn object<T: Bean>(object: Shared<T>) -> Self {
        Self {
            info: TypeInfo::bean::<T>(),
            repr: Repr::Object(object),
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn is_object(&self) -> bool {
        matches!(self.repr, Repr::Object(_))
    }

    /// Address of the shared object, `None` for leaves
    pub fn identity(&self) -> Option<usize> {
        match &self.repr {
            Repr::Object(object) => Some(Arc::as_ptr(object) as *const () as usize),
            Repr::Leaf(_) => None,
        }
    }

    /// True when both values are the same shared object
    pub fn same_object(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    pub fn downcast_leaf<T: Any>(&self) -> Option<&T> {
        match &self.repr {
            Repr::Leaf(data) => data.downcast_ref::<T>(),
            Repr::Object(_) => None,
        }
    }

    pub fn downcast_object<T: Bean>(&self) -> Option<Shared<T>> {
        match &self.repr {
            Repr::Object(object) => object.clone().into_any().downcast::<RwLock<T>>().ok(),
            Repr::Leaf(_) => None,
        }
    }

    /// Read the value as `T`, projecting through composed parents if needed
    pub fn read_as<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        match &self.repr {
            Repr::Leaf(data) => data
                .downcast_ref::<T>()
                .map(f)
                .ok_or_else(|| self.mismatch::<T>()),
            Repr::Object(object) => {
                let path = self
                    .info
                    .upcast_path(TypeId::of::<T>())
                    .ok_or_else(|| self.mismatch::<T>())?;
                let mut f = Some(f);
                let mut out = None;
                object.read_any(&mut |any: &dyn Any| {
                    let target = project(any, &path).and_then(|v| v.downcast_ref::<T>());
                    if let (Some(target), Some(f)) = (target, f.take()) {
                        out = Some(f(target));
                    }
                })?;
                out.ok_or_else(|| self.mismatch::<T>())
            }
        }
    }

    /// Mutate the bean as `T`. Leaves are immutable and always fail.
    pub fn write_as<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        match &self.repr {
            Repr::Leaf(_) => Err(Error::InvalidState {
                message: format!("cannot write into leaf value of type {}", self.info.name()),
            }),
            Repr::Object(object) => {
                let path = self
                    .info
                    .upcast_path(TypeId::of::<T>())
                    .ok_or_else(|| self.mismatch::<T>())?;
                let mut f = Some(f);
                let mut out = None;
                object.write_any(&mut |any: &mut dyn Any| {
                    let target = project_mut(any, &path).and_then(|v| v.downcast_mut::<T>());
                    if let (Some(target), Some(f)) = (target, f.take()) {
                        out = Some(f(target));
                    }
                })?;
                out.ok_or_else(|| self.mismatch::<T>())
            }
        }
    }

    fn mismatch<T>(&self) -> Error {
        Error::type_mismatch(type_name::<T>(), self.info.name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some(address) => write!(f, "Value({} @ {:#x})", self.info.name(), address),
            None => write!(f, "Value({})", self.info.name()),
        }
    }
}

impl<T: Bean> MapValue for Shared<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::bean::<T>()
    }

    fn into_value(self) -> Value {
        Value::object(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_object::<T>()
    }
}

macro_rules! plain_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MapValue for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::leaf::<Self>()
                }

                fn into_value(self) -> Value {
                    Value::leaf(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.downcast_leaf::<Self>().cloned()
                }
            }
        )*
    };
}

plain_leaf!(bool, char, String, DateTime<Utc>, NaiveDateTime, NaiveDate);

// Each numeric type also accepts the listed narrower types without loss.
macro_rules! numeric_leaf {
    ($($ty:ty => [$($narrow:ty),*]);* $(;)?) => {
        $(
            impl MapValue for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::leaf::<Self>()
                }

                fn into_value(self) -> Value {
                    Value::leaf(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    if let Some(v) = value.downcast_leaf::<Self>() {
                        return Some(*v);
                    }
                    $(
                        if let Some(v) = value.downcast_leaf::<$narrow>() {
                            return Some(<$ty>::from(*v));
                        }
                    )*
                    None
                }

                fn accepts(id: TypeId) -> bool {
                    id == TypeId::of::<Self>() $(|| id == TypeId::of::<$narrow>())*
                }
            }
        )*
    };
}

numeric_leaf! {
    i8 => [];
    i16 => [i8, u8];
    i32 => [i8, i16, u8, u16];
    i64 => [i8, i16, i32, u8, u16, u32];
    u8 => [];
    u16 => [u8];
    u32 => [u8, u16];
    u64 => [u8, u16, u32];
    f32 => [i8, i16, u8, u16];
    f64 => [f32, i8, i16, i32, u8, u16, u32];
}

macro_rules! collection_leaf {
    ($($container:ident where $($bound:path),*);* $(;)?) => {
        $(
            impl<T: MapValue $(+ $bound)*> MapValue for $container<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::leaf::<Self>()
                }

                fn into_value(self) -> Value {
                    Value::leaf(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.downcast_leaf::<Self>().cloned()
                }
            }
        )*
    };
}

collection_leaf! {
    Vec where ;
    VecDeque where ;
    HashSet where Eq, Hash;
    BTreeSet where Ord;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    impl Bean for Counter {
        fn members() -> Vec<Accessor> {
            vec![Accessor::required("hits", |c: &Counter| c.hits, |c: &mut Counter, v| c.hits = v)]
        }
    }

    #[test]
    fn test_leaf_widening() {
        let value = 7i32.into_value();
        assert_eq!(i64::from_value(&value), Some(7));
        assert_eq!(f64::from_value(&value), Some(7.0));
        assert_eq!(i16::from_value(&value), None);
        assert_eq!(String::from_value(&value), None);
    }

    #[test]
    fn test_object_identity_survives_erasure() {
        let counter = shared(Counter::default());
        let first = counter.clone().into_value();
        let second = Value::object(counter.clone());
        assert!(first.same_object(&second));
        assert!(!first.same_object(&shared(Counter::default()).into_value()));

        let recovered = Shared::<Counter>::from_value(&first).expect("same type");
        assert!(Arc::ptr_eq(&recovered, &counter));
    }

    #[test]
    fn test_read_and_write_through_value() {
        let value = shared(Counter::default()).into_value();
        value.write_as::<Counter, _>(|c| c.hits = 3).unwrap();
        assert_eq!(value.read_as::<Counter, _>(|c| c.hits).unwrap(), 3);
        assert!(matches!(
            value.read_as::<String, _>(|s| s.len()),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_leaves_are_immutable() {
        let value = "text".to_string().into_value();
        assert_eq!(value.read_as::<String, _>(|s| s.len()).unwrap(), 4);
        assert!(value.write_as::<String, _>(|s| s.clear()).is_err());
        assert_eq!(value.identity(), None);
    }
}
