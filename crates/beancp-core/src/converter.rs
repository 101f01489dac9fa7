//! Whole-value converters

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mapper::MappingContext;
use crate::types::TypeInfo;
use crate::value::{MapValue, Value};

type ConvertFn = Arc<dyn Fn(&mut MappingContext<'_>, &Value) -> Result<Value> + Send + Sync>;

/// Transforms a whole source value into a new destination value.
///
/// Converters always produce a fresh value and are selected only for an
/// exact destination type.
#[derive(Clone)]
pub struct Converter {
    source: TypeInfo,
    destination: TypeInfo,
    convert: ConvertFn,
}

impl Converter {
    pub fn new<S, D>(convert: impl Fn(&S) -> D + Send + Sync + 'static) -> Self
    where
        S: MapValue,
        D: MapValue,
    {
        Self::from_fn::<S, D>(move |_, source| Ok(convert(source).into_value()))
    }

    /// Converter that needs the mapping context, typically to map elements or
    /// nested values through the same mapper
    pub fn with_mapper<S, D>(
        convert: impl Fn(&mut MappingContext<'_>, &S) -> anyhow::Result<D> + Send + Sync + 'static,
    ) -> Self
    where
        S: MapValue,
        D: MapValue,
    {
        Self::from_fn::<S, D>(move |cx, source| {
            convert(cx, source)
                .map(MapValue::into_value)
                .map_err(Error::from_callback)
        })
    }

    fn from_fn<S, D>(
        convert: impl Fn(&mut MappingContext<'_>, &S) -> Result<Value> + Send + Sync + 'static,
    ) -> Self
    where
        S: MapValue,
        D: MapValue,
    {
        Self {
            source: S::type_info(),
            destination: D::type_info(),
            convert: Arc::new(move |cx: &mut MappingContext<'_>, value: &Value| {
                let source = S::from_value(value).ok_or_else(|| {
                    Error::type_mismatch(S::type_info().name(), value.type_info().name())
                })?;
                convert(cx, &source)
            }),
        }
    }

    pub fn source_type(&self) -> TypeInfo {
        self.source
    }

    pub fn destination_type(&self) -> TypeInfo {
        self.destination
    }

    pub(crate) fn convert(&self, cx: &mut MappingContext<'_>, value: &Value) -> Result<Value> {
        (self.convert)(cx, value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({} -> {})", self.source.name(), self.destination.name())
    }
}
