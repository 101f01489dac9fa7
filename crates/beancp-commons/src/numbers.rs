//! Primitive numeric conversions
//!
//! Every ordered pair of distinct types among `i8 i16 i32 i64 u8 u16 u32 u64
//! f32 f64` converts with `as` semantics: integers wrap, floats saturate and
//! NaN becomes zero.

use beancp_core::Converter;

macro_rules! numeric_converters {
    ($($source:ty),* $(,)?) => {{
        let mut converters = Vec::new();
        $(
            converters.extend(numeric_converters!(
                @from $source; i8, i16, i32, i64, u8, u16, u32, u64, f32, f64
            ));
        )*
        converters
    }};
    (@from $source:ty; $($destination:ty),*) => {
        [$(Converter::new::<$source, $destination>(|v: &$source| *v as $destination)),*]
    };
}

/// Converters for all 90 distinct numeric pairs
#[allow(clippy::unnecessary_cast)]
pub fn number_converters() -> Vec<Converter> {
    let all: Vec<Converter> = numeric_converters!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
    all.into_iter()
        .filter(|c| c.source_type() != c.destination_type())
        .collect()
}
