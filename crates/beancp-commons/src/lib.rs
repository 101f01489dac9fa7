//! Bean-cp Commons - ready-made converters and mapper settings
//!
//! The converters here are ordinary [`beancp_core::Converter`] values with no
//! special standing; register them on a builder like any user converter.
//!
//! - [`numbers`]: conversions between every pair of primitive numeric types
//! - [`collections`]: element-wise conversions between standard collections
//! - [`datetime`]: `chrono` conversions to and from text and epoch millis
//! - [`settings`]: serde-loadable convention and converter settings

pub mod collections;
pub mod datetime;
pub mod error;
pub mod numbers;
pub mod settings;

pub use collections::{collection_converters, list_converters};
pub use datetime::datetime_converters;
pub use error::{Error, Result};
pub use numbers::number_converters;
pub use settings::{register_defaults, ConventionSettings, MapperSettings};
