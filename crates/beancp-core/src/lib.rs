//! Bean-cp Core - object graph mapping engine
//!
//! This crate copies data between structurally different object types.
//! Callers register rules on a [`MapperBuilder`] and then map values with
//! the resulting thread-safe [`Mapper`].
//!
//! # Main Components
//!
//! - **Type model**: [`Bean`], [`Accessor`] and [`MapValue`] describe mapped types at runtime
//! - **Converters**: whole-value transformations selected by exact destination type
//! - **Declarative maps**: ordered statement programs for one (source, destination) pair
//! - **Conventions**: name-based binding resolution with optional flattening
//! - **Dispatch**: rule selection by type-match priority, then registration order
//!
//! # Example
//!
//! ```
//! use beancp_core::{shared, Accessor, Bean, BindOptions, Mapper, Result, Shared};
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//! }
//!
//! impl Bean for Person {
//!     fn members() -> Vec<Accessor> {
//!         vec![Accessor::required("name", |p: &Person| p.name.clone(), |p: &mut Person, v| p.name = v)]
//!     }
//! }
//!
//! #[derive(Default)]
//! struct PersonDto {
//!     display_name: Option<String>,
//! }
//!
//! impl Bean for PersonDto {
//!     fn members() -> Vec<Accessor> {
//!         Vec::new()
//!     }
//!
//!     fn instantiate() -> Option<Self> {
//!         Some(Self::default())
//!     }
//! }
//!
//! fn example() -> Result<()> {
//!     let mapper = Mapper::builder()
//!         .add_map::<Person, PersonDto>(|map| {
//!             map.bind(
//!                 |p: &Person| Some(p.name.to_uppercase()),
//!                 |d: &mut PersonDto, v| d.display_name = v,
//!                 BindOptions::new(),
//!             )
//!         })?
//!         .build()?;
//!
//!     let dto: Shared<PersonDto> = mapper.map_to(&shared(Person { name: "ada".into() }))?;
//!     assert_eq!(dto.read().unwrap().display_name.as_deref(), Some("ADA"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod accessor;
pub mod bean;
pub mod binding;
pub mod convention;
pub mod converter;
pub mod declarative;
pub mod error;
pub mod mapper;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use accessor::{Accessor, MemberKind};
pub use bean::{Bean, ObjectView};
pub use binding::{Binding, BindingKind};
pub use convention::{MapConvention, MappingInfo, NameBasedMapConvention};
pub use converter::Converter;
pub use declarative::{BindOptions, DeclarativeMap, MapState, StatementKind};
pub use error::{Error, MemberSide, Result};
pub use mapper::{Mapper, MapperBuilder, MappingContext};
pub use types::{TypeInfo, TypeKind, Upcast};
pub use value::{shared, MapValue, Shared, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
