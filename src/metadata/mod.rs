//! Reflection metadata and its decorated projections.
//!
//! # Key Components
//!
//! - [`token`] - Metadata tokens and universe-qualified entity identities
//! - [`decorations`] - Decoration kinds, values and usage policies
//! - [`reflection`] - Traits every reflectable entity implements
//! - [`typesystem`] - The native provider backing those traits
//! - [`table`] - Decorations keyed by member identity
//! - [`projection`] - Contexts merging a table into reflected entities
//!
//! # Examples
//!
//! ```rust
//! use decorscope::prelude::*;
//!
//! let universe = TypeUniverse::new();
//! let assembly = universe.define_assembly("Samples")?;
//! let int = universe.primitive(PrimitiveKind::Int32);
//!
//! let account = TypeBuilder::class("Account").namespace("Samples").build(&assembly)?;
//! let deposit = MethodBuilder::new("Deposit").param("amount", &int).build(&account)?;
//!
//! let range = DecorationKind::new("Validation.RangeAttribute");
//! let mut builder = MetadataTableBuilder::new();
//! builder.add_method_parameter_decorations(&deposit.rc(), 0, [Decoration::new(&range).arg(1_i32).arg(100_i32)])?;
//!
//! let context = ProjectionContext::new(builder.create_table());
//! let projected = context.map_method(&deposit.rc());
//! assert!(projected.parameters()[0].is_defined(&range, false));
//! # Ok::<(), decorscope::Error>(())
//! ```

pub mod decorations;
pub mod projection;
pub mod reflection;
pub mod table;
pub mod token;
pub mod typesystem;
