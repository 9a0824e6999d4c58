// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # decorscope
//!
//! Decorate .NET-style reflection metadata without touching the metadata itself.
//!
//! `decorscope` models an introspectable type system (assemblies, types, methods, constructors,
//! fields, properties, events and parameters) together with the declarative decorations
//! ("custom attributes") attached to them. On top of that it provides a **metadata table**, an
//! immutable map from member identity to extra decorations, and a **projection context** that
//! re-exposes any entity with the table's decorations merged into its own.
//!
//! ## Features
//!
//! - **Native type system** - Arena-backed universes with generics, nested types, overrides and
//!   interface maps, built through fluent builders
//! - **Metadata tables** - Copy-on-write snapshots keyed by signature, shared by every generic
//!   instantiation of one definition
//! - **Projections** - Forwarding wrappers merging table and native decorations in a fixed order,
//!   honoring usage policies (multiplicity, inheritance)
//! - **Composition** - Contexts chain; each layer adds its own table
//!
//! ## Quick Start
//!
//! ```rust
//! use decorscope::prelude::*;
//!
//! let universe = TypeUniverse::new();
//! let assembly = universe.define_assembly("Shop")?;
//! let string = universe.primitive(PrimitiveKind::String);
//!
//! let customer = TypeBuilder::class("Customer").namespace("Shop").build(&assembly)?;
//! PropertyBuilder::new("Name", &string)
//!     .accessors(MethodFlags::empty())
//!     .build(&customer)?;
//!
//! let display = DecorationKind::new("UI.DisplayAttribute");
//! let mut builder = MetadataTableBuilder::new();
//! builder.add_property_decorations(&customer, "Name", [Decoration::new(&display).arg("Full name")])?;
//!
//! let context = ProjectionContext::new(builder.create_table());
//! let projected = context.map_type(&customer.rc());
//! let name = find_property(projected.as_ref(), "Name")?;
//!
//! assert!(name.is_defined(&display, false));
//! assert_eq!(projected.full_name(), "Shop.Customer");
//! # Ok::<(), decorscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::decorations`] - Decoration kinds, instances and usage policies
//! - [`metadata::reflection`] - The trait surface shared by native and projected entities
//! - [`metadata::typesystem`] - The native provider: universes, builders, arena-backed entities
//! - [`metadata::table`] - Member keys, table entries, builder and snapshots
//! - [`metadata::projection`] - Contexts and forwarding wrappers
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for snapshots and contexts, `trace` for type
//! definitions and suppressed decorations, `warn` for decorations whose usage targets do not
//! match where they were attached. Install any subscriber to see them.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`]. See [`Error`] for the categories.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use decorscope::prelude::*;
///
/// let universe = TypeUniverse::new();
/// let context = ProjectionContext::new(MetadataTable::empty());
/// let object = context.map_type(&universe.primitive(PrimitiveKind::Object).rc());
/// assert_eq!(object.full_name(), "System.Object");
/// ```
pub mod prelude;

/// Type system, decorations, metadata tables and projections
///
/// # Key Components
///
/// ## Building Metadata
/// - [`metadata::typesystem::TypeUniverse`] - Owner of all native definitions
/// - [`metadata::typesystem::TypeBuilder`] and siblings - Fluent definition builders
///
/// ## Decorating
/// - [`metadata::decorations::DecorationKind`] / [`metadata::decorations::Decoration`]
/// - [`metadata::table::MetadataTableBuilder`] - Collects table decorations
///
/// ## Projecting
/// - [`metadata::projection::ProjectionContext`] - Maps entities into the decorated view
pub mod metadata;

/// `decorscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `decorscope` Error type
///
/// # Examples
///
/// ```rust
/// use decorscope::{prelude::*, Error};
///
/// let universe = TypeUniverse::new();
/// let assembly = universe.define_assembly("Shop")?;
///
/// let mut builder = MetadataTableBuilder::new();
/// let kind = DecorationKind::new("Shop.NoteAttribute");
/// let result = builder.add_decorations(&Entity::Assembly(assembly.rc()), [Decoration::new(&kind)]);
/// assert!(matches!(result, Err(Error::NotSupported(_))));
/// # Ok::<(), decorscope::Error>(())
/// ```
pub use error::Error;
