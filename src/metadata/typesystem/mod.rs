//! Native type system: an arena-based introspection provider.
//!
//! The projection layer works against the [`crate::metadata::reflection`] traits. This module
//! supplies the native side of that boundary: a [`TypeUniverse`] that stores assemblies, types,
//! generic parameters, methods, fields, properties, events and parameters in append-only arenas,
//! and lightweight handles ([`NativeType`], [`NativeMethod`], ...) implementing the traits over
//! it.
//!
//! # Key Components
//!
//! - [`TypeUniverse`]: Central arena; every entity gets a [`Token`] and the universe a
//!   process-unique [`crate::metadata::token::UniverseId`]
//! - [`TypeBuilder`], [`MethodBuilder`], [`FieldBuilder`], [`PropertyBuilder`], [`EventBuilder`]:
//!   Fluent definition of entities with their native decorations
//! - [`TypeShape`]: Structural references, including generic instantiations
//! - [`PrimitiveKind`]: Built-in core library types
//!
//! # Native Decoration Semantics
//!
//! - Types walk their base types when inheritance is requested
//! - Methods walk their immediate override chain
//! - Fields, parameters and assemblies report their own decorations only
//! - Properties and events report their own decorations only, even when inheritance is requested
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
//! let counter = TypeBuilder::class("Counter").namespace("Samples").build(&assembly)?;
//! MethodBuilder::new("Increment")
//!     .virtual_method()
//!     .param("step", &int)
//!     .build(&counter)?;
//!
//! assert_eq!(counter.methods().len(), 1);
//! assert_eq!(assembly.get_type("Samples.Counter").map(|ty| ty.name().to_string()),
//!            Some("Counter".to_string()));
//! # Ok::<(), decorscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Arenas are `boxcar::Vec`s and the name index is a `DashMap`, so definitions may be appended
//! through a shared reference while handles are being read.

mod builder;
mod native;
mod shape;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use strum::{Display, EnumIter, IntoEnumIterator};

pub use builder::{EventBuilder, FieldBuilder, MethodBuilder, PropertyBuilder, TypeArg, TypeBuilder};
pub use native::{
    NativeAssembly, NativeEvent, NativeField, NativeMethod, NativeParameter, NativeProperty,
    NativeType,
};
pub use shape::TypeShape;

use crate::{
    metadata::{
        decorations::{Decoration, UsageResolver},
        reflection::{GenericPosition, MethodFlags, TypeFlavor},
        token::{EntityId, Token, UniverseId, TABLE},
    },
    Result,
};

/// Name of the built-in core library assembly
pub const CORE_LIBRARY: &str = "System.Private.CoreLib";

/// Types every universe defines in its core library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PrimitiveKind {
    /// `System.Object`
    Object,
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Int32`
    Int32,
    /// `System.Int64`
    Int64,
    /// `System.Double`
    Double,
    /// `System.String`
    String,
}

impl PrimitiveKind {
    fn flavor(self) -> TypeFlavor {
        match self {
            PrimitiveKind::Object | PrimitiveKind::String => TypeFlavor::Class,
            _ => TypeFlavor::Struct,
        }
    }
}

pub(crate) struct AssemblyEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) types: boxcar::Vec<usize>,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct TypeEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) assembly: usize,
    pub(crate) flavor: TypeFlavor,
    /// Set for formal generic parameters
    pub(crate) generic: Option<GenericPosition>,
    /// Enclosing type of nested types and type-level generic parameters
    pub(crate) enclosing: Option<usize>,
    /// Declaring method of method-level generic parameters
    pub(crate) owner_method: Option<usize>,
    pub(crate) base: OnceLock<TypeShape>,
    pub(crate) interfaces: boxcar::Vec<TypeShape>,
    pub(crate) generic_params: boxcar::Vec<usize>,
    pub(crate) constructors: boxcar::Vec<usize>,
    pub(crate) methods: boxcar::Vec<usize>,
    pub(crate) fields: boxcar::Vec<usize>,
    pub(crate) properties: boxcar::Vec<usize>,
    pub(crate) events: boxcar::Vec<usize>,
    pub(crate) nested: boxcar::Vec<usize>,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct ParamEntry {
    pub(crate) name: String,
    pub(crate) ty: TypeShape,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct MethodEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) owner: usize,
    pub(crate) flags: MethodFlags,
    pub(crate) is_constructor: bool,
    pub(crate) generic_params: boxcar::Vec<usize>,
    pub(crate) params: boxcar::Vec<ParamEntry>,
    pub(crate) return_type: OnceLock<TypeShape>,
    pub(crate) return_decorations: Vec<Decoration>,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct FieldEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) owner: usize,
    pub(crate) ty: TypeShape,
    pub(crate) is_static: bool,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct PropertyEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) owner: usize,
    pub(crate) ty: TypeShape,
    pub(crate) getter: Option<usize>,
    pub(crate) setter: Option<usize>,
    pub(crate) decorations: Vec<Decoration>,
}

pub(crate) struct EventEntry {
    pub(crate) token: Token,
    pub(crate) name: String,
    pub(crate) owner: usize,
    pub(crate) handler: TypeShape,
    pub(crate) add: Option<usize>,
    pub(crate) remove: Option<usize>,
    pub(crate) raise: Option<usize>,
    pub(crate) decorations: Vec<Decoration>,
}

/// Arena of native metadata definitions.
///
/// Created with [`TypeUniverse::new`], which also defines the core library
/// ([`CORE_LIBRARY`]) with the [`PrimitiveKind`] types. Entries are never removed; handles keep
/// the universe alive through an `Arc`.
pub struct TypeUniverse {
    id: UniverseId,
    assemblies: boxcar::Vec<AssemblyEntry>,
    types: boxcar::Vec<TypeEntry>,
    methods: boxcar::Vec<MethodEntry>,
    fields: boxcar::Vec<FieldEntry>,
    properties: boxcar::Vec<PropertyEntry>,
    events: boxcar::Vec<EventEntry>,
    by_fullname: DashMap<String, usize>,
    primitives: DashMap<PrimitiveKind, usize>,
    usage: UsageResolver,
}

impl TypeUniverse {
    /// Create a new universe containing the core library
    #[must_use]
    pub fn new() -> Arc<Self> {
        let universe = Arc::new(TypeUniverse {
            id: UniverseId::next(),
            assemblies: boxcar::Vec::new(),
            types: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            fields: boxcar::Vec::new(),
            properties: boxcar::Vec::new(),
            events: boxcar::Vec::new(),
            by_fullname: DashMap::new(),
            primitives: DashMap::new(),
            usage: UsageResolver::new(),
        });

        let corlib = universe.assemblies.push(AssemblyEntry {
            token: leading_row(TABLE::ASSEMBLY, 1),
            name: CORE_LIBRARY.to_string(),
            types: boxcar::Vec::new(),
            decorations: Vec::new(),
        });
        let mut object = None;
        for (row, kind) in (1_u8..).zip(PrimitiveKind::iter()) {
            let mut entry =
                TypeEntry::new(kind.to_string(), "System".to_string(), corlib, kind.flavor());
            entry.token = leading_row(TABLE::TYPE_DEF, row);
            let index = universe.types.push(entry);
            if let Some(object) = object {
                universe.types[index].base.set(TypeShape::Definition(object)).ok();
            } else {
                object = Some(index);
            }
            universe.register_top_level(corlib, index);
            universe.primitives.insert(kind, index);
        }

        tracing::debug!(universe = universe.id.value(), "created type universe");
        universe
    }

    /// The process-unique identifier of this universe
    #[must_use]
    pub fn id(&self) -> UniverseId {
        self.id
    }

    /// Usage resolver for native decoration queries
    #[must_use]
    pub fn usage(&self) -> &UsageResolver {
        &self.usage
    }

    /// Define a new assembly
    ///
    /// # Errors
    /// Returns [`crate::Error::TableFull`] if the assembly table has no row left.
    pub fn define_assembly(self: &Arc<Self>, name: &str) -> Result<NativeAssembly> {
        self.define_assembly_with(name, Vec::new())
    }

    /// Define a new assembly carrying native assembly-level decorations
    ///
    /// # Errors
    /// Returns [`crate::Error::TableFull`] if the assembly table has no row left.
    pub fn define_assembly_with(
        self: &Arc<Self>,
        name: &str,
        decorations: Vec<Decoration>,
    ) -> Result<NativeAssembly> {
        let index = self.push_assembly(name, decorations)?;
        Ok(NativeAssembly::new(self.clone(), index))
    }

    /// The core library assembly
    #[must_use]
    pub fn core_library(self: &Arc<Self>) -> NativeAssembly {
        NativeAssembly::new(self.clone(), 0)
    }

    /// A core library type
    #[must_use]
    pub fn primitive(self: &Arc<Self>, kind: PrimitiveKind) -> NativeType {
        NativeType::new(self.clone(), TypeShape::Definition(self.primitive_index(kind)))
    }

    /// Looks up a type definition by full name across all assemblies
    #[must_use]
    pub fn get_type(self: &Arc<Self>, full_name: &str) -> Option<NativeType> {
        self.by_fullname
            .get(full_name)
            .map(|index| NativeType::new(self.clone(), TypeShape::Definition(*index)))
    }

    /// Number of type entries, including generic parameters
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.count()
    }

    pub(crate) fn primitive_index(&self, kind: PrimitiveKind) -> usize {
        self.primitives.get(&kind).map_or(0, |index| *index)
    }

    /// Fails unless `additional` more type entries (definitions or generic parameters) fit
    pub(crate) fn check_type_rows(&self, additional: usize) -> Result<()> {
        let last = (self.types.count() + additional).saturating_sub(1);
        Token::from_index(TABLE::TYPE_DEF, last).map(|_| ())
    }

    pub(crate) fn entity_id(&self, token: Token) -> EntityId {
        EntityId::new(self.id, token)
    }

    pub(crate) fn contains_fullname(&self, full_name: &str) -> bool {
        self.by_fullname.contains_key(full_name)
    }

    pub(crate) fn assembly_entry(&self, index: usize) -> &AssemblyEntry {
        &self.assemblies[index]
    }

    pub(crate) fn type_entry(&self, index: usize) -> &TypeEntry {
        &self.types[index]
    }

    pub(crate) fn method_entry(&self, index: usize) -> &MethodEntry {
        &self.methods[index]
    }

    pub(crate) fn field_entry(&self, index: usize) -> &FieldEntry {
        &self.fields[index]
    }

    pub(crate) fn property_entry(&self, index: usize) -> &PropertyEntry {
        &self.properties[index]
    }

    pub(crate) fn event_entry(&self, index: usize) -> &EventEntry {
        &self.events[index]
    }

    /// `Namespace.Name`, with `Outer+Inner` for nested types
    pub(crate) fn definition_full_name(&self, index: usize) -> String {
        let entry = self.type_entry(index);
        match (entry.enclosing, entry.generic) {
            (_, Some(_)) => entry.name.clone(),
            (Some(outer), None) => format!("{}+{}", self.definition_full_name(outer), entry.name),
            (None, None) if entry.namespace.is_empty() => entry.name.clone(),
            (None, None) => format!("{}.{}", entry.namespace, entry.name),
        }
    }

    fn push_assembly(&self, name: &str, decorations: Vec<Decoration>) -> Result<usize> {
        let token = Token::from_index(TABLE::ASSEMBLY, self.assemblies.count())?;
        Ok(self.assemblies.push(AssemblyEntry {
            token,
            name: name.to_string(),
            types: boxcar::Vec::new(),
            decorations,
        }))
    }

    pub(crate) fn push_type(&self, mut entry: TypeEntry) -> Result<usize> {
        let table = if entry.generic.is_some() {
            TABLE::GENERIC_PARAM
        } else {
            TABLE::TYPE_DEF
        };
        entry.token = Token::from_index(table, self.types.count())?;
        Ok(self.types.push(entry))
    }

    pub(crate) fn register_top_level(&self, assembly: usize, index: usize) {
        self.assemblies[assembly].types.push(index);
        self.by_fullname
            .insert(self.definition_full_name(index), index);
    }

    pub(crate) fn register_nested(&self, outer: usize, index: usize) {
        self.types[outer].nested.push(index);
        self.by_fullname
            .insert(self.definition_full_name(index), index);
    }

    pub(crate) fn push_method(&self, mut entry: MethodEntry) -> Result<usize> {
        entry.token = Token::from_index(TABLE::METHOD_DEF, self.methods.count())?;
        let owner = entry.owner;
        let is_constructor = entry.is_constructor;
        let index = self.methods.push(entry);
        if is_constructor {
            self.types[owner].constructors.push(index);
        } else {
            self.types[owner].methods.push(index);
        }
        Ok(index)
    }

    pub(crate) fn push_field(&self, mut entry: FieldEntry) -> Result<usize> {
        entry.token = Token::from_index(TABLE::FIELD, self.fields.count())?;
        let owner = entry.owner;
        let index = self.fields.push(entry);
        self.types[owner].fields.push(index);
        Ok(index)
    }

    pub(crate) fn push_property(&self, mut entry: PropertyEntry) -> Result<usize> {
        entry.token = Token::from_index(TABLE::PROPERTY, self.properties.count())?;
        let owner = entry.owner;
        let index = self.properties.push(entry);
        self.types[owner].properties.push(index);
        Ok(index)
    }

    pub(crate) fn push_event(&self, mut entry: EventEntry) -> Result<usize> {
        entry.token = Token::from_index(TABLE::EVENT, self.events.count())?;
        let owner = entry.owner;
        let index = self.events.push(entry);
        self.types[owner].events.push(index);
        Ok(index)
    }
}

/// Token of one of the first rows of a fresh table
fn leading_row(table: u8, row: u8) -> Token {
    Token::new((u32::from(table) << 24) | u32::from(row))
}

impl TypeEntry {
    pub(crate) fn new(name: String, namespace: String, assembly: usize, flavor: TypeFlavor) -> Self {
        TypeEntry {
            token: Token::new(0),
            name,
            namespace,
            assembly,
            flavor,
            generic: None,
            enclosing: None,
            owner_method: None,
            base: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            generic_params: boxcar::Vec::new(),
            constructors: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            fields: boxcar::Vec::new(),
            properties: boxcar::Vec::new(),
            events: boxcar::Vec::new(),
            nested: boxcar::Vec::new(),
            decorations: Vec::new(),
        }
    }
}
