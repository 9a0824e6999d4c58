//! Projection contexts: re-exposing entities with table decorations merged in.
//!
//! A [`ProjectionContext`] pairs an immutable [`MetadataTable`] with [`ProjectionOptions`] and a
//! process-unique [`ContextId`]. Mapping an entity through the context wraps it in a
//! [`Projected`] forwarding wrapper, which answers every non-decoration query by delegating to the
//! wrapped entity and routing every entity it returns back through the same context. Decoration
//! queries merge, in order:
//!
//! 1. decorations the table holds for the entity,
//! 2. the wrapped entity's own decorations (queried without inheritance), skipping single-use
//!    kinds already present,
//! 3. with inheritance requested, the same view of each ancestor (base types for types, the
//!    override chain for methods, and for properties and events only when the matching option is
//!    set), keeping inheritable kinds not yet present unless they allow multiple instances.
//!
//! # Identity and Composition
//!
//! Wrappers know the context that produced them. Mapping an entity the same context already
//! produced returns it unchanged, so repeated mapping never stacks wrappers. An entity produced
//! by a *different* context is wrapped again; its "own" decorations then already include the
//! first context's table, so chained contexts see the union of both tables.
//!
//! # Examples
//!
//! ```rust
//! use decorscope::prelude::*;
//!
//! let universe = TypeUniverse::new();
//! let assembly = universe.define_assembly("Samples")?;
//! let order = TypeBuilder::class("Order").namespace("Samples").build(&assembly)?;
//!
//! let audited = DecorationKind::new("Samples.AuditedAttribute");
//! let mut builder = MetadataTableBuilder::new();
//! builder.add_type_decorations(&order, [Decoration::new(&audited)])?;
//!
//! let context = ProjectionContext::new(builder.create_table());
//! let projected = context.map_type(&order.rc());
//!
//! assert!(!order.is_defined(&audited, false));
//! assert!(projected.is_defined(&audited, false));
//! assert!(context.map_type(&projected).is_projected_by(context.id()));
//! # Ok::<(), decorscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Contexts are immutable after construction and cheap to clone; they and their wrappers are
//! `Send + Sync`.

mod decorate;
mod wrapper;

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bitflags::bitflags;

use crate::metadata::{
    decorations::UsageResolver,
    reflection::{
        AssemblyRc, Entity, EventRc, FieldRc, Member, MethodRc, ParameterRc, PropertyRc, TypeRc,
    },
    table::MetadataTable,
};

pub use wrapper::Projected;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ProjectionContext`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Behavioral options of a [`ProjectionContext`]
    pub struct ProjectionOptions: u32 {
        /// Walk property overrides when inherited decorations are requested. Native properties
        /// ignore inheritance, so this is off by default.
        const HONOR_PROPERTY_INHERITANCE = 0x0001;
        /// Walk event overrides when inherited decorations are requested
        const HONOR_EVENT_INHERITANCE = 0x0002;
    }
}

struct ContextInner {
    id: ContextId,
    table: MetadataTable,
    options: ProjectionOptions,
    usage: UsageResolver,
}

/// Maps entities into projected wrappers merging a [`MetadataTable`] into their decorations
#[derive(Clone)]
pub struct ProjectionContext(Arc<ContextInner>);

impl ProjectionContext {
    /// Create a context over `table` with default options
    #[must_use]
    pub fn new(table: MetadataTable) -> Self {
        Self::with_options(table, ProjectionOptions::empty())
    }

    /// Create a context over `table` with `options`
    #[must_use]
    pub fn with_options(table: MetadataTable, options: ProjectionOptions) -> Self {
        let id = ContextId::next();
        tracing::debug!(
            context = %id,
            types = table.len(),
            options = ?options,
            "created projection context"
        );

        ProjectionContext(Arc::new(ContextInner {
            id,
            table,
            options,
            usage: UsageResolver::new(),
        }))
    }

    /// The identity of this context
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.0.id
    }

    /// The table merged by this context
    #[must_use]
    pub fn table(&self) -> &MetadataTable {
        &self.0.table
    }

    /// The options of this context
    #[must_use]
    pub fn options(&self) -> ProjectionOptions {
        self.0.options
    }

    pub(crate) fn usage(&self) -> &UsageResolver {
        &self.0.usage
    }

    /// Map a type into this context
    #[must_use]
    pub fn map_type(&self, ty: &TypeRc) -> TypeRc {
        if ty.is_projected_by(self.id()) {
            return ty.clone();
        }
        Arc::new(Projected::new(ty.clone(), self.clone()))
    }

    /// Map a method or constructor into this context
    #[must_use]
    pub fn map_method(&self, method: &MethodRc) -> MethodRc {
        if method.is_projected_by(self.id()) {
            return method.clone();
        }
        Arc::new(Projected::new(method.clone(), self.clone()))
    }

    /// Map a field into this context
    #[must_use]
    pub fn map_field(&self, field: &FieldRc) -> FieldRc {
        if field.is_projected_by(self.id()) {
            return field.clone();
        }
        Arc::new(Projected::new(field.clone(), self.clone()))
    }

    /// Map a property into this context
    #[must_use]
    pub fn map_property(&self, property: &PropertyRc) -> PropertyRc {
        if property.is_projected_by(self.id()) {
            return property.clone();
        }
        Arc::new(Projected::new(property.clone(), self.clone()))
    }

    /// Map an event into this context
    #[must_use]
    pub fn map_event(&self, event: &EventRc) -> EventRc {
        if event.is_projected_by(self.id()) {
            return event.clone();
        }
        Arc::new(Projected::new(event.clone(), self.clone()))
    }

    /// Map a parameter into this context
    #[must_use]
    pub fn map_parameter(&self, parameter: &ParameterRc) -> ParameterRc {
        if parameter.is_projected_by(self.id()) {
            return parameter.clone();
        }
        Arc::new(Projected::new(parameter.clone(), self.clone()))
    }

    /// Map an assembly into this context
    #[must_use]
    pub fn map_assembly(&self, assembly: &AssemblyRc) -> AssemblyRc {
        if assembly.is_projected_by(self.id()) {
            return assembly.clone();
        }
        Arc::new(Projected::new(assembly.clone(), self.clone()))
    }

    /// Map any type member into this context
    #[must_use]
    pub fn map_member(&self, member: &Member) -> Member {
        match member {
            Member::Type(ty) => Member::Type(self.map_type(ty)),
            Member::Method(method) => Member::Method(self.map_method(method)),
            Member::Field(field) => Member::Field(self.map_field(field)),
            Member::Property(property) => Member::Property(self.map_property(property)),
            Member::Event(event) => Member::Event(self.map_event(event)),
        }
    }

    /// Map any entity into this context
    #[must_use]
    pub fn map(&self, entity: &Entity) -> Entity {
        match entity {
            Entity::Assembly(assembly) => Entity::Assembly(self.map_assembly(assembly)),
            Entity::Member(member) => Entity::Member(self.map_member(member)),
            Entity::Parameter(parameter) => Entity::Parameter(self.map_parameter(parameter)),
        }
    }

    pub(crate) fn map_types(&self, types: Vec<TypeRc>) -> Vec<TypeRc> {
        types.iter().map(|ty| self.map_type(ty)).collect()
    }

    pub(crate) fn map_methods(&self, methods: Vec<MethodRc>) -> Vec<MethodRc> {
        methods.iter().map(|method| self.map_method(method)).collect()
    }
}

impl fmt::Debug for ProjectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionContext")
            .field("id", &self.0.id)
            .field("types", &self.0.table.len())
            .field("options", &self.0.options)
            .finish()
    }
}
