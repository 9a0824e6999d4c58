//! # decorscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the decorscope library. Import this module to get quick access to the essential
//! types for building, decorating and projecting metadata.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all decorscope operations
pub use crate::Error;

/// The result type used throughout decorscope
pub use crate::Result;

// ================================================================================================
// Reflection Surface
// ================================================================================================

/// Traits implemented by every native and projected entity
pub use crate::metadata::reflection::{
    AssemblyInfo, Decorated, EventInfo, FieldInfo, MemberInfo, MethodInfo, ParameterInfo,
    PropertyInfo, TypeInfo,
};

/// Reference-counted entity handles
pub use crate::metadata::reflection::{
    AssemblyRc, EventRc, FieldRc, MethodRc, ParameterRc, PropertyRc, TypeRc,
};

/// Closed entity sets, classification enums and lookup helpers
pub use crate::metadata::reflection::{
    base_definition, find_event, find_field, find_method, find_property, Entity,
    GenericOwner, GenericPosition, InterfaceMapping, Member, MemberKind, MethodFlags, TypeFlavor,
};

// ================================================================================================
// Native Type System
// ================================================================================================

/// Universe owning native definitions, and its builders
pub use crate::metadata::typesystem::{
    EventBuilder, FieldBuilder, MethodBuilder, PrimitiveKind, PropertyBuilder, TypeArg,
    TypeBuilder, TypeUniverse,
};

/// Native entity handles
pub use crate::metadata::typesystem::{
    NativeAssembly, NativeEvent, NativeField, NativeMethod, NativeParameter, NativeProperty,
    NativeType,
};

// ================================================================================================
// Decorations
// ================================================================================================

/// Decoration kinds, instances and their usage policies
pub use crate::metadata::decorations::{
    Decoration, DecorationArgument, DecorationKind, DecorationTargets, KindFilter, UsagePolicy,
};

// ================================================================================================
// Tables and Projections
// ================================================================================================

/// Metadata tables and their keys
pub use crate::metadata::table::{
    MemberKey, MetadataTable, MetadataTableBuilder, MethodKey, TypeKey, TypeSig,
};

/// Projection contexts
pub use crate::metadata::projection::{ContextId, Projected, ProjectionContext, ProjectionOptions};

/// Entity identities
pub use crate::metadata::token::{EntityId, Token};
