//! The introspection boundary.
//!
//! Every reflectable construct (assembly, type, method, constructor, field, property, event,
//! parameter) is exposed through a trait object. The native provider in
//! [`crate::metadata::typesystem`] implements these traits over its arena, and the projection
//! wrappers in [`crate::metadata::projection`] implement them again by forwarding to an inner
//! instance. Consumers cannot tell which one they hold, which is the point: decorations merged
//! by a projection are queried through the same surface as natively declared ones.
//!
//! # Key Components
//!
//! - [`Decorated`]: Decoration retrieval shared by every entity kind
//! - [`MemberInfo`]: Kind, name, declaring type and metadata identity of type members
//! - [`TypeInfo`], [`MethodInfo`], [`FieldInfo`], [`PropertyInfo`], [`EventInfo`]: Members
//! - [`ParameterInfo`], [`AssemblyInfo`]: The remaining entity kinds
//! - [`Member`] / [`Entity`]: Closed sets for generic dispatch
//!
//! Methods and constructors share [`MethodInfo`]; [`MemberInfo::kind`] tells them apart.

mod lookup;
mod member;

use std::{fmt, sync::Arc};

use bitflags::bitflags;
use strum::Display;

use crate::{
    metadata::{
        decorations::{Decoration, DecorationKind, KindFilter},
        projection::ContextId,
        token::EntityId,
    },
    Result,
};

pub use lookup::{
    base_definition, find_event, find_field, find_method, find_property, CONSTRUCTOR_NAME,
};
pub use member::{Entity, Member};

/// A reference-counted assembly
pub type AssemblyRc = Arc<dyn AssemblyInfo>;
/// A reference-counted type
pub type TypeRc = Arc<dyn TypeInfo>;
/// A reference-counted method or constructor
pub type MethodRc = Arc<dyn MethodInfo>;
/// A reference-counted field
pub type FieldRc = Arc<dyn FieldInfo>;
/// A reference-counted property
pub type PropertyRc = Arc<dyn PropertyInfo>;
/// A reference-counted event
pub type EventRc = Arc<dyn EventInfo>;
/// A reference-counted parameter
pub type ParameterRc = Arc<dyn ParameterInfo>;

/// The kind of a type member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum MemberKind {
    /// A type (top-level or nested)
    Type,
    /// A method
    Method,
    /// An instance or static constructor
    Constructor,
    /// A field
    Field,
    /// A property
    Property,
    /// An event
    Event,
}

/// The fundamental category of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TypeFlavor {
    /// Reference type
    Class,
    /// Interface
    Interface,
    /// Value type
    Struct,
    /// Formal generic parameter of a type or method
    GenericParameter,
}

/// Declares whether a generic parameter belongs to a type or a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenericOwner {
    /// Type-level parameter (`!0`)
    Type,
    /// Method-level parameter (`!!0`)
    Method,
}

/// Position of a formal generic parameter within its owner's parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericPosition {
    /// Owner of the parameter
    pub owner: GenericOwner,
    /// 0-based index
    pub index: u16,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method attribute flags relevant to override resolution
    pub struct MethodFlags: u32 {
        /// Method is static
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method always gets a new vtable slot
        const NEW_SLOT = 0x0100;
        /// Method has no implementation
        const ABSTRACT = 0x0400;
    }
}

/// Mapping of interface methods to the methods implementing them on a type
#[derive(Clone)]
pub struct InterfaceMapping {
    /// The mapped interface
    pub interface_type: TypeRc,
    /// The interface's methods
    pub interface_methods: Vec<MethodRc>,
    /// The implementing methods, index-aligned with `interface_methods`
    pub target_methods: Vec<MethodRc>,
}

/// Decoration retrieval, shared by every entity kind
pub trait Decorated: Send + Sync {
    /// Decorations admitted by `filter`, walking inheritance if `inherit` is set and the entity
    /// kind supports it
    fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration>;

    /// Returns true if at least one decoration of `kind` (or a derived kind) is present
    fn is_defined(&self, kind: &DecorationKind, inherit: bool) -> bool {
        !self.decorations(&KindFilter::from(kind), inherit).is_empty()
    }

    /// Returns true if this instance was produced by the projection context `context`, either
    /// directly or as an inner layer
    fn is_projected_by(&self, _context: ContextId) -> bool {
        false
    }
}

/// Common surface of type members
pub trait MemberInfo: Decorated {
    /// The member kind
    fn kind(&self) -> MemberKind;

    /// Simple name
    fn name(&self) -> &str;

    /// The type declaring this member; `None` for top-level types
    fn declaring_type(&self) -> Option<TypeRc>;

    /// Identity of the metadata definition. Shared by all generic instantiations of the same
    /// definition.
    fn metadata_id(&self) -> EntityId;
}

/// A type: class, interface, value type, generic instantiation or generic parameter
pub trait TypeInfo: MemberInfo {
    /// Namespace (empty for nested types and generic parameters)
    fn namespace(&self) -> &str;

    /// Full name including generic arguments of instantiations
    fn full_name(&self) -> String;

    /// The type's category
    fn flavor(&self) -> TypeFlavor;

    /// The defining assembly
    fn assembly(&self) -> AssemblyRc;

    /// The direct base type
    fn base_type(&self) -> Option<TypeRc>;

    /// Directly implemented interfaces
    fn interfaces(&self) -> Vec<TypeRc>;

    /// Types nested in this type
    fn nested_types(&self) -> Vec<TypeRc>;

    /// Formal parameters of a generic definition, or the arguments of an instantiation
    fn generic_arguments(&self) -> Vec<TypeRc>;

    /// The generic definition of an instantiation; `None` for every other type
    fn generic_type_definition(&self) -> Option<TypeRc>;

    /// Returns true for open generic type definitions
    fn is_generic_type_definition(&self) -> bool;

    /// Position of a formal generic parameter; `None` for every other type
    fn generic_parameter_position(&self) -> Option<GenericPosition>;

    /// The method declaring a method-level generic parameter
    fn declaring_method(&self) -> Option<MethodRc>;

    /// Constructors declared on this type
    fn constructors(&self) -> Vec<MethodRc>;

    /// Methods declared on this type (constructors excluded)
    fn methods(&self) -> Vec<MethodRc>;

    /// Fields declared on this type
    fn fields(&self) -> Vec<FieldRc>;

    /// Properties declared on this type
    fn properties(&self) -> Vec<PropertyRc>;

    /// Events declared on this type
    fn events(&self) -> Vec<EventRc>;

    /// Methods of this type (or its bases) implementing `interface`
    ///
    /// # Errors
    /// Returns an error if the type does not implement `interface`.
    fn interface_map(&self, interface: &TypeRc) -> Result<InterfaceMapping>;
}

/// A method or constructor
pub trait MethodInfo: MemberInfo {
    /// Parameters in declaration order
    fn parameters(&self) -> Vec<ParameterRc>;

    /// The return parameter (position `-1`); `None` for constructors
    fn return_parameter(&self) -> Option<ParameterRc>;

    /// The return type; `None` for constructors
    fn return_type(&self) -> Option<TypeRc>;

    /// Attribute flags
    fn flags(&self) -> MethodFlags;

    /// Formal generic parameters of a generic method definition, or the arguments of an
    /// instantiated generic method
    fn generic_arguments(&self) -> Vec<TypeRc>;

    /// Returns true for open generic method definitions
    fn is_generic_method_definition(&self) -> bool;

    /// The generic definition of an instantiated generic method; `None` otherwise
    fn generic_method_definition(&self) -> Option<MethodRc>;

    /// The method this one directly overrides: the next-most-base declaration of the same
    /// virtual slot
    fn parent_definition(&self) -> Option<MethodRc>;

    /// Returns true for constructors
    fn is_constructor(&self) -> bool {
        self.kind() == MemberKind::Constructor
    }
}

/// A field
pub trait FieldInfo: MemberInfo {
    /// The field type
    fn field_type(&self) -> TypeRc;

    /// Returns true for static fields
    fn is_static(&self) -> bool;
}

/// A property
pub trait PropertyInfo: MemberInfo {
    /// The property type
    fn property_type(&self) -> TypeRc;

    /// The get accessor
    fn getter(&self) -> Option<MethodRc>;

    /// The set accessor
    fn setter(&self) -> Option<MethodRc>;

    /// The property overridden by this one, found through its accessors
    fn parent_definition(&self) -> Option<PropertyRc>;
}

/// An event
pub trait EventInfo: MemberInfo {
    /// The delegate type of the event
    fn handler_type(&self) -> TypeRc;

    /// The add accessor
    fn add_method(&self) -> Option<MethodRc>;

    /// The remove accessor
    fn remove_method(&self) -> Option<MethodRc>;

    /// The raise accessor
    fn raise_method(&self) -> Option<MethodRc>;

    /// The event overridden by this one, found through its accessors
    fn parent_definition(&self) -> Option<EventRc>;
}

/// A method parameter or return parameter
pub trait ParameterInfo: Decorated {
    /// Parameter name; `None` for return parameters
    fn name(&self) -> Option<&str>;

    /// 0-based position, `-1` for the return parameter
    fn position(&self) -> i32;

    /// The parameter type
    fn parameter_type(&self) -> TypeRc;

    /// The owning method
    fn member(&self) -> MethodRc;
}

/// An assembly
pub trait AssemblyInfo: Decorated {
    /// Simple name
    fn name(&self) -> &str;

    /// Identity of the assembly definition
    fn metadata_id(&self) -> EntityId;

    /// Top-level types defined in this assembly
    fn types(&self) -> Vec<TypeRc>;

    /// Looks up a type defined in this assembly by full name
    fn get_type(&self, full_name: &str) -> Option<TypeRc>;
}

macro_rules! impl_member_debug {
    ($($trait:ident),*) => {
        $(
            impl fmt::Debug for dyn $trait {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", self.kind(), self.name())
                }
            }
        )*
    };
}

impl_member_debug!(MethodInfo, FieldInfo, PropertyInfo, EventInfo);

impl fmt::Debug for dyn TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.full_name())
    }
}

impl fmt::Debug for dyn ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter({}, {})",
            self.position(),
            self.name().unwrap_or("<return>")
        )
    }
}

impl fmt::Debug for dyn AssemblyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assembly({})", self.name())
    }
}
