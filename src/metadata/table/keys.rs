//! Member identity used to address table entries.
//!
//! Keys never hold on to reflection objects. They are built from metadata identities and names,
//! so a key computed from a native member, a projected member or a member of another generic
//! instantiation of the same definition addresses the same entry.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::metadata::{
    reflection::{GenericOwner, MemberKind, MethodRc, TypeInfo, TypeRc},
    table::hash::SignatureHash,
    token::EntityId,
};

/// Identity of a declaring type: its metadata definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(EntityId);

impl TypeKey {
    /// Key of `ty`; all instantiations of a generic definition share it
    #[must_use]
    pub fn of(ty: &dyn TypeInfo) -> Self {
        TypeKey(ty.metadata_id())
    }

    /// The metadata identity behind the key
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.0
    }
}

/// Identity of a non-overloadable member (field, property, event) within its declaring type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    kind: MemberKind,
    name: String,
}

impl MemberKey {
    /// Create a key for the member `name` of `kind`
    #[must_use]
    pub fn new(kind: MemberKind, name: &str) -> Self {
        MemberKey {
            kind,
            name: name.to_string(),
        }
    }

    /// The member kind
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// The member name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A normalized parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    /// A non-generic type, by metadata identity
    Named(EntityId),
    /// Formal type parameter of the declaring type (`!n`)
    TypeParameter(u16),
    /// Formal method parameter (`!!n`)
    MethodParameter(u16),
    /// A generic instantiation: definition identity plus arguments
    Instance(EntityId, Vec<TypeSig>),
}

impl TypeSig {
    /// Normalized signature of `ty`
    #[must_use]
    pub fn of(ty: &TypeRc) -> Self {
        if let Some(position) = ty.generic_parameter_position() {
            return match position.owner {
                GenericOwner::Type => TypeSig::TypeParameter(position.index),
                GenericOwner::Method => TypeSig::MethodParameter(position.index),
            };
        }

        match ty.generic_type_definition() {
            Some(definition) => TypeSig::Instance(
                definition.metadata_id(),
                ty.generic_arguments().iter().map(TypeSig::of).collect(),
            ),
            None => TypeSig::Named(ty.metadata_id()),
        }
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Named(id) => write!(f, "{id}"),
            TypeSig::TypeParameter(index) => write!(f, "!{index}"),
            TypeSig::MethodParameter(index) => write!(f, "!!{index}"),
            TypeSig::Instance(id, args) => {
                write!(f, "{id}<")?;
                for (position, arg) in args.iter().enumerate() {
                    if position > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Identity of a method or constructor within its declaring type.
///
/// Built from the method's open form: an instantiated generic method is replaced by its generic
/// method definition, and a method reached through a closed generic type by the same method on
/// the generic type definition. Parameter types then refer to formal generic parameters by
/// position, so every instantiation of one declaration yields an equal key while overloads
/// stay distinct.
#[derive(Clone)]
pub struct MethodKey {
    name: String,
    generic_arity: usize,
    parameters: Vec<TypeSig>,
    hash: u64,
}

impl MethodKey {
    /// Create a key from its parts
    #[must_use]
    pub fn new(name: &str, generic_arity: usize, parameters: Vec<TypeSig>) -> Self {
        let hash = parameters
            .iter()
            .fold(
                SignatureHash::new()
                    .add_component(name)
                    .add_count(generic_arity)
                    .add_count(parameters.len()),
                |hash, parameter| hash.add_component(parameter),
            )
            .finalize();

        MethodKey {
            name: name.to_string(),
            generic_arity,
            parameters,
            hash,
        }
    }

    /// Key of `method`, normalized to its open declaration
    #[must_use]
    pub fn of(method: &MethodRc) -> Self {
        let open = open_declaration(method);
        let parameters = open
            .parameters()
            .iter()
            .map(|parameter| TypeSig::of(&parameter.parameter_type()))
            .collect();

        MethodKey::new(open.name(), open.generic_arguments().len(), parameters)
    }

    /// The method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of generic method parameters
    #[must_use]
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    /// Normalized parameter types
    #[must_use]
    pub fn parameters(&self) -> &[TypeSig] {
        &self.parameters
    }

    /// The precomputed signature hash
    #[must_use]
    pub fn signature_hash(&self) -> u64 {
        self.hash
    }
}

/// `method` with method-level and type-level generic arguments removed
fn open_declaration(method: &MethodRc) -> MethodRc {
    let method = method
        .generic_method_definition()
        .unwrap_or_else(|| method.clone());

    let id = method.metadata_id();
    method
        .declaring_type()
        .and_then(|declaring| declaring.generic_type_definition())
        .and_then(|definition| {
            definition
                .methods()
                .into_iter()
                .chain(definition.constructors())
                .find(|candidate| candidate.metadata_id() == id)
        })
        .unwrap_or(method)
}

impl PartialEq for MethodKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.generic_arity == other.generic_arity
            && self.name == other.name
            && self.parameters == other.parameters
    }
}

impl Eq for MethodKey {}

impl Hash for MethodKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodKey({self})")
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.generic_arity > 0 {
            write!(f, "``{}", self.generic_arity)?;
        }
        write!(f, "(")?;
        for (position, parameter) in self.parameters.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ")")
    }
}
