//! Closed sets of entities for generic dispatch paths.

use crate::metadata::{
    decorations::{Decoration, KindFilter},
    reflection::{
        AssemblyRc, EventRc, FieldRc, MemberKind, MethodRc, ParameterRc, PropertyRc, TypeRc,
    },
    token::EntityId,
};

/// Any type member
#[derive(Clone, Debug)]
pub enum Member {
    /// A type
    Type(TypeRc),
    /// A method or constructor
    Method(MethodRc),
    /// A field
    Field(FieldRc),
    /// A property
    Property(PropertyRc),
    /// An event
    Event(EventRc),
}

impl Member {
    /// The member kind
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Type(_) => MemberKind::Type,
            Member::Method(method) => method.kind(),
            Member::Field(_) => MemberKind::Field,
            Member::Property(_) => MemberKind::Property,
            Member::Event(_) => MemberKind::Event,
        }
    }

    /// Simple name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Member::Type(ty) => ty.name(),
            Member::Method(method) => method.name(),
            Member::Field(field) => field.name(),
            Member::Property(property) => property.name(),
            Member::Event(event) => event.name(),
        }
    }

    /// The declaring type
    #[must_use]
    pub fn declaring_type(&self) -> Option<TypeRc> {
        match self {
            Member::Type(ty) => ty.declaring_type(),
            Member::Method(method) => method.declaring_type(),
            Member::Field(field) => field.declaring_type(),
            Member::Property(property) => property.declaring_type(),
            Member::Event(event) => event.declaring_type(),
        }
    }

    /// Identity of the metadata definition
    #[must_use]
    pub fn metadata_id(&self) -> EntityId {
        match self {
            Member::Type(ty) => ty.metadata_id(),
            Member::Method(method) => method.metadata_id(),
            Member::Field(field) => field.metadata_id(),
            Member::Property(property) => property.metadata_id(),
            Member::Event(event) => event.metadata_id(),
        }
    }

    /// Decorations of the member
    #[must_use]
    pub fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        match self {
            Member::Type(ty) => ty.decorations(filter, inherit),
            Member::Method(method) => method.decorations(filter, inherit),
            Member::Field(field) => field.decorations(filter, inherit),
            Member::Property(property) => property.decorations(filter, inherit),
            Member::Event(event) => event.decorations(filter, inherit),
        }
    }
}

impl From<TypeRc> for Member {
    fn from(ty: TypeRc) -> Self {
        Member::Type(ty)
    }
}

impl From<MethodRc> for Member {
    fn from(method: MethodRc) -> Self {
        Member::Method(method)
    }
}

impl From<FieldRc> for Member {
    fn from(field: FieldRc) -> Self {
        Member::Field(field)
    }
}

impl From<PropertyRc> for Member {
    fn from(property: PropertyRc) -> Self {
        Member::Property(property)
    }
}

impl From<EventRc> for Member {
    fn from(event: EventRc) -> Self {
        Member::Event(event)
    }
}

/// Any introspection entity
#[derive(Clone, Debug)]
pub enum Entity {
    /// An assembly
    Assembly(AssemblyRc),
    /// A type member
    Member(Member),
    /// A parameter
    Parameter(ParameterRc),
}

impl Entity {
    /// Decorations of the entity
    #[must_use]
    pub fn decorations(&self, filter: &KindFilter, inherit: bool) -> Vec<Decoration> {
        match self {
            Entity::Assembly(assembly) => assembly.decorations(filter, inherit),
            Entity::Member(member) => member.decorations(filter, inherit),
            Entity::Parameter(parameter) => parameter.decorations(filter, inherit),
        }
    }
}

impl From<Member> for Entity {
    fn from(member: Member) -> Self {
        Entity::Member(member)
    }
}

impl From<AssemblyRc> for Entity {
    fn from(assembly: AssemblyRc) -> Self {
        Entity::Assembly(assembly)
    }
}

impl From<ParameterRc> for Entity {
    fn from(parameter: ParameterRc) -> Self {
        Entity::Parameter(parameter)
    }
}
