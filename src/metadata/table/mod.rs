//! The metadata table: decorations keyed by member identity.
//!
//! A [`MetadataTable`] is an immutable snapshot produced by a [`MetadataTableBuilder`]. Lookups
//! are addressed by [`TypeKey`] (the declaring type's definition), then by [`MemberKey`] for
//! fields, properties and events or by [`MethodKey`] for methods and constructors. Parameters
//! live in the owning method's [`MethodMetadata`], with position `-1` reserved for the return
//! parameter.
//!
//! Queries return only decorations added to the table, never the native decorations of the
//! member itself. Missing entries yield empty lists.
//!
//! # Structure Sharing
//!
//! Snapshots hold `Arc`s to per-type entries. A builder created with
//! [`MetadataTableBuilder::from_table`] copies an entry only when it modifies it, so successive
//! snapshots share every type they do not touch.
//!
//! # Thread Safety
//!
//! Tables are immutable and `Send + Sync`; any number of threads may query one concurrently.

mod builder;
mod hash;
mod keys;
mod metadata;

use std::{collections::HashMap, sync::Arc};

use crate::{
    metadata::{
        decorations::Decoration,
        reflection::{Entity, Member, MethodRc, ParameterInfo, TypeInfo},
    },
    Error, Result,
};

pub use builder::MetadataTableBuilder;
pub use keys::{MemberKey, MethodKey, TypeKey, TypeSig};
pub use metadata::{MethodMetadata, TypeMetadata};

const EMPTY: &[Decoration] = &[];

/// Immutable store of decorations keyed by member identity
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    types: Arc<HashMap<TypeKey, Arc<TypeMetadata>>>,
}

impl MetadataTable {
    /// A table without entries
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(types: HashMap<TypeKey, Arc<TypeMetadata>>) -> Self {
        MetadataTable {
            types: Arc::new(types),
        }
    }

    pub(crate) fn entries(&self) -> &HashMap<TypeKey, Arc<TypeMetadata>> {
        &self.types
    }

    /// A builder continuing from this snapshot
    #[must_use]
    pub fn to_builder(&self) -> MetadataTableBuilder {
        MetadataTableBuilder::from_table(self)
    }

    /// Number of declaring types with entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type has entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Total number of decorations across all entries
    #[must_use]
    pub fn decoration_count(&self) -> usize {
        self.types
            .values()
            .map(|metadata| metadata.decoration_count())
            .sum()
    }

    /// The entry of the declaring type addressed by `key`
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<&TypeMetadata> {
        self.types.get(key).map(AsRef::as_ref)
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &TypeMetadata)> {
        self.types
            .iter()
            .map(|(key, metadata)| (key, metadata.as_ref()))
    }

    fn declaring(&self, ty: Option<&dyn TypeInfo>) -> Option<&TypeMetadata> {
        ty.and_then(|ty| self.get(&TypeKey::of(ty)))
    }

    /// Type-level decorations of `ty`
    #[must_use]
    pub fn type_decorations(&self, ty: &dyn TypeInfo) -> &[Decoration] {
        self.get(&TypeKey::of(ty))
            .map_or(EMPTY, TypeMetadata::decorations)
    }

    /// Method-level decorations of `method`
    #[must_use]
    pub fn method_decorations(&self, method: &MethodRc) -> &[Decoration] {
        self.method_metadata(method)
            .map_or(EMPTY, MethodMetadata::decorations)
    }

    /// Entry of `method`, if the table holds decorations for it or its parameters
    #[must_use]
    pub fn method_metadata(&self, method: &MethodRc) -> Option<&MethodMetadata> {
        let declaring = method.declaring_type()?;
        self.declaring(Some(declaring.as_ref()))?
            .method(&MethodKey::of(method))
    }

    /// Decorations of `member`, dispatched by member kind
    #[must_use]
    pub fn member_decorations(&self, member: &Member) -> &[Decoration] {
        match member {
            Member::Type(ty) => self.type_decorations(ty.as_ref()),
            Member::Method(method) => self.method_decorations(method),
            Member::Field(_) | Member::Property(_) | Member::Event(_) => {
                let declaring = member.declaring_type();
                self.declaring(declaring.as_deref())
                    .map_or(EMPTY, |metadata| {
                        metadata.member(&MemberKey::new(member.kind(), member.name()))
                    })
            }
        }
    }

    /// Decorations of `parameter`, addressed by owning method and position
    #[must_use]
    pub fn parameter_decorations(&self, parameter: &dyn ParameterInfo) -> &[Decoration] {
        self.method_metadata(&parameter.member())
            .map_or(EMPTY, |metadata| metadata.parameter(parameter.position()))
    }

    /// Decorations of any entity
    ///
    /// # Errors
    /// Returns [`Error::NotSupported`] for assemblies.
    pub fn decorations(&self, entity: &Entity) -> Result<&[Decoration]> {
        match entity {
            Entity::Assembly(assembly) => Err(Error::NotSupported(format!(
                "metadata tables hold no assembly decorations (assembly '{}')",
                assembly.name()
            ))),
            Entity::Member(member) => Ok(self.member_decorations(member)),
            Entity::Parameter(parameter) => Ok(self.parameter_decorations(parameter.as_ref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            decorations::DecorationKind,
            reflection::{find_property, MemberInfo, MethodInfo, TypeInfo},
            typesystem::{MethodBuilder, PrimitiveKind, TypeArg, TypeBuilder, TypeUniverse},
        },
        test::fixtures,
    };

    #[test]
    fn test_empty_table() {
        let fixture = fixtures::calculator();
        let table = MetadataTable::empty();

        assert!(table.is_empty());
        assert!(table.type_decorations(&fixture.calc).is_empty());
        assert!(table.method_decorations(&fixture.add.rc()).is_empty());
    }

    #[test]
    fn test_member_lookup_by_kind() {
        let fixture = fixtures::calculator();
        let display = DecorationKind::new("Tests.DisplayAttribute");

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_property_decorations(&fixture.calc, "Total", [Decoration::new(&display)])
            .unwrap();
        let table = builder.create_table();

        let total = find_property(&fixture.calc, "Total").unwrap();
        assert_eq!(table.member_decorations(&Member::Property(total)).len(), 1);
        assert!(table.type_decorations(&fixture.calc).is_empty());
        assert_eq!(
            table
                .decorations(&Entity::Member(Member::Type(fixture.calc.rc())))
                .map(<[Decoration]>::len)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_generic_instantiations_share_entries() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);
        let string = universe.primitive(PrimitiveKind::String);
        let note = DecorationKind::new("Tests.NoteAttribute");

        let boxed = TypeBuilder::class("Box`1")
            .generic_params(["T"])
            .build(&assembly)
            .unwrap();
        let put = MethodBuilder::new("Put")
            .param("value", TypeArg::TypeParameter(0))
            .param("label", &string)
            .build(&boxed)
            .unwrap();

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_type_decorations(&boxed, [Decoration::new(&note)])
            .unwrap()
            .add_member_decorations(&Member::Method(put.rc()), [Decoration::new(&note)])
            .unwrap();
        let table = builder.create_table();

        let closed = boxed.instantiate(&[int]).unwrap();
        assert_eq!(table.type_decorations(&closed).len(), 1);

        let closed_put = closed.methods().into_iter().next().unwrap();
        assert_eq!(closed_put.parameters()[0].parameter_type().full_name(), "System.Int32");
        assert_eq!(table.method_decorations(&closed_put).len(), 1);
        assert_eq!(closed_put.metadata_id(), put.metadata_id());
    }

    #[test]
    fn test_table_is_shareable_across_threads() {
        let fixture = fixtures::calculator();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_type_decorations(&fixture.calc, [Decoration::new(&note)])
            .unwrap();
        let table = builder.create_table();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let table = &table;
                let calc = &fixture.calc;
                scope.spawn(move || assert_eq!(table.type_decorations(calc).len(), 1));
            }
        });
    }
}
