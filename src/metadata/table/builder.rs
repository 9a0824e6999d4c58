//! Mutable accumulation of table decorations.

use std::{collections::HashMap, sync::Arc};

use crate::{
    metadata::{
        decorations::{Decoration, DecorationTargets, UsageResolver},
        reflection::{
            find_event, find_field, find_method, find_property, Entity, Member, MemberKind,
            MethodRc, ParameterInfo, TypeFlavor, TypeInfo, TypeRc,
        },
        table::{MemberKey, MetadataTable, MethodKey, MethodMetadata, TypeKey, TypeMetadata},
    },
    Error, Result,
};

/// Builds [`MetadataTable`] snapshots.
///
/// The builder is single-writer. Every `add_*` call validates its arguments completely before
/// changing anything, so a failed call leaves the builder untouched. Decorations are appended
/// in call order; nothing is ever removed.
///
/// # Examples
///
/// ```rust
/// use decorscope::prelude::*;
///
/// let universe = TypeUniverse::new();
/// let assembly = universe.define_assembly("Samples")?;
/// let string = universe.primitive(PrimitiveKind::String);
/// let customer = TypeBuilder::class("Customer").namespace("Samples").build(&assembly)?;
/// PropertyBuilder::new("Name", &string)
///     .accessors(MethodFlags::empty())
///     .build(&customer)?;
///
/// let display = DecorationKind::new("UI.DisplayAttribute");
/// let mut builder = MetadataTableBuilder::new();
/// builder
///     .add_type_decorations(&customer, [Decoration::new(&display).arg("Customer")])?
///     .add_property_decorations(&customer, "Name", [Decoration::new(&display).arg("Name")])?;
///
/// let table = builder.create_table();
/// assert_eq!(table.type_decorations(&customer).len(), 1);
/// # Ok::<(), decorscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MetadataTableBuilder {
    types: HashMap<TypeKey, Arc<TypeMetadata>>,
    usage: UsageResolver,
}

/// A method-level or parameter-level write, resolved and validated
#[derive(Clone, Copy)]
enum MethodSlot {
    Method,
    Parameter(i32),
}

impl MetadataTableBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder continuing from `table`. Entries are shared with `table` until modified.
    #[must_use]
    pub fn from_table(table: &MetadataTable) -> Self {
        MetadataTableBuilder {
            types: table.entries().clone(),
            usage: UsageResolver::new(),
        }
    }

    /// Snapshot the current state into an immutable table.
    ///
    /// The builder stays usable; later additions do not affect returned snapshots.
    #[must_use]
    pub fn create_table(&self) -> MetadataTable {
        let table = MetadataTable::from_entries(self.types.clone());
        tracing::debug!(
            types = table.len(),
            decorations = table.decoration_count(),
            "created metadata table snapshot"
        );
        table
    }

    fn entry(&mut self, key: TypeKey) -> &mut TypeMetadata {
        Arc::make_mut(self.types.entry(key).or_default())
    }

    fn warn_invalid_targets(&self, target: DecorationTargets, decorations: &[Decoration], name: &str) {
        for decoration in decorations {
            let policy = self.usage.resolve(decoration.kind());
            if !policy.is_valid_on(target) {
                tracing::warn!(
                    kind = %decoration.kind(),
                    member = name,
                    target = ?target,
                    valid_on = ?policy.valid_on,
                    "decoration attached outside its declared targets"
                );
            }
        }
    }

    /// Attach type-level decorations to `ty` (and every instantiation of its definition)
    ///
    /// # Errors
    /// This operation currently cannot fail; the `Result` keeps it chainable with the other
    /// `add_*` operations.
    pub fn add_type_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let decorations: Vec<Decoration> = decorations.into_iter().collect();
        self.warn_invalid_targets(type_target(ty.flavor()), &decorations, ty.name());

        tracing::trace!(ty = %ty.full_name(), count = decorations.len(), "added type decorations");
        self.entry(TypeKey::of(ty)).decorations.extend(decorations);
        Ok(self)
    }

    /// Attach decorations to `member`, dispatching by member kind: types get type-level
    /// decorations, methods and constructors method-level decorations, fields, properties and
    /// events member decorations
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if a member other than a type has no declaring type.
    pub fn add_member_decorations(
        &mut self,
        member: &Member,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        match member {
            Member::Type(ty) => self.add_type_decorations(ty.as_ref(), decorations),
            Member::Method(method) => {
                self.add_method_slot(method, MethodSlot::Method, decorations.into_iter().collect())
            }
            Member::Field(_) | Member::Property(_) | Member::Event(_) => {
                let declaring = declaring_type_of(member)?;
                let decorations: Vec<Decoration> = decorations.into_iter().collect();
                self.warn_invalid_targets(member_target(member.kind()), &decorations, member.name());

                tracing::trace!(
                    ty = %declaring.full_name(),
                    member = member.name(),
                    count = decorations.len(),
                    "added member decorations"
                );
                self.entry(TypeKey::of(declaring.as_ref()))
                    .members
                    .entry(MemberKey::new(member.kind(), member.name()))
                    .or_default()
                    .extend(decorations);
                Ok(self)
            }
        }
    }

    /// Attach decorations to `parameter`, addressed by its owning method and position
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the position is out of range for the method.
    pub fn add_parameter_decorations(
        &mut self,
        parameter: &dyn ParameterInfo,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        self.add_method_parameter_decorations(&parameter.member(), parameter.position(), decorations)
    }

    /// Attach decorations to the parameter of `method` at `position`; `-1` addresses the return
    /// parameter
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `position` is not in `-1..parameter_count`, or is
    /// `-1` on a constructor.
    pub fn add_method_parameter_decorations(
        &mut self,
        method: &MethodRc,
        position: i32,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        self.add_method_slot(
            method,
            MethodSlot::Parameter(position),
            decorations.into_iter().collect(),
        )
    }

    fn add_method_slot(
        &mut self,
        method: &MethodRc,
        slot: MethodSlot,
        decorations: Vec<Decoration>,
    ) -> Result<&mut Self> {
        let declaring = method.declaring_type().ok_or_else(|| {
            invalid_argument!("method '{}' has no declaring type", method.name())
        })?;
        let parameter_count = method.parameters().len();

        let target = match slot {
            MethodSlot::Method => member_target(method.kind()),
            MethodSlot::Parameter(-1) if method.is_constructor() => {
                return Err(invalid_argument!(
                    "constructor of '{}' has no return parameter",
                    declaring.full_name()
                ))
            }
            MethodSlot::Parameter(-1) => DecorationTargets::RETURN_VALUE,
            MethodSlot::Parameter(position)
                if usize::try_from(position).is_ok_and(|position| position < parameter_count) =>
            {
                DecorationTargets::PARAMETER
            }
            MethodSlot::Parameter(position) => {
                return Err(invalid_argument!(
                    "parameter position {} is out of range for '{}.{}' ({} parameters)",
                    position,
                    declaring.full_name(),
                    method.name(),
                    parameter_count
                ))
            }
        };
        self.warn_invalid_targets(target, &decorations, method.name());

        let key = MethodKey::of(method);
        tracing::trace!(
            ty = %declaring.full_name(),
            method = %key,
            count = decorations.len(),
            "added method decorations"
        );

        let metadata = self
            .entry(TypeKey::of(declaring.as_ref()))
            .methods
            .entry(key)
            .or_insert_with(|| MethodMetadata::new(parameter_count));
        let list = match slot {
            MethodSlot::Method => &mut metadata.decorations,
            MethodSlot::Parameter(position) => {
                metadata.parameter_mut(position).ok_or_else(|| {
                    invalid_argument!(
                        "parameter position {} has no slot in the entry of '{}'",
                        position,
                        method.name()
                    )
                })?
            }
        };
        list.extend(decorations);
        Ok(self)
    }

    /// Attach decorations to the field `name` declared on `ty`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if `ty` declares no such field.
    pub fn add_field_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        name: &str,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let field = find_field(ty, name)?;
        self.add_member_decorations(&Member::Field(field), decorations)
    }

    /// Attach decorations to the property `name` declared on `ty`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if `ty` declares no such property.
    pub fn add_property_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        name: &str,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let property = find_property(ty, name)?;
        self.add_member_decorations(&Member::Property(property), decorations)
    }

    /// Attach decorations to the event `name` declared on `ty`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if `ty` declares no such event.
    pub fn add_event_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        name: &str,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let event = find_event(ty, name)?;
        self.add_member_decorations(&Member::Event(event), decorations)
    }

    /// Attach method-level decorations to the method `name` declared on `ty`, optionally
    /// selecting the overload taking `arity` parameters
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no overload matches and [`Error::AmbiguousMatch`] if
    /// several do.
    pub fn add_method_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        name: &str,
        arity: Option<usize>,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let method = find_method(ty, name, arity)?;
        self.add_member_decorations(&Member::Method(method), decorations)
    }

    /// Attach decorations to `member`, which must be declared by `ty` itself
    ///
    /// # Errors
    /// Returns [`Error::NotDeclared`] if `member` is only inherited by `ty`.
    pub fn add_declared_member_decorations(
        &mut self,
        ty: &dyn TypeInfo,
        member: &Member,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        let declared_here = member
            .declaring_type()
            .is_some_and(|declaring| declaring.metadata_id() == ty.metadata_id());
        if !declared_here {
            return Err(Error::NotDeclared {
                name: member.name().to_string(),
                type_name: ty.full_name(),
            });
        }
        self.add_member_decorations(member, decorations)
    }

    /// Attach decorations to any entity
    ///
    /// # Errors
    /// Returns [`Error::NotSupported`] for assemblies, and the errors of
    /// [`Self::add_member_decorations`] / [`Self::add_parameter_decorations`] otherwise.
    pub fn add_decorations(
        &mut self,
        entity: &Entity,
        decorations: impl IntoIterator<Item = Decoration>,
    ) -> Result<&mut Self> {
        match entity {
            Entity::Assembly(assembly) => Err(Error::NotSupported(format!(
                "metadata tables hold no assembly decorations (assembly '{}')",
                assembly.name()
            ))),
            Entity::Member(member) => self.add_member_decorations(member, decorations),
            Entity::Parameter(parameter) => {
                self.add_parameter_decorations(parameter.as_ref(), decorations)
            }
        }
    }
}

pub(crate) fn declaring_type_of(member: &Member) -> Result<TypeRc> {
    member.declaring_type().ok_or_else(|| {
        invalid_argument!(
            "{} '{}' has no declaring type",
            member.kind(),
            member.name()
        )
    })
}

fn type_target(flavor: TypeFlavor) -> DecorationTargets {
    match flavor {
        TypeFlavor::Class => DecorationTargets::CLASS,
        TypeFlavor::Interface => DecorationTargets::INTERFACE,
        TypeFlavor::Struct => DecorationTargets::STRUCT,
        TypeFlavor::GenericParameter => DecorationTargets::GENERIC_PARAMETER,
    }
}

fn member_target(kind: MemberKind) -> DecorationTargets {
    match kind {
        MemberKind::Type => DecorationTargets::CLASS,
        MemberKind::Method => DecorationTargets::METHOD,
        MemberKind::Constructor => DecorationTargets::CONSTRUCTOR,
        MemberKind::Field => DecorationTargets::FIELD,
        MemberKind::Property => DecorationTargets::PROPERTY,
        MemberKind::Event => DecorationTargets::EVENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            decorations::DecorationKind,
            reflection::{MethodInfo, MethodFlags},
            typesystem::{FieldBuilder, MethodBuilder, PrimitiveKind, TypeBuilder, TypeUniverse},
        },
        test::fixtures,
    };

    #[test]
    fn test_parameter_indexing() {
        let fixture = fixtures::calculator();
        let add = fixture.add.rc();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_method_parameter_decorations(&add, 0, [Decoration::new(&note)])
            .unwrap()
            .add_method_parameter_decorations(&add, -1, [Decoration::new(&note)])
            .unwrap();
        let table = builder.create_table();

        let params = add.parameters();
        assert_eq!(table.parameter_decorations(params[0].as_ref()).len(), 1);
        assert!(table.parameter_decorations(params[1].as_ref()).is_empty());
        let returns = add.return_parameter().unwrap();
        assert_eq!(table.parameter_decorations(returns.as_ref()).len(), 1);
        assert!(table.method_decorations(&add).is_empty());
    }

    #[test]
    fn test_out_of_range_parameter_rejected() {
        let fixture = fixtures::calculator();
        let add = fixture.add.rc();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        for position in [2, -2] {
            let result = builder.add_method_parameter_decorations(&add, position, [Decoration::new(&note)]);
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
        assert!(builder.create_table().is_empty());
    }

    #[test]
    fn test_rejected_parameter_write_keeps_entry() {
        let fixture = fixtures::calculator();
        let add = fixture.add.rc();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_method_parameter_decorations(&add, 1, [Decoration::new(&note)])
            .unwrap();
        let result = builder.add_method_parameter_decorations(&add, 2, [Decoration::new(&note)]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let table = builder.create_table();
        assert_eq!(table.decoration_count(), 1);
        let metadata = table.method_metadata(&add).unwrap();
        assert_eq!(metadata.parameter_count(), 2);
        assert_eq!(metadata.parameter(1).len(), 1);
    }

    #[test]
    fn test_constructor_return_parameter_rejected() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let widget = TypeBuilder::class("Widget").build(&assembly).unwrap();
        let ctor = MethodBuilder::constructor().build(&widget).unwrap();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        let result = builder.add_method_parameter_decorations(&ctor.rc(), -1, [Decoration::new(&note)]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_by_name_helpers() {
        let fixture = fixtures::calculator();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        assert!(matches!(
            builder.add_field_decorations(&fixture.calc, "missing", [Decoration::new(&note)]),
            Err(Error::MemberNotFound { kind: MemberKind::Field, .. })
        ));
        assert!(matches!(
            builder.add_method_decorations(&fixture.calc, "Add", None, [Decoration::new(&note)]),
            Err(Error::AmbiguousMatch { .. })
        ));

        builder
            .add_method_decorations(&fixture.calc, "Add", Some(3), [Decoration::new(&note)])
            .unwrap();
        let table = builder.create_table();
        assert_eq!(table.method_decorations(&fixture.add3.rc()).len(), 1);
        assert!(table.method_decorations(&fixture.add.rc()).is_empty());
    }

    #[test]
    fn test_inherited_member_not_declared() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);
        let base = TypeBuilder::class("Base").build(&assembly).unwrap();
        let derived = TypeBuilder::class("Derived").base(&base).build(&assembly).unwrap();
        let field = FieldBuilder::new("count", &int).build(&base).unwrap();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        let member = Member::Field(field.rc());
        assert!(matches!(
            builder.add_declared_member_decorations(&derived, &member, [Decoration::new(&note)]),
            Err(Error::NotDeclared { .. })
        ));
        builder
            .add_declared_member_decorations(&base, &member, [Decoration::new(&note)])
            .unwrap();
        assert_eq!(builder.create_table().member_decorations(&member).len(), 1);
    }

    #[test]
    fn test_assembly_not_supported() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        let result = builder.add_decorations(&Entity::Assembly(assembly.rc()), [Decoration::new(&note)]);
        assert!(matches!(result, Err(Error::NotSupported(_))));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let fixture = fixtures::calculator();
        let note = DecorationKind::new("Tests.NoteAttribute");

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_type_decorations(&fixture.calc, [Decoration::new(&note)])
            .unwrap();
        let first = builder.create_table();
        builder
            .add_type_decorations(&fixture.calc, [Decoration::new(&note)])
            .unwrap();
        let second = builder.create_table();

        assert_eq!(first.type_decorations(&fixture.calc).len(), 1);
        assert_eq!(second.type_decorations(&fixture.calc).len(), 2);

        let mut continued = second.to_builder();
        continued
            .add_method_decorations(&fixture.calc, "Reset", None, [Decoration::new(&note)])
            .unwrap();
        let third = continued.create_table();
        assert_eq!(second.decoration_count(), 2);
        assert_eq!(third.decoration_count(), 3);
    }

    #[test]
    fn test_target_mismatch_is_accepted() {
        let fixture = fixtures::calculator();
        let field_only = DecorationKind::with_usage(
            "Tests.FieldOnlyAttribute",
            crate::metadata::decorations::UsagePolicy::new(DecorationTargets::FIELD),
        );

        let mut builder = MetadataTableBuilder::new();
        builder
            .add_method_decorations(&fixture.calc, "Reset", None, [Decoration::new(&field_only)])
            .unwrap();
        let reset = find_method(&fixture.calc, "Reset", None).unwrap();
        assert_eq!(builder.create_table().method_decorations(&reset).len(), 1);
        assert!(!reset.flags().contains(MethodFlags::VIRTUAL));
    }
}
