//! Table keys and projections across generic definitions and their instantiations.

use decorscope::prelude::*;

struct Generic {
    universe: std::sync::Arc<TypeUniverse>,
    assembly: NativeAssembly,
    definition: NativeType,
    method: NativeMethod,
    overload: NativeMethod,
}

/// `GenericType<T>` with `Method(T, string)` and `Method(T, T)`
fn generic() -> Result<Generic> {
    let universe = TypeUniverse::new();
    let assembly = universe.define_assembly("Samples")?;
    let string = universe.primitive(PrimitiveKind::String);

    let definition = TypeBuilder::class("GenericType`1")
        .namespace("Samples")
        .generic_params(["T"])
        .build(&assembly)?;
    let method = MethodBuilder::new("Method")
        .param("value", TypeArg::TypeParameter(0))
        .param("label", &string)
        .build(&definition)?;
    let overload = MethodBuilder::new("Method")
        .param("left", TypeArg::TypeParameter(0))
        .param("right", TypeArg::TypeParameter(0))
        .build(&definition)?;

    Ok(Generic {
        universe,
        assembly,
        definition,
        method,
        overload,
    })
}

fn method_with(ty: &dyn TypeInfo, id: EntityId) -> Option<MethodRc> {
    ty.methods()
        .into_iter()
        .find(|method| method.metadata_id() == id)
}

/// Closed and open forms of one declaration share a key; overloads do not
#[test]
fn test_method_keys_normalize_instantiations() -> Result<()> {
    let generic = generic()?;
    let int = generic.universe.primitive(PrimitiveKind::Int32);
    let closed = generic.definition.instantiate(&[int])?;
    let closed_method = method_with(&closed, generic.method.metadata_id())
        .ok_or(Error::TypeNotFound("Method".to_string()))?;

    assert_eq!(
        closed_method.parameters()[0].parameter_type().full_name(),
        "System.Int32"
    );
    assert_eq!(MethodKey::of(&closed_method), MethodKey::of(&generic.method.rc()));
    assert_ne!(MethodKey::of(&generic.overload.rc()), MethodKey::of(&generic.method.rc()));
    assert_eq!(
        MethodKey::of(&generic.method.rc()).parameters()[0],
        TypeSig::TypeParameter(0)
    );
    Ok(())
}

/// Decorations attached through a closed type are visible on the definition and every other
/// instantiation
#[test]
fn test_decorations_shared_across_instantiations() -> Result<()> {
    let generic = generic()?;
    let int = generic.universe.primitive(PrimitiveKind::Int32);
    let string = generic.universe.primitive(PrimitiveKind::String);
    let note = DecorationKind::new("Samples.NoteAttribute");

    let closed_int = generic.definition.instantiate(&[int])?;
    let closed_string = generic.definition.instantiate(&[string])?;
    let int_method = method_with(&closed_int, generic.method.metadata_id())
        .ok_or(Error::TypeNotFound("Method".to_string()))?;

    let mut builder = MetadataTableBuilder::new();
    builder
        .add_type_decorations(&closed_int, [Decoration::new(&note).arg("type")])?
        .add_member_decorations(&Member::Method(int_method), [Decoration::new(&note).arg("method")])?;
    let context = ProjectionContext::new(builder.create_table());

    for ty in [&generic.definition, &closed_int, &closed_string] {
        let projected = context.map_type(&ty.rc());
        assert!(projected.is_defined(&note, false), "{}", ty.full_name());

        let method = method_with(projected.as_ref(), generic.method.metadata_id())
            .ok_or(Error::TypeNotFound("Method".to_string()))?;
        assert!(method.is_defined(&note, false), "{}", ty.full_name());

        let overload = method_with(projected.as_ref(), generic.overload.metadata_id())
            .ok_or(Error::TypeNotFound("Method".to_string()))?;
        assert!(!overload.is_defined(&note, false));
    }
    Ok(())
}

/// Instantiated generic methods share the entry of their generic method definition
#[test]
fn test_generic_method_instantiation() -> Result<()> {
    let generic = generic()?;
    let int = generic.universe.primitive(PrimitiveKind::Int32);
    let note = DecorationKind::new("Samples.NoteAttribute");

    let util = TypeBuilder::class("Util").build(&generic.assembly)?;
    let convert = MethodBuilder::new("Convert")
        .generic_params(["U"])
        .param("value", TypeArg::MethodParameter(0))
        .returns(TypeArg::MethodParameter(0))
        .build(&util)?;

    let mut builder = MetadataTableBuilder::new();
    builder.add_method_parameter_decorations(&convert.rc(), 0, [Decoration::new(&note)])?;
    let context = ProjectionContext::new(builder.create_table());

    let closed = context.map_method(&convert.instantiate(&[int])?.rc());
    assert!(!closed.is_generic_method_definition());
    assert_eq!(
        closed.parameters()[0].parameter_type().full_name(),
        "System.Int32"
    );
    assert!(closed.parameters()[0].is_defined(&note, false));
    assert!(closed
        .generic_method_definition()
        .is_some_and(|definition| definition.is_projected_by(context.id())));
    Ok(())
}

/// Overrides reached through a closed generic base inherit the base declaration's decorations
#[test]
fn test_override_through_generic_base() -> Result<()> {
    let generic = generic()?;
    let int = generic.universe.primitive(PrimitiveKind::Int32);
    let audited = DecorationKind::new("Samples.AuditedAttribute");

    let repository = TypeBuilder::class("Repository`1")
        .generic_params(["T"])
        .build(&generic.assembly)?;
    let save = MethodBuilder::new("Save")
        .virtual_method()
        .param("item", TypeArg::TypeParameter(0))
        .build(&repository)?;
    let orders = TypeBuilder::class("Orders")
        .base(TypeArg::generic(&repository, [TypeArg::from(&int)]))
        .build(&generic.assembly)?;
    MethodBuilder::new("Save")
        .virtual_method()
        .param("item", &int)
        .build(&orders)?;

    let mut builder = MetadataTableBuilder::new();
    builder.add_member_decorations(&Member::Method(save.rc()), [Decoration::new(&audited)])?;
    let context = ProjectionContext::new(builder.create_table());

    let projected = context.map_type(&orders.rc());
    let override_save = find_method(projected.as_ref(), "Save", Some(1))?;
    assert!(override_save.is_defined(&audited, true));
    assert!(!override_save.is_defined(&audited, false));
    assert_eq!(
        override_save
            .parent_definition()
            .and_then(|parent| parent.declaring_type())
            .map(|ty| ty.full_name()),
        Some("Repository`1[System.Int32]".to_string())
    );
    Ok(())
}

/// Generic parameters are types of their own and can be decorated
#[test]
fn test_generic_parameter_decorations() -> Result<()> {
    let generic = generic()?;
    let constraint = DecorationKind::new("Samples.ConstraintAttribute");
    let parameter = generic
        .definition
        .generic_parameter(0)
        .ok_or(Error::TypeNotFound("T".to_string()))?;

    let mut builder = MetadataTableBuilder::new();
    builder.add_type_decorations(&parameter, [Decoration::new(&constraint)])?;
    let context = ProjectionContext::new(builder.create_table());

    let projected = context.map_type(&generic.definition.rc());
    let arguments = projected.generic_arguments();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].flavor(), TypeFlavor::GenericParameter);
    assert!(arguments[0].is_defined(&constraint, false));
    assert!(!projected.is_defined(&constraint, false));
    Ok(())
}
