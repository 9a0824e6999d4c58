//! Round trip between native decorations and table decorations.
//!
//! A decorated reference hierarchy and an undecorated mirror of it are defined side by side. The
//! reference's own decorations are copied into a table keyed by the mirror's members; projecting
//! the mirror must then report the same decorations the reference reports natively, with and
//! without inheritance.

use std::sync::Arc;

use decorscope::prelude::*;

struct Kinds {
    info: DecorationKind,
    tag: DecorationKind,
    local: DecorationKind,
    range: DecorationKind,
}

fn kinds() -> Kinds {
    Kinds {
        info: DecorationKind::new("Samples.InfoAttribute"),
        tag: DecorationKind::with_usage(
            "Samples.TagAttribute",
            UsagePolicy::new(DecorationTargets::ALL).allow_multiple(true),
        ),
        local: DecorationKind::with_usage(
            "Samples.LocalAttribute",
            UsagePolicy::new(DecorationTargets::ALL).inherited(false),
        ),
        range: DecorationKind::with_usage(
            "Samples.RangeAttribute",
            UsagePolicy::new(DecorationTargets::PARAMETER | DecorationTargets::RETURN_VALUE),
        ),
    }
}

struct Pair {
    base: NativeType,
    derived: NativeType,
}

/// Defines `Base` and `Derived` in its own assembly, decorated only if `kinds` is given
fn define(universe: &Arc<TypeUniverse>, namespace: &str, kinds: Option<&Kinds>) -> Result<Pair> {
    let assembly = universe.define_assembly(namespace)?;
    let int = universe.primitive(PrimitiveKind::Int32);
    let string = universe.primitive(PrimitiveKind::String);

    let mut base = TypeBuilder::class("Base").namespace(namespace);
    let mut derived_builder = TypeBuilder::class("Derived").namespace(namespace);
    if let Some(kinds) = kinds {
        base = base.decorations([
            Decoration::new(&kinds.info).arg("base"),
            Decoration::new(&kinds.tag).arg("base"),
            Decoration::new(&kinds.local).arg("base"),
        ]);
        derived_builder = derived_builder.decorations([
            Decoration::new(&kinds.info).arg("derived"),
            Decoration::new(&kinds.tag).arg("derived"),
        ]);
    }
    let base = base.build(&assembly)?;
    let derived = derived_builder.base(&base).build(&assembly)?;

    for (ty, label) in [(&base, "base"), (&derived, "derived")] {
        let mut compute = MethodBuilder::new("Compute").virtual_method().returns(&int);
        let mut field = FieldBuilder::new(&format!("{label}Count"), &int);
        let mut name = PropertyBuilder::new("Name", &string).accessors(MethodFlags::VIRTUAL);
        match kinds {
            Some(kinds) => {
                compute = compute
                    .param_decorated("x", &int, [Decoration::new(&kinds.range).arg(0_i32).arg(10_i32)])
                    .param("y", &string)
                    .return_decoration(Decoration::new(&kinds.range).arg(label))
                    .decorations([
                        Decoration::new(&kinds.tag).arg(label),
                        Decoration::new(&kinds.local).arg(label),
                    ]);
                if label == "base" {
                    compute = compute.decoration(Decoration::new(&kinds.info).arg(label));
                }
                field = field.decoration(Decoration::new(&kinds.info).arg(label));
                name = name.decoration(Decoration::new(&kinds.info).arg(label));
            }
            None => compute = compute.param("x", &int).param("y", &string),
        }
        compute.build(ty)?;
        field.build(ty)?;
        name.build(ty)?;
    }

    Ok(Pair { base, derived })
}

fn multiset(decorations: Vec<Decoration>) -> Vec<String> {
    let mut rendered: Vec<String> = decorations.iter().map(ToString::to_string).collect();
    rendered.sort();
    rendered
}

/// Copy the reference's own decorations onto the mirror's corresponding members
fn copy_native(
    builder: &mut MetadataTableBuilder,
    reference: &NativeType,
    mirror: &NativeType,
) -> Result<()> {
    builder.add_type_decorations(mirror, reference.decorations(&KindFilter::Any, false))?;

    for method in reference.methods() {
        let arity = method.parameters().len();
        let target = find_method(mirror, method.name(), Some(arity))?;
        builder.add_member_decorations(
            &Member::Method(target.clone()),
            method.decorations(&KindFilter::Any, false),
        )?;
        for parameter in method.parameters() {
            builder.add_method_parameter_decorations(
                &target,
                parameter.position(),
                parameter.decorations(&KindFilter::Any, false),
            )?;
        }
        if let Some(returns) = method.return_parameter() {
            builder.add_method_parameter_decorations(
                &target,
                -1,
                returns.decorations(&KindFilter::Any, false),
            )?;
        }
    }

    for field in reference.fields() {
        builder.add_field_decorations(
            mirror,
            field.name(),
            field.decorations(&KindFilter::Any, false),
        )?;
    }
    for property in reference.properties() {
        builder.add_property_decorations(
            mirror,
            property.name(),
            property.decorations(&KindFilter::Any, false),
        )?;
    }
    Ok(())
}

fn assert_same<R, P>(reference: &R, projected: &P, what: &str)
where
    R: Decorated + ?Sized,
    P: Decorated + ?Sized,
{
    for inherit in [false, true] {
        assert_eq!(
            multiset(projected.decorations(&KindFilter::Any, inherit)),
            multiset(reference.decorations(&KindFilter::Any, inherit)),
            "{what} (inherit = {inherit})"
        );
    }
}

/// Every member of the projected mirror reports the reference's decorations
#[test]
fn test_projected_mirror_matches_reference() -> Result<()> {
    let kinds = kinds();
    let universe = TypeUniverse::new();
    let reference = define(&universe, "Reference", Some(&kinds))?;
    let mirror = define(&universe, "Mirror", None)?;

    let mut builder = MetadataTableBuilder::new();
    copy_native(&mut builder, &reference.base, &mirror.base)?;
    copy_native(&mut builder, &reference.derived, &mirror.derived)?;
    let context = ProjectionContext::new(builder.create_table());

    for (reference, mirror) in [
        (&reference.base, &mirror.base),
        (&reference.derived, &mirror.derived),
    ] {
        let projected = context.map_type(&mirror.rc());
        assert_same(reference, projected.as_ref(), reference.name());

        for method in reference.methods() {
            let target = find_method(projected.as_ref(), method.name(), Some(method.parameters().len()))?;
            assert_same(method.as_ref(), target.as_ref(), method.name());

            for (expected, actual) in method.parameters().iter().zip(target.parameters()) {
                assert_same(expected.as_ref(), actual.as_ref(), "parameter");
            }
            let expected = method.return_parameter();
            let actual = target.return_parameter();
            assert_eq!(expected.is_some(), actual.is_some());
            if let (Some(expected), Some(actual)) = (expected, actual) {
                assert_same(expected.as_ref(), actual.as_ref(), "return parameter");
            }
        }

        for field in reference.fields() {
            let target = find_field(projected.as_ref(), field.name())?;
            assert_same(field.as_ref(), target.as_ref(), field.name());
        }
        for property in reference.properties() {
            let target = find_property(projected.as_ref(), property.name())?;
            assert_same(property.as_ref(), target.as_ref(), property.name());
        }
    }
    Ok(())
}

/// The mirror itself stays undecorated; only its projection sees the table
#[test]
fn test_native_mirror_is_untouched() -> Result<()> {
    let kinds = kinds();
    let universe = TypeUniverse::new();
    let reference = define(&universe, "Reference", Some(&kinds))?;
    let mirror = define(&universe, "Mirror", None)?;

    let mut builder = MetadataTableBuilder::new();
    copy_native(&mut builder, &reference.derived, &mirror.derived)?;
    let table = builder.create_table();

    assert!(mirror.derived.decorations(&KindFilter::Any, true).is_empty());
    assert!(!table.type_decorations(&mirror.derived).is_empty());
    assert!(table.type_decorations(&reference.derived).is_empty());

    let context = ProjectionContext::new(table);
    let projected = context.map_type(&mirror.derived.rc());
    assert!(projected.is_defined(&kinds.info, false));
    assert!(!projected.is_defined(&kinds.local, true));
    Ok(())
}

/// Inherited single-use kinds resolve to the nearest declaration
#[test]
fn test_inherited_single_use_nearest_wins() -> Result<()> {
    let kinds = kinds();
    let universe = TypeUniverse::new();
    let reference = define(&universe, "Reference", Some(&kinds))?;

    let info = reference.derived.decorations(&KindFilter::from(&kinds.info), true);
    assert_eq!(info, vec![Decoration::new(&kinds.info).arg("derived")]);

    let tags = reference.derived.decorations(&KindFilter::from(&kinds.tag), true);
    assert_eq!(
        tags,
        vec![
            Decoration::new(&kinds.tag).arg("derived"),
            Decoration::new(&kinds.tag).arg("base")
        ]
    );

    let compute = find_method(&reference.derived, "Compute", Some(2))?;
    assert_eq!(
        compute.decorations(&KindFilter::from(&kinds.info), true),
        vec![Decoration::new(&kinds.info).arg("base")]
    );
    assert!(compute.decorations(&KindFilter::from(&kinds.info), false).is_empty());
    Ok(())
}
