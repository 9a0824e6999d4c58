//! Chaining projection contexts.

use decorscope::prelude::*;

struct Setup {
    info: DecorationKind,
    tag: DecorationKind,
    native: DecorationKind,
    base: NativeType,
    widget: NativeType,
}

fn setup() -> Result<Setup> {
    let universe = TypeUniverse::new();
    let assembly = universe.define_assembly("Samples")?;
    let info = DecorationKind::new("Samples.InfoAttribute");
    let tag = DecorationKind::with_usage(
        "Samples.TagAttribute",
        UsagePolicy::new(DecorationTargets::ALL).allow_multiple(true),
    );
    let native = DecorationKind::new("Samples.NativeAttribute");

    let base = TypeBuilder::class("Control")
        .namespace("Samples")
        .build(&assembly)?;
    let widget = TypeBuilder::class("Widget")
        .namespace("Samples")
        .base(&base)
        .decoration(Decoration::new(&native).arg("widget"))
        .build(&assembly)?;

    Ok(Setup {
        info,
        tag,
        native,
        base,
        widget,
    })
}

fn context(setup: &Setup, label: &str) -> Result<ProjectionContext> {
    let mut builder = MetadataTableBuilder::new();
    builder.add_type_decorations(
        &setup.widget,
        [
            Decoration::new(&setup.tag).arg(label),
            Decoration::new(&setup.info).arg(label),
        ],
    )?;
    builder.add_type_decorations(&setup.base, [Decoration::new(&setup.tag).arg(format!("{label}-base"))])?;
    Ok(ProjectionContext::new(builder.create_table()))
}

/// The outer context sees both tables plus native decorations, deduplicated per usage policy
#[test]
fn test_chained_contexts_union_tables() -> Result<()> {
    let setup = setup()?;
    let first = context(&setup, "first")?;
    let second = context(&setup, "second")?;

    let inner = first.map_type(&setup.widget.rc());
    let outer = second.map_type(&inner);

    assert_eq!(
        outer.decorations(&KindFilter::Any, false),
        vec![
            Decoration::new(&setup.tag).arg("second"),
            Decoration::new(&setup.info).arg("second"),
            Decoration::new(&setup.tag).arg("first"),
            Decoration::new(&setup.native).arg("widget"),
        ]
    );

    let tags = outer.decorations(&KindFilter::from(&setup.tag), true);
    assert_eq!(
        tags,
        vec![
            Decoration::new(&setup.tag).arg("second"),
            Decoration::new(&setup.tag).arg("first"),
            Decoration::new(&setup.tag).arg("second-base"),
            Decoration::new(&setup.tag).arg("first-base"),
        ]
    );
    Ok(())
}

/// A chained wrapper belongs to both contexts and is not wrapped again by either
#[test]
fn test_chained_identity() -> Result<()> {
    let setup = setup()?;
    let first = context(&setup, "first")?;
    let second = context(&setup, "second")?;

    let outer = second.map_type(&first.map_type(&setup.widget.rc()));
    assert!(outer.is_projected_by(first.id()));
    assert!(outer.is_projected_by(second.id()));
    assert!(!setup.widget.is_projected_by(first.id()));

    let again = first.map_type(&outer);
    assert!(std::sync::Arc::ptr_eq(&again, &outer));
    assert_eq!(
        again.decorations(&KindFilter::Any, true),
        outer.decorations(&KindFilter::Any, true)
    );

    let base = outer.base_type().ok_or(Error::TypeNotFound("Control".to_string()))?;
    assert!(base.is_projected_by(first.id()));
    assert!(base.is_projected_by(second.id()));
    Ok(())
}

/// Chaining with an empty table leaves the inner view unchanged
#[test]
fn test_empty_outer_context_is_transparent() -> Result<()> {
    let setup = setup()?;
    let first = context(&setup, "first")?;
    let empty = ProjectionContext::new(MetadataTable::empty());

    let inner = first.map_type(&setup.widget.rc());
    let outer = empty.map_type(&inner);
    for inherit in [false, true] {
        assert_eq!(
            outer.decorations(&KindFilter::Any, inherit),
            inner.decorations(&KindFilter::Any, inherit)
        );
    }
    Ok(())
}
