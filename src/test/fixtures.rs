//! Prebuilt type universes for unit tests.

use std::sync::Arc;

use crate::metadata::{
    decorations::{Decoration, DecorationKind},
    reflection::MethodFlags,
    typesystem::{
        EventBuilder, MethodBuilder, NativeAssembly, NativeMethod, NativeType, PrimitiveKind,
        PropertyBuilder, TypeBuilder, TypeUniverse,
    },
};

/// `Tests.Calculator` with two `Add` overloads, `Reset` and a `Total` property
pub(crate) struct Calculator {
    pub universe: Arc<TypeUniverse>,
    pub assembly: NativeAssembly,
    pub calc: NativeType,
    /// `int Add(int a, int b)`
    pub add: NativeMethod,
    /// `int Add(int a, int b, int c)`
    pub add3: NativeMethod,
    /// `void Reset()`, non-virtual
    pub reset: NativeMethod,
}

pub(crate) fn calculator() -> Calculator {
    let universe = TypeUniverse::new();
    let assembly = universe.define_assembly("Tests").unwrap();
    let int = universe.primitive(PrimitiveKind::Int32);

    let calc = TypeBuilder::class("Calculator")
        .namespace("Tests")
        .build(&assembly)
        .unwrap();
    let add = MethodBuilder::new("Add")
        .param("a", &int)
        .param("b", &int)
        .returns(&int)
        .build(&calc)
        .unwrap();
    let add3 = MethodBuilder::new("Add")
        .param("a", &int)
        .param("b", &int)
        .param("c", &int)
        .returns(&int)
        .build(&calc)
        .unwrap();
    let reset = MethodBuilder::new("Reset").build(&calc).unwrap();
    PropertyBuilder::new("Total", &int)
        .generate_getter(MethodFlags::empty())
        .build(&calc)
        .unwrap();

    Calculator {
        universe,
        assembly,
        calc,
        add,
        add3,
        reset,
    }
}

/// `Base <- Derived <- SubDerived`, each overriding `Run()`, `Value` and `Changed`.
///
/// `Base` carries a native `Tests.MarkerAttribute("native")`; the kind is single-use and
/// inherited.
pub(crate) struct Hierarchy {
    pub universe: Arc<TypeUniverse>,
    pub assembly: NativeAssembly,
    pub marker: DecorationKind,
    pub base: NativeType,
    pub derived: NativeType,
    pub sub_derived: NativeType,
    pub base_run: NativeMethod,
    pub derived_run: NativeMethod,
    pub sub_run: NativeMethod,
}

pub(crate) fn hierarchy() -> Hierarchy {
    let universe = TypeUniverse::new();
    let assembly = universe.define_assembly("Tests").unwrap();
    let int = universe.primitive(PrimitiveKind::Int32);
    let object = universe.primitive(PrimitiveKind::Object);
    let marker = DecorationKind::new("Tests.MarkerAttribute");

    let base = TypeBuilder::class("Base")
        .namespace("Tests")
        .decoration(Decoration::new(&marker).arg("native"))
        .build(&assembly)
        .unwrap();
    let derived = TypeBuilder::class("Derived")
        .namespace("Tests")
        .base(&base)
        .build(&assembly)
        .unwrap();
    let sub_derived = TypeBuilder::class("SubDerived")
        .namespace("Tests")
        .base(&derived)
        .build(&assembly)
        .unwrap();

    let base_run = MethodBuilder::new("Run").virtual_method().build(&base).unwrap();
    let derived_run = MethodBuilder::new("Run").virtual_method().build(&derived).unwrap();
    let sub_run = MethodBuilder::new("Run")
        .virtual_method()
        .build(&sub_derived)
        .unwrap();

    for ty in [&base, &derived, &sub_derived] {
        PropertyBuilder::new("Value", &int)
            .accessors(MethodFlags::VIRTUAL)
            .build(ty)
            .unwrap();
        EventBuilder::new("Changed", &object)
            .accessors(MethodFlags::VIRTUAL)
            .build(ty)
            .unwrap();
    }

    Hierarchy {
        universe,
        assembly,
        marker,
        base,
        derived,
        sub_derived,
        base_run,
        derived_run,
        sub_run,
    }
}
