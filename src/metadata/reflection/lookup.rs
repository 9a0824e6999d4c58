//! Lookup helpers over the reflection traits.

use crate::{
    metadata::reflection::{EventRc, FieldRc, MemberKind, MethodRc, PropertyRc, TypeInfo},
    Error, Result,
};

/// Name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// The topmost declaration of `method`'s virtual slot.
///
/// Walks [`crate::metadata::reflection::MethodInfo::parent_definition`] iteratively; returns
/// `method` itself if it overrides nothing.
#[must_use]
pub fn base_definition(method: &MethodRc) -> MethodRc {
    let mut current = method.clone();
    while let Some(parent) = current.parent_definition() {
        current = parent;
    }
    current
}

fn not_found(kind: MemberKind, name: &str, ty: &dyn TypeInfo) -> Error {
    Error::MemberNotFound {
        kind,
        name: name.to_string(),
        type_name: ty.full_name(),
    }
}

fn find_named<T>(
    candidates: Vec<T>,
    kind: MemberKind,
    name: &str,
    ty: &dyn TypeInfo,
    name_of: impl Fn(&T) -> &str,
) -> Result<T> {
    candidates
        .into_iter()
        .find(|candidate| name_of(candidate) == name)
        .ok_or_else(|| not_found(kind, name, ty))
}

/// Finds the field `name` declared on `ty`
///
/// # Errors
/// Returns [`Error::MemberNotFound`] if `ty` declares no such field.
pub fn find_field(ty: &dyn TypeInfo, name: &str) -> Result<FieldRc> {
    find_named(ty.fields(), MemberKind::Field, name, ty, |field| field.name())
}

/// Finds the property `name` declared on `ty`
///
/// # Errors
/// Returns [`Error::MemberNotFound`] if `ty` declares no such property.
pub fn find_property(ty: &dyn TypeInfo, name: &str) -> Result<PropertyRc> {
    find_named(ty.properties(), MemberKind::Property, name, ty, |property| {
        property.name()
    })
}

/// Finds the event `name` declared on `ty`
///
/// # Errors
/// Returns [`Error::MemberNotFound`] if `ty` declares no such event.
pub fn find_event(ty: &dyn TypeInfo, name: &str) -> Result<EventRc> {
    find_named(ty.events(), MemberKind::Event, name, ty, |event| event.name())
}

/// Finds the method (or, for [`CONSTRUCTOR_NAME`], the constructor) `name` declared on `ty`,
/// optionally restricted to overloads taking `arity` parameters
///
/// # Errors
/// Returns [`Error::MemberNotFound`] if nothing matches and [`Error::AmbiguousMatch`] if more
/// than one overload does.
pub fn find_method(ty: &dyn TypeInfo, name: &str, arity: Option<usize>) -> Result<MethodRc> {
    let (kind, candidates) = if name == CONSTRUCTOR_NAME {
        (MemberKind::Constructor, ty.constructors())
    } else {
        (MemberKind::Method, ty.methods())
    };

    let mut matches = candidates.into_iter().filter(|method| {
        method.name() == name && arity.map_or(true, |count| method.parameters().len() == count)
    });

    let Some(found) = matches.next() else {
        return Err(not_found(kind, name, ty));
    };
    if matches.next().is_some() {
        return Err(Error::AmbiguousMatch {
            name: name.to_string(),
            type_name: ty.full_name(),
        });
    }
    Ok(found)
}
