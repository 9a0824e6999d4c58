//! Structural type references inside a [`TypeUniverse`].
//!
//! A [`TypeShape`] either names an arena entry (a definition or a formal generic parameter) or
//! describes a generic instantiation. Instantiations are values, not arena entries, so
//! substituting generic arguments into member signatures never mutates the universe.

use std::sync::Arc;

use crate::metadata::{
    reflection::{GenericOwner, GenericPosition},
    typesystem::TypeUniverse,
};

/// A reference to a type within one universe
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// A type definition or formal generic parameter, by arena index
    Definition(usize),
    /// A generic definition instantiated with arguments
    Instance {
        /// Arena index of the generic type definition
        definition: usize,
        /// The generic arguments
        args: Arc<[TypeShape]>,
    },
}

impl TypeShape {
    /// Arena index of the underlying definition
    #[must_use]
    pub fn definition(&self) -> usize {
        match self {
            TypeShape::Definition(index) => *index,
            TypeShape::Instance { definition, .. } => *definition,
        }
    }

    /// Generic arguments of an instantiation; empty for definitions
    #[must_use]
    pub fn args(&self) -> &[TypeShape] {
        match self {
            TypeShape::Definition(_) => &[],
            TypeShape::Instance { args, .. } => args,
        }
    }

    /// Replace formal generic parameters by `type_args` / `method_args`.
    ///
    /// Parameters whose position is outside the supplied argument list are left untouched, so
    /// substituting with empty lists yields the open form.
    #[must_use]
    pub fn substitute(
        &self,
        universe: &TypeUniverse,
        type_args: &[TypeShape],
        method_args: &[TypeShape],
    ) -> TypeShape {
        if type_args.is_empty() && method_args.is_empty() {
            return self.clone();
        }

        match self {
            TypeShape::Definition(index) => match universe.type_entry(*index).generic {
                Some(GenericPosition {
                    owner: GenericOwner::Type,
                    index,
                }) => type_args
                    .get(usize::from(index))
                    .cloned()
                    .unwrap_or_else(|| self.clone()),
                Some(GenericPosition {
                    owner: GenericOwner::Method,
                    index,
                }) => method_args
                    .get(usize::from(index))
                    .cloned()
                    .unwrap_or_else(|| self.clone()),
                None => self.clone(),
            },
            TypeShape::Instance { definition, args } => TypeShape::Instance {
                definition: *definition,
                args: args
                    .iter()
                    .map(|arg| arg.substitute(universe, type_args, method_args))
                    .collect(),
            },
        }
    }

    /// Signature equivalence: identical shapes, where method-level generic parameters match by
    /// position regardless of which method declares them
    #[must_use]
    pub fn matches(&self, other: &TypeShape, universe: &TypeUniverse) -> bool {
        match (self, other) {
            (TypeShape::Definition(left), TypeShape::Definition(right)) => {
                if left == right {
                    return true;
                }
                match (
                    universe.type_entry(*left).generic,
                    universe.type_entry(*right).generic,
                ) {
                    (Some(left), Some(right)) => {
                        left.owner == GenericOwner::Method && left == right
                    }
                    _ => false,
                }
            }
            (
                TypeShape::Instance {
                    definition: left,
                    args: left_args,
                },
                TypeShape::Instance {
                    definition: right,
                    args: right_args,
                },
            ) => {
                left == right
                    && left_args.len() == right_args.len()
                    && left_args
                        .iter()
                        .zip(right_args.iter())
                        .all(|(left, right)| left.matches(right, universe))
            }
            _ => false,
        }
    }

    /// Display name: `Namespace.Name` for definitions, `Definition[Arg,Arg]` for instantiations
    #[must_use]
    pub fn full_name(&self, universe: &TypeUniverse) -> String {
        match self {
            TypeShape::Definition(index) => universe.definition_full_name(*index),
            TypeShape::Instance { definition, args } => {
                let args: Vec<String> = args.iter().map(|arg| arg.full_name(universe)).collect();
                format!(
                    "{}[{}]",
                    universe.definition_full_name(*definition),
                    args.join(",")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{PrimitiveKind, TypeBuilder};

    #[test]
    fn test_substitute_type_parameter() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let list = TypeBuilder::class("List`1")
            .namespace("Tests")
            .generic_params(["T"])
            .build(&assembly)
            .unwrap();

        let param = list.generic_parameter(0).unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);

        let substituted =
            param
                .shape()
                .substitute(&universe, std::slice::from_ref(int.shape()), &[]);
        assert_eq!(&substituted, int.shape());

        let untouched = param.shape().substitute(&universe, &[], &[]);
        assert_eq!(&untouched, param.shape());
    }

    #[test]
    fn test_instance_full_name() {
        let universe = TypeUniverse::new();
        let assembly = universe.define_assembly("Tests").unwrap();
        let list = TypeBuilder::class("List`1")
            .namespace("Tests")
            .generic_params(["T"])
            .build(&assembly)
            .unwrap();
        let int = universe.primitive(PrimitiveKind::Int32);

        let closed = list.instantiate(&[int]).unwrap();
        assert_eq!(closed.shape().full_name(&universe), "Tests.List`1[System.Int32]");
    }
}
