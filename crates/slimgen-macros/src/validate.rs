//! Compile-time validation for the Entity derive macro.
//!
//! Every check pushes onto a shared error list so that all problems are
//! reported at once rather than failing on the first.

use std::collections::HashSet;

use proc_macro2::Span;
use syn::{Error, GenericArgument, PathArguments, Type};

use crate::parse::{EntityDef, FieldDef};

/// Validate a parsed entity definition.
pub fn validate_entity(entity: &EntityDef) -> Result<(), Error> {
    let mut errors = Vec::new();

    if let Some(table_name) = &entity.table_name {
        validate_table_name(table_name, entity.table_span, &mut errors);
    }
    validate_no_duplicate_properties(entity, &mut errors);

    for field in entity.properties() {
        validate_field(field, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let mut combined = errors.remove(0);
        for err in errors {
            combined.combine(err);
        }
        Err(combined)
    }
}

/// Table names must be at least two non-blank characters.
fn validate_table_name(table_name: &str, span: Span, errors: &mut Vec<Error>) {
    if table_name.trim().is_empty() {
        errors.push(Error::new(span, "table name cannot be empty or whitespace"));
    } else if table_name.trim().chars().count() < 2 {
        errors.push(Error::new(
            span,
            "table name must be at least 2 characters long",
        ));
    }
}

/// Validate that no two properties share a name.
fn validate_no_duplicate_properties(entity: &EntityDef, errors: &mut Vec<Error>) {
    let mut seen: HashSet<&str> = HashSet::new();

    for field in entity.properties() {
        if !seen.insert(&field.property) {
            errors.push(Error::new(
                field.name.span(),
                format!(
                    "duplicate property name '{}'; another field already maps to this name",
                    field.property
                ),
            ));
        }
    }
}

fn validate_field(field: &FieldDef, errors: &mut Vec<Error>) {
    if field.key && field.explicit_key {
        errors.push(Error::new(
            field.name.span(),
            "cannot use both #[slimgen(key)] and #[slimgen(explicit_key)] on the same field; \
             a key is either store-generated or supplied by the caller",
        ));
    }
    validate_type(&field.ty, field.name.span(), errors);
}

fn validate_type(ty: &Type, span: Span, errors: &mut Vec<Error>) {
    if is_nested_option(ty) {
        errors.push(Error::new(
            span,
            "nested Option<Option<T>> is ambiguous and not supported; \
             use a single Option<T> or a custom type",
        ));
    }

    if matches!(ty, Type::Reference(_) | Type::Ptr(_)) {
        errors.push(Error::new(
            span,
            "reference and pointer types are not supported; use owned types instead",
        ));
    }
}

/// Check if a type is Option<Option<T>> (nested Option).
fn is_nested_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(Type::Path(inner_path))) = args.args.first() {
                        if let Some(inner_seg) = inner_path.path.segments.last() {
                            return inner_seg.ident == "Option";
                        }
                    }
                }
            }
        }
    }
    false
}
