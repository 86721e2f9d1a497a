//! Parsing logic for the Entity derive macro.
//!
//! This module extracts struct-level and field-level `#[slimgen(...)]`
//! attributes from the derive input to build `EntityDef` and `FieldDef`
//! structures used for code generation.

use proc_macro2::Span;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Generics, Ident, Lit, Result, Type};

/// Parsed entity definition from a struct with `#[derive(Entity)]`.
#[derive(Debug)]
pub struct EntityDef {
    /// The struct name (e.g., `Hero`).
    pub name: Ident,
    /// Table-name marker from `#[slimgen(table = "...")]`, as written.
    pub table_name: Option<String>,
    /// Span of the table-name literal, for error reporting.
    pub table_span: Span,
    /// `#[slimgen(sealed)]`: never wrapped in a change-tracking surrogate.
    pub sealed: bool,
    /// Parsed field definitions, skipped fields included.
    pub fields: Vec<FieldDef>,
    /// Generic parameters from the struct.
    pub generics: Generics,
}

impl EntityDef {
    /// Fields that are entity properties, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.skip)
    }
}

/// Parsed field definition from a struct field.
#[derive(Debug)]
pub struct FieldDef {
    /// The Rust field name (e.g., `secret_name`).
    pub name: Ident,
    /// The property name (e.g., `"SecretName"` or a `column` override).
    pub property: String,
    /// The Rust type of the field.
    pub ty: Type,
    /// Whether the field is an `Option<T>`.
    pub nullable: bool,
    pub key: bool,
    pub explicit_key: bool,
    pub computed: bool,
    /// Not an entity property at all.
    pub skip: bool,
}

/// Parse a derive input into an `EntityDef`.
pub fn parse_entity(input: &DeriveInput) -> Result<EntityDef> {
    let name = input.ident.clone();
    let generics = input.generics.clone();

    let StructAttrs {
        table_name,
        table_span,
        sealed,
    } = parse_struct_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => parse_fields(&data.fields)?,
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not unions",
            ));
        }
    };

    Ok(EntityDef {
        name,
        table_name,
        table_span,
        sealed,
        fields,
        generics,
    })
}

struct StructAttrs {
    table_name: Option<String>,
    table_span: Span,
    sealed: bool,
}

/// Parse struct-level `#[slimgen(...)]` attributes.
///
/// Supported keys:
/// - `table = "name"` (table-name marker)
/// - `sealed`
fn parse_struct_attrs(attrs: &[Attribute]) -> Result<StructAttrs> {
    let mut result = StructAttrs {
        table_name: None,
        table_span: Span::call_site(),
        sealed: false,
    };

    for attr in attrs {
        if !attr.path().is_ident("slimgen") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                if result.table_name.is_some() {
                    return Err(Error::new_spanned(
                        meta.path,
                        "duplicate slimgen attribute: table",
                    ));
                }
                let value: Lit = meta.value()?.parse()?;
                if let Lit::Str(lit_str) = value {
                    result.table_span = lit_str.span();
                    result.table_name = Some(lit_str.value());
                    Ok(())
                } else {
                    Err(Error::new_spanned(
                        value,
                        "expected string literal for table name",
                    ))
                }
            } else if meta.path.is_ident("sealed") {
                result.sealed = true;
                Ok(())
            } else {
                Err(meta.error("unknown slimgen struct attribute; expected `table` or `sealed`"))
            }
        })?;
    }

    Ok(result)
}

fn parse_fields(fields: &Fields) -> Result<Vec<FieldDef>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(parse_field).collect(),
        Fields::Unnamed(_) => Err(Error::new(
            Span::call_site(),
            "Entity requires a struct with named fields, not a tuple struct",
        )),
        Fields::Unit => Err(Error::new(
            Span::call_site(),
            "Entity requires a struct with named fields, not a unit struct",
        )),
    }
}

/// Parse a single field and its attributes.
fn parse_field(field: &Field) -> Result<FieldDef> {
    let name = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;

    let ty = field.ty.clone();
    let attrs = parse_field_attrs(&field.attrs)?;

    let property = attrs
        .column
        .unwrap_or_else(|| to_pascal_case(&name.to_string()));

    Ok(FieldDef {
        name,
        property,
        nullable: is_option_type(&ty),
        ty,
        key: attrs.key,
        explicit_key: attrs.explicit_key,
        computed: attrs.computed,
        skip: attrs.skip,
    })
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    key: bool,
    explicit_key: bool,
    computed: bool,
    skip: bool,
}

fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("slimgen") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("key") {
                result.key = true;
            } else if path.is_ident("explicit_key") {
                result.explicit_key = true;
            } else if path.is_ident("computed") {
                result.computed = true;
            } else if path.is_ident("skip") {
                result.skip = true;
            } else if path.is_ident("column") {
                let value: Lit = meta.value()?.parse()?;
                if let Lit::Str(lit_str) = value {
                    if lit_str.value().trim().is_empty() {
                        return Err(Error::new_spanned(lit_str, "column name cannot be empty"));
                    }
                    result.column = Some(lit_str.value());
                } else {
                    return Err(Error::new_spanned(
                        value,
                        "expected string literal for column name",
                    ));
                }
            } else {
                return Err(meta.error(
                    "unknown slimgen field attribute; expected one of \
                     `key`, `explicit_key`, `computed`, `column`, `skip`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Convert snake_case to PascalCase.
///
/// Examples:
/// - `id` -> `Id`
/// - `secret_name` -> `SecretName`
/// - `r#type` -> `Type`
fn to_pascal_case(s: &str) -> String {
    let s = s.strip_prefix("r#").unwrap_or(s);
    let mut result = String::with_capacity(s.len());
    let mut upper_next = true;

    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

pub fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
