//! Procedural macros for SlimGen.
//!
//! `slimgen-macros` is the **compile-time reflection layer**. `#[derive(Entity)]`
//! turns a struct with named fields into an `Entity`: a static property list
//! with key and computed markers, plus by-name property access used for
//! change tracking, SQL generation and row materialization.
//!
//! The macro is used by application crates via the `slimgen` facade.

use proc_macro::TokenStream;
use syn::ext::IdentExt;

mod infer;
mod parse;
mod validate;

use parse::{EntityDef, parse_entity};

/// Derive macro for the `Entity` trait.
///
/// This macro generates:
/// - Type name, table-name marker and sealed flag
/// - Property metadata (`fields()`)
/// - By-name property access (`get_value`, `set_value`)
///
/// Property names are the PascalCase form of the field name, so `secret_name`
/// becomes `SecretName` and `id` becomes the conventional `Id`.
///
/// # Attributes
///
/// - `#[slimgen(table = "Name")]` - Table-name marker; only marked types are change-tracked
/// - `#[slimgen(sealed)]` - Never wrap this type in a change-tracking surrogate
/// - `#[slimgen(key)]` - Store-generated key
/// - `#[slimgen(explicit_key)]` - Key supplied by the caller
/// - `#[slimgen(computed)]` - Store-computed, never written
/// - `#[slimgen(column = "Name")]` - Override the property name
/// - `#[slimgen(skip)]` - Not an entity property
///
/// # Example
///
/// ```ignore
/// use slimgen::Entity;
///
/// #[derive(Entity, Default)]
/// #[slimgen(table = "Heroes")]
/// struct Hero {
///     #[slimgen(key)]
///     id: i32,
///
///     name: String,
///
///     secret_name: String,
///
///     age: Option<i32>,
///
///     #[slimgen(computed)]
///     power_level: f64,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(slimgen))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let entity = match parse_entity(&input) {
        Ok(e) => e,
        Err(e) => return e.to_compile_error().into(),
    };

    if let Err(e) = validate::validate_entity(&entity) {
        return e.to_compile_error().into();
    }

    generate_entity_impl(&entity).into()
}

/// Generate the Entity trait implementation from a parsed definition.
fn generate_entity_impl(entity: &EntityDef) -> proc_macro2::TokenStream {
    let name = &entity.name;
    let name_str = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = entity.generics.split_for_impl();

    let table_name_ts = match &entity.table_name {
        Some(table) => quote::quote! { Some(#table) },
        None => quote::quote! { None },
    };
    let sealed = entity.sealed;

    let field_infos = generate_field_infos(entity);
    let get_value_body = generate_get_value(entity);
    let set_value_body = generate_set_value(entity, &name_str);

    quote::quote! {
        impl #impl_generics slimgen_core::Entity for #name #ty_generics #where_clause {
            const NAME: &'static str = #name_str;
            const TABLE_NAME: Option<&'static str> = #table_name_ts;
            const SEALED: bool = #sealed;

            fn fields() -> &'static [slimgen_core::FieldInfo] {
                static FIELDS: &[slimgen_core::FieldInfo] = &[
                    #field_infos
                ];
                FIELDS
            }

            fn get_value(&self, property: &str) -> Option<slimgen_core::Value> {
                #get_value_body
            }

            #[allow(unused_variables)]
            fn set_value(
                &mut self,
                property: &str,
                value: slimgen_core::Value,
            ) -> slimgen_core::Result<()> {
                #set_value_body
            }
        }
    }
}

/// Generate the static FieldInfo array contents.
fn generate_field_infos(entity: &EntityDef) -> proc_macro2::TokenStream {
    let field_ts: Vec<_> = entity
        .properties()
        .map(|field| {
            let property = &field.property;
            let value_type = infer::infer_value_type(&field.ty);
            let nullable = field.nullable;
            let key = field.key;
            let explicit_key = field.explicit_key;
            let computed = field.computed;

            quote::quote! {
                slimgen_core::FieldInfo::new(#property, #value_type)
                    .nullable(#nullable)
                    .key(#key)
                    .explicit_key(#explicit_key)
                    .computed(#computed)
            }
        })
        .collect();

    quote::quote! { #(#field_ts),* }
}

fn generate_get_value(entity: &EntityDef) -> proc_macro2::TokenStream {
    let arms: Vec<_> = entity
        .properties()
        .map(|field| {
            let field_name = &field.name;
            let property = &field.property;
            quote::quote! {
                #property => Some(slimgen_core::Value::from(
                    ::core::clone::Clone::clone(&self.#field_name)
                )),
            }
        })
        .collect();

    quote::quote! {
        match property {
            #(#arms)*
            _ => None,
        }
    }
}

/// Each arm converts the value to the field's type and names the property
/// in any conversion error.
fn generate_set_value(entity: &EntityDef, name_str: &str) -> proc_macro2::TokenStream {
    let arms: Vec<_> = entity
        .properties()
        .map(|field| {
            let field_name = &field.name;
            let property = &field.property;
            quote::quote! {
                #property => {
                    self.#field_name = ::core::convert::TryFrom::try_from(value)
                        .map_err(|e: slimgen_core::Error| e.in_column(#property))?;
                    Ok(())
                }
            }
        })
        .collect();

    quote::quote! {
        match property {
            #(#arms)*
            _ => Err(slimgen_core::Error::UnknownProperty {
                entity: #name_str,
                property: property.to_string(),
            }),
        }
    }
}
