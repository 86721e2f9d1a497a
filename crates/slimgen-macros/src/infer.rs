//! Value type inference from Rust types.
//!
//! This module maps the Rust type of an entity field to the `ValueType`
//! variant that describes it in the generated metadata.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{GenericArgument, PathArguments, Type};

/// Infer the value type from a Rust type, returning a TokenStream that
/// constructs the appropriate `ValueType` variant.
///
/// `Option<T>` unwraps to `T`. Unrecognized types become
/// `ValueType::Other("<type>")`, which has no SQL Server mapping.
pub fn infer_value_type(ty: &Type) -> TokenStream {
    let inner_ty = unwrap_option_type(ty);
    let type_str = type_to_string(inner_ty);

    match known_variant(&type_str) {
        Some(variant) => {
            let variant = format_ident!("{}", variant);
            quote! { slimgen_core::ValueType::#variant }
        }
        None => quote! { slimgen_core::ValueType::Other(#type_str) },
    }
}

/// The `ValueType` variant name for a known type, if any.
fn known_variant(type_str: &str) -> Option<&'static str> {
    let variant = match type_str {
        "bool" => "Bool",

        "u8" => "U8",
        "i16" => "I16",
        "i32" => "I32",
        "i64" => "I64",

        "f32" => "F32",
        "f64" => "F64",

        "Decimal" | "rust_decimal::Decimal" => "Decimal",

        "char" => "Char",
        "String" | "std::string::String" => "String",

        "Vec<u8>" => "Bytes",

        "Uuid" | "uuid::Uuid" => "Uuid",

        "NaiveTime" | "chrono::NaiveTime" => "Time",
        "NaiveDateTime" | "chrono::NaiveDateTime" | "DateTime<Utc>" | "chrono::DateTime<Utc>"
        | "DateTime<chrono::Utc>" | "chrono::DateTime<chrono::Utc>" => "DateTime",

        "serde_json::Value" | "JsonValue" => "Json",

        _ => return None,
    };
    Some(variant)
}

/// Unwrap Option<T> to get the inner type, or return the original type.
fn unwrap_option_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

/// Convert a Type to a simplified string representation for matching.
fn type_to_string(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}
