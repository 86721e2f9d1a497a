//! Entity trait for types that map onto a single table.
//!
//! The `Entity` trait is the reflection contract the rest of the crate works
//! against: the ordered property list, the type-level markers, and by-name
//! property access. It is typically derived using `#[derive(Entity)]` from
//! `slimgen-macros`.

use crate::Result;
use crate::field::FieldInfo;
use crate::value::Value;

/// Trait for types whose properties can be reflected, read and written by name.
///
/// # Example
///
/// ```ignore
/// use slimgen::Entity;
///
/// #[derive(Entity, Default)]
/// #[slimgen(table = "Heroes")]
/// struct Hero {
///     id: i32,
///     name: String,
///     secret_name: String,
///     age: Option<i32>,
/// }
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    /// The type name, used for the default table name and in errors.
    const NAME: &'static str;

    /// Explicit table-name marker, if any.
    ///
    /// Untracked by default: only types with a marker are wrapped by the
    /// instance factory.
    const TABLE_NAME: Option<&'static str> = None;

    /// Sealed types are never wrapped in a change-tracking surrogate.
    const SEALED: bool = false;

    /// Property metadata in declaration order.
    fn fields() -> &'static [FieldInfo];

    /// Read a property by name. `None` if no such property exists.
    fn get_value(&self, property: &str) -> Option<Value>;

    /// Write a property by name.
    ///
    /// Fails with `UnknownProperty` for a name the entity does not declare,
    /// or with a `Type` error naming the property when the value does not
    /// convert to its declared type.
    #[allow(clippy::result_large_err)]
    fn set_value(&mut self, property: &str, value: Value) -> Result<()>;

    /// All property values in declaration order.
    fn to_row(&self) -> Vec<(&'static str, Value)> {
        Self::fields()
            .iter()
            .map(|f| (f.name, self.get_value(f.name).unwrap_or(Value::Null)))
            .collect()
    }
}
