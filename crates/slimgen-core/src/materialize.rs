//! Turning result rows into entity instances.

use std::any::type_name;

use crate::Result;
use crate::entity::Entity;
use crate::error::{Error, TypeError};
use crate::row::{Row, missing_column};
use crate::tracked::{ChangeTracking, Instance, TrackingOptions, create_instance};
use crate::value::Value;

/// Build an entity from a row, tracked when eligible.
///
/// Every property is read from the column of the same name. A tracked
/// instance is reset once populated, so a freshly read entity is clean.
#[allow(clippy::result_large_err)]
pub fn materialize<T: Entity + Default>(
    row: &Row,
    options: &TrackingOptions,
) -> Result<Instance<T>> {
    let mut instance = create_instance::<T>(None, options);

    for field in T::fields() {
        let value = row
            .get_by_name(field.name)
            .ok_or_else(|| missing_column(field.value_type.name(), field.name))?;
        instance.set_value(field.name, value.clone())?;
    }

    if let Some(tracked) = instance.as_tracked_mut() {
        tracked.reset_changes();
    }
    Ok(instance)
}

/// Materialize every row, stopping at the first failure.
#[allow(clippy::result_large_err)]
pub fn materialize_all<T: Entity + Default>(
    rows: &[Row],
    options: &TrackingOptions,
) -> Result<Vec<Instance<T>>> {
    let instances = rows
        .iter()
        .map(|row| materialize(row, options))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(entity = T::NAME, rows = instances.len(), "Materialized rows");
    Ok(instances)
}

/// Read the first column of a single-column result, such as the key row
/// returned by an INSERT (`SCOPE_IDENTITY()`, `OUTPUT INSERTED.[Id]` or
/// `SELECT 0`).
#[allow(clippy::result_large_err)]
pub fn materialize_scalar<P>(row: &Row) -> Result<P>
where
    P: TryFrom<Value, Error = Error>,
{
    let value = row.get(0).ok_or_else(|| {
        Error::Type(TypeError {
            expected: type_name::<P>(),
            actual: "row without columns".to_string(),
            column: None,
        })
    })?;

    P::try_from(value.clone()).map_err(|e| {
        let column_info = row.column_info();
        match column_info.names().first() {
            Some(name) if !name.is_empty() => e.in_column(name),
            _ => e,
        }
    })
}
