//! CRUD statement generation for SQL Server.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use slimgen_core::{
    Entity, EntityShape, EntitySource, FieldInfo, Result, ShapeError, ShapeErrorKind, ValueType,
};

/// Builds parameterized CRUD statements for one entity type.
///
/// Statements reference values as `@Property` placeholders; binding them is
/// up to the caller.
pub trait SqlGenerator<T: Entity> {
    /// `INSERT` for the entity's dirty fields, returning the generated key.
    ///
    /// With no entity, every writable column is included.
    fn insert_sql(&self, entity: Option<&dyn EntitySource<T>>) -> Result<String>;

    /// `SELECT` of every property, optionally limited to `max_rows` rows.
    fn select_sql(&self, max_rows: Option<u32>) -> String;

    /// `UPDATE` of the entity's dirty fields, matched on all keys.
    fn update_sql(&self, entity: Option<&dyn EntitySource<T>>) -> String;

    /// `DELETE` matched on all keys.
    fn delete_sql(&self) -> Result<String>;

    /// The properties an INSERT (`for_create`) or UPDATE would write.
    fn dirty_fields(
        &self,
        entity: Option<&dyn EntitySource<T>>,
        for_create: bool,
    ) -> Vec<&'static FieldInfo>;

    /// Generated keys for INSERT, every key otherwise.
    fn keys(&self, for_create: bool) -> Vec<&'static FieldInfo>;
}

/// SQL Server implementation of [`SqlGenerator`].
///
/// Built once per entity type from its cached shape; immutable afterwards
/// and safe to share across threads.
///
/// # Example
///
/// ```ignore
/// let generator = MssqlGenerator::<Hero>::new()?;
/// assert_eq!(
///     generator.select_sql(Some(10)),
///     "SELECT TOP (10) [Id], [Name], [Age] FROM [Heroes]"
/// );
/// ```
#[derive(Debug)]
pub struct MssqlGenerator<T> {
    shape: Arc<EntityShape>,
    all_keys: Vec<&'static FieldInfo>,
    generated_keys: Vec<&'static FieldInfo>,
    computed: Vec<&'static FieldInfo>,
    non_keys: Vec<&'static FieldInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> MssqlGenerator<T> {
    /// Fails with `NoProperties` for an entity without properties.
    pub fn new() -> Result<Self> {
        let shape = EntityShape::of::<T>()?;
        Ok(Self {
            all_keys: shape.keys(),
            generated_keys: shape.generated_keys(),
            computed: shape.computed(),
            non_keys: shape.non_keys(),
            shape,
            _marker: PhantomData,
        })
    }

    /// The classified shape this generator was built from.
    pub fn shape(&self) -> &EntityShape {
        &self.shape
    }

    /// Bracket-quoted table name.
    pub fn table_name(&self) -> &str {
        self.shape.table_name()
    }

    fn keys_clause(&self) -> String {
        self.all_keys
            .iter()
            .map(|k| assignment(k.name))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn shape_error(&self, kind: ShapeErrorKind, message: String) -> slimgen_core::Error {
        ShapeError::new(kind, self.shape.name(), message).into()
    }
}

impl<T: Entity> SqlGenerator<T> for MssqlGenerator<T> {
    fn insert_sql(&self, entity: Option<&dyn EntitySource<T>>) -> Result<String> {
        let name = self.shape.name();
        if self.non_keys.is_empty() {
            return Err(self.shape_error(
                ShapeErrorKind::InvalidInsert,
                format!(
                    "Cannot generate an INSERT statement for {}: it does not have non-key properties",
                    name
                ),
            ));
        }
        if self.generated_keys.len() > 1 {
            return Err(self.shape_error(
                ShapeErrorKind::MultipleGeneratedKeys,
                format!(
                    "Cannot generate an INSERT statement for {}: it has multiple generated keys",
                    name
                ),
            ));
        }

        let key = self.generated_keys.first();
        let key_is_uuid = key.is_some_and(|k| k.value_type == ValueType::Uuid);
        let columns = self.dirty_fields(entity, true);

        let mut sql = format!(
            "INSERT INTO {} ({})",
            self.shape.table_name(),
            column_list(&columns)
        );
        if let (Some(key), true) = (key, key_is_uuid) {
            sql.push_str(&format!(" OUTPUT INSERTED.[{}]", key.name));
        }
        sql.push_str(&format!(" VALUES ({})", placeholder_list(&columns)));
        match key {
            Some(_) if !key_is_uuid => sql.push_str("; SELECT SCOPE_IDENTITY()"),
            Some(_) => {}
            // Callers always read back one scalar.
            None => sql.push_str("; SELECT 0"),
        }
        sql.push(';');

        tracing::debug!(entity = name, columns = columns.len(), "Generated INSERT");
        Ok(sql)
    }

    fn select_sql(&self, max_rows: Option<u32>) -> String {
        let top = max_rows.map(|n| format!("TOP ({n}) ")).unwrap_or_default();
        let columns: Vec<&FieldInfo> = self.shape.fields().iter().collect();
        format!(
            "SELECT {}{} FROM {}",
            top,
            column_list(&columns),
            self.shape.table_name()
        )
    }

    fn update_sql(&self, entity: Option<&dyn EntitySource<T>>) -> String {
        let generated: HashSet<&str> = self.generated_keys.iter().map(|k| k.name).collect();
        let assignments: Vec<String> = self
            .dirty_fields(entity, false)
            .into_iter()
            .filter(|f| !generated.contains(f.name))
            .map(|f| assignment(f.name))
            .collect();

        tracing::debug!(
            entity = self.shape.name(),
            columns = assignments.len(),
            "Generated UPDATE"
        );
        format!(
            "UPDATE {} SET {} WHERE {};",
            self.shape.table_name(),
            assignments.join(", "),
            self.keys_clause()
        )
    }

    fn delete_sql(&self) -> Result<String> {
        if self.all_keys.is_empty() {
            return Err(self.shape_error(
                ShapeErrorKind::NoKeys,
                format!(
                    "Cannot find a key property for automatic DELETE generation on {}",
                    self.shape.name()
                ),
            ));
        }
        Ok(format!(
            "DELETE FROM {} WHERE {};",
            self.shape.table_name(),
            self.keys_clause()
        ))
    }

    fn dirty_fields(
        &self,
        entity: Option<&dyn EntitySource<T>>,
        for_create: bool,
    ) -> Vec<&'static FieldInfo> {
        let excluded: HashSet<&str> = self
            .keys(for_create)
            .into_iter()
            .chain(self.computed.iter().copied())
            .map(|f| f.name)
            .collect();

        match entity {
            Some(source) => {
                if let Some(tracking) = source.change_tracking() {
                    let dirty: HashSet<String> = tracking
                        .dirty_fields()
                        .into_iter()
                        .map(str::to_lowercase)
                        .collect();
                    return self
                        .non_keys
                        .iter()
                        .copied()
                        .filter(|f| dirty.contains(&f.name.to_lowercase()))
                        .collect();
                }

                let entity = source.entity();
                self.non_keys
                    .iter()
                    .copied()
                    .filter(|f| !excluded.contains(f.name))
                    .filter(|f| entity.get_value(f.name).is_some_and(|v| !v.is_null()))
                    .collect()
            }
            None => self
                .non_keys
                .iter()
                .copied()
                .filter(|f| !excluded.contains(f.name))
                .collect(),
        }
    }

    fn keys(&self, for_create: bool) -> Vec<&'static FieldInfo> {
        if for_create {
            self.generated_keys.clone()
        } else {
            self.all_keys.clone()
        }
    }
}

fn column_list(fields: &[&FieldInfo]) -> String {
    fields
        .iter()
        .map(|f| format!("[{}]", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholder_list(fields: &[&FieldInfo]) -> String {
    fields
        .iter()
        .map(|f| format!("@{}", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn assignment(name: &str) -> String {
    format!("[{}] = @{}", name, name)
}
