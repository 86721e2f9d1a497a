//! Entity shape reflection and property role classification.
//!
//! An [`EntityShape`] is the classified form of an entity's property list:
//! every property carries exactly one [`PropertyRole`], decided once when the
//! shape is built and cached per entity type for the life of the process.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::Result;
use crate::entity::Entity;
use crate::error::{ShapeError, ShapeErrorKind};
use crate::field::FieldInfo;

/// Role of a property within its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyRole {
    /// Key assigned by the store. Marked `Key`, or the implicit `Id`.
    GeneratedKey,
    /// Key whose value the caller supplies.
    ExplicitKey,
    /// Store-computed, never written.
    Computed,
    /// Plain data.
    Regular,
}

impl PropertyRole {
    pub const fn is_key(self) -> bool {
        matches!(self, PropertyRole::GeneratedKey | PropertyRole::ExplicitKey)
    }
}

/// The classified shape of an entity type.
#[derive(Debug, Clone)]
pub struct EntityShape {
    name: &'static str,
    table_name: String,
    fields: &'static [FieldInfo],
    roles: Vec<PropertyRole>,
}

impl EntityShape {
    /// Classify a property list.
    ///
    /// Keys are detected in a single pass over declaration order: `Key`
    /// marks a generated key, `ExplicitKey` a caller-supplied one, and a
    /// potential implicit key (`Id`) is taken as generated only while no
    /// key has been found yet.
    pub fn classify(
        name: &'static str,
        table_marker: Option<&str>,
        fields: &'static [FieldInfo],
    ) -> Result<Self> {
        if fields.is_empty() {
            return Err(ShapeError::new(
                ShapeErrorKind::NoProperties,
                name,
                format!("{} has no properties", name),
            )
            .into());
        }

        let table_name = match table_marker {
            Some(marker) => normalize_table_name(name, marker)?,
            None => format!("[{}s]", name),
        };

        let mut found_key = false;
        let roles = fields
            .iter()
            .map(|field| {
                if field.key {
                    found_key = true;
                    PropertyRole::GeneratedKey
                } else if field.explicit_key {
                    found_key = true;
                    PropertyRole::ExplicitKey
                } else if !found_key && field.is_potential_key() {
                    found_key = true;
                    PropertyRole::GeneratedKey
                } else if field.computed {
                    PropertyRole::Computed
                } else {
                    PropertyRole::Regular
                }
            })
            .collect();

        Ok(Self {
            name,
            table_name,
            fields,
            roles,
        })
    }

    /// The cached shape of an entity type, classifying it on first use.
    pub fn of<T: Entity>() -> Result<Arc<EntityShape>> {
        let cache = SHAPES.get_or_init(|| RwLock::new(HashMap::new()));
        let id = TypeId::of::<T>();

        if let Some(shape) = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(shape));
        }

        let shape = Arc::new(Self::classify(T::NAME, T::TABLE_NAME, T::fields())?);
        let mut shapes = cache.write().unwrap_or_else(PoisonError::into_inner);
        let shape = shapes.entry(id).or_insert_with(|| {
            tracing::debug!(
                entity = T::NAME,
                table = %shape.table_name,
                properties = shape.fields.len(),
                keys = shape.keys().len(),
                "Classified entity shape"
            );
            shape
        });
        Ok(Arc::clone(shape))
    }

    /// Entity type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bracket-quoted table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All properties in declaration order.
    pub fn fields(&self) -> &'static [FieldInfo] {
        self.fields
    }

    /// Properties paired with their roles, in declaration order.
    pub fn roles(&self) -> impl Iterator<Item = (&'static FieldInfo, PropertyRole)> + '_ {
        self.fields.iter().zip(self.roles.iter().copied())
    }

    /// Role of the named property.
    pub fn role_of(&self, property: &str) -> Option<PropertyRole> {
        self.roles()
            .find(|(field, _)| field.name == property)
            .map(|(_, role)| role)
    }

    /// Generated and explicit keys.
    pub fn keys(&self) -> Vec<&'static FieldInfo> {
        self.select(PropertyRole::is_key)
    }

    pub fn generated_keys(&self) -> Vec<&'static FieldInfo> {
        self.select(|role| role == PropertyRole::GeneratedKey)
    }

    /// Non-generated properties carrying the `Computed` marker. An explicit
    /// key may also be computed.
    pub fn computed(&self) -> Vec<&'static FieldInfo> {
        self.roles()
            .filter(|(field, role)| *role != PropertyRole::GeneratedKey && field.computed)
            .map(|(field, _)| field)
            .collect()
    }

    /// Every property that is not a generated key. Explicit keys are included.
    pub fn non_keys(&self) -> Vec<&'static FieldInfo> {
        self.select(|role| role != PropertyRole::GeneratedKey)
    }

    fn select(&self, pred: impl Fn(PropertyRole) -> bool) -> Vec<&'static FieldInfo> {
        self.roles()
            .filter(|(_, role)| pred(*role))
            .map(|(field, _)| field)
            .collect()
    }
}

static SHAPES: OnceLock<RwLock<HashMap<TypeId, Arc<EntityShape>>>> = OnceLock::new();

fn normalize_table_name(entity: &'static str, marker: &str) -> Result<String> {
    let trimmed = marker.trim();
    if trimmed.chars().count() < 2 {
        return Err(ShapeError::new(
            ShapeErrorKind::InvalidTableName,
            entity,
            format!(
                "Table name '{}' must be at least 2 non-blank characters",
                marker
            ),
        )
        .into());
    }
    if trimmed.starts_with('[') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("[{}]", trimmed))
    }
}
