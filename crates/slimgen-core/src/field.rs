//! Property metadata and markers.

use crate::Result;
use crate::types::{SqlType, ValueType};

/// Name an `Id` property must have to be picked up as an implicit key.
pub const IMPLICIT_KEY_NAME: &str = "Id";

/// Attribute-like tag a property may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Store-generated key (identity column or server-assigned UUID).
    Key,
    /// Key whose value the caller supplies.
    ExplicitKey,
    /// Value computed by the store; never written.
    Computed,
}

impl Marker {
    const fn bit(self) -> u8 {
        match self {
            Marker::Key => 0b001,
            Marker::ExplicitKey => 0b010,
            Marker::Computed => 0b100,
        }
    }
}

/// A small set of [`Marker`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MarkerSet(u8);

impl MarkerSet {
    /// No markers.
    pub const EMPTY: MarkerSet = MarkerSet(0);

    /// Every marker. The default set of special markers for change tracking.
    pub const ALL: MarkerSet = MarkerSet(0b111);

    /// Add a marker to the set.
    pub const fn with(self, marker: Marker) -> Self {
        MarkerSet(self.0 | marker.bit())
    }

    /// Remove a marker from the set.
    pub const fn without(self, marker: Marker) -> Self {
        MarkerSet(self.0 & !marker.bit())
    }

    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    /// Whether the two sets share at least one marker.
    pub const fn intersects(self, other: MarkerSet) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        iter.into_iter().fold(MarkerSet::EMPTY, MarkerSet::with)
    }
}

/// Metadata about one entity property.
///
/// Built by `#[derive(Entity)]`, or by hand with the const builder methods:
///
/// ```
/// use slimgen_core::{FieldInfo, ValueType};
///
/// const FIELDS: &[FieldInfo] = &[
///     FieldInfo::new("Id", ValueType::I32).key(true),
///     FieldInfo::new("Name", ValueType::String),
///     FieldInfo::new("Age", ValueType::I32).nullable(true),
/// ];
/// assert!(FIELDS[0].key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Property (and column) name
    pub name: &'static str,
    /// Declared value type
    pub value_type: ValueType,
    /// Whether the property may hold NULL
    pub nullable: bool,
    /// Carries the `Key` marker
    pub key: bool,
    /// Carries the `ExplicitKey` marker
    pub explicit_key: bool,
    /// Carries the `Computed` marker
    pub computed: bool,
}

impl FieldInfo {
    /// Create a new unmarked, non-nullable property.
    pub const fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            nullable: false,
            key: false,
            explicit_key: false,
            computed: false,
        }
    }

    /// Set nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set the `Key` marker.
    pub const fn key(mut self, value: bool) -> Self {
        self.key = value;
        self
    }

    /// Set the `ExplicitKey` marker.
    pub const fn explicit_key(mut self, value: bool) -> Self {
        self.explicit_key = value;
        self
    }

    /// Set the `Computed` marker.
    pub const fn computed(mut self, value: bool) -> Self {
        self.computed = value;
        self
    }

    pub const fn has_marker(&self, marker: Marker) -> bool {
        match marker {
            Marker::Key => self.key,
            Marker::ExplicitKey => self.explicit_key,
            Marker::Computed => self.computed,
        }
    }

    /// All markers this property carries.
    pub const fn markers(&self) -> MarkerSet {
        let mut set = MarkerSet::EMPTY;
        if self.key {
            set = set.with(Marker::Key);
        }
        if self.explicit_key {
            set = set.with(Marker::ExplicitKey);
        }
        if self.computed {
            set = set.with(Marker::Computed);
        }
        set
    }

    /// Named `Id` with a non-nullable 32/64-bit integer or UUID type.
    ///
    /// Such a property becomes a generated key when no marked key precedes it.
    pub fn is_potential_key(&self) -> bool {
        self.name == IMPLICIT_KEY_NAME && !self.nullable && self.value_type.is_key_type()
    }

    /// The SQL Server type for this property.
    pub fn sql_type(&self) -> Result<SqlType> {
        SqlType::resolve(self.name, self.value_type)
    }
}
