//! Change-tracking surrogate for entities.
//!
//! Rust structs do not record which properties were written since they were
//! loaded. `Tracked<T>` keeps a snapshot of property values next to `T` and
//! compares against it on demand, so writes through `DerefMut` stay plain
//! field assignments with no bookkeeping.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::entity::Entity;
use crate::field::{FieldInfo, Marker, MarkerSet};
use crate::value::Value;

/// Capability of reporting and clearing property changes.
pub trait ChangeTracking {
    /// Take a new snapshot of the current property values.
    fn reset_changes(&mut self);

    /// Names of the properties changed since the last snapshot, in
    /// declaration order. Special-marked properties are never reported.
    fn dirty_fields(&self) -> Vec<&'static str>;
}

/// Options controlling whether and how instances are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingOptions {
    /// Track even types that are sealed or carry no table name.
    pub force: bool,
    /// Markers that exclude a property from tracking.
    pub special_markers: MarkerSet,
}

impl TrackingOptions {
    pub const fn new() -> Self {
        Self {
            force: false,
            special_markers: MarkerSet::ALL,
        }
    }

    /// Track regardless of the eligibility gate.
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub const fn special_markers(mut self, markers: MarkerSet) -> Self {
        self.special_markers = markers;
        self
    }
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity instance with a change-tracking snapshot.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    inner: T,
    snapshot: HashMap<&'static str, Value>,
    special: MarkerSet,
}

impl<T: Entity> Tracked<T> {
    /// Wrap a new instance. The snapshot starts empty, so every non-null
    /// property is dirty.
    pub fn new(inner: T) -> Self {
        Self::with_markers(inner, MarkerSet::ALL)
    }

    /// Like [`Tracked::new`], with a custom set of special markers.
    pub fn with_markers(inner: T, special: MarkerSet) -> Self {
        Self {
            inner,
            snapshot: HashMap::new(),
            special,
        }
    }

    /// Wrap an already-populated instance and reset, so it starts clean.
    pub fn from_existing(inner: T) -> Self {
        Self::from_existing_with_markers(inner, MarkerSet::ALL)
    }

    pub fn from_existing_with_markers(inner: T, special: MarkerSet) -> Self {
        let mut tracked = Self::with_markers(inner, special);
        tracked.reset_changes();
        tracked
    }

    /// Markers that exclude a property from tracking.
    pub fn special_markers(&self) -> MarkerSet {
        self.special
    }

    /// Treat one more marker as special. Takes effect on the next reset.
    pub fn add_special_marker(&mut self, marker: Marker) {
        self.special = self.special.with(marker);
    }

    /// Borrow the wrapped instance.
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped instance.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume and return the wrapped instance.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Whether the named property differs from its snapshot.
    ///
    /// A property absent from the snapshot is changed when it holds a
    /// non-null value. NULL on exactly one side is a change.
    pub fn has_changed(&self, property: &str) -> bool {
        let current = self.inner.get_value(property).unwrap_or(Value::Null);
        match self.snapshot.get(property) {
            None => !current.is_null(),
            Some(previous) => match (previous.is_null(), current.is_null()) {
                (true, true) => false,
                (true, false) | (false, true) => true,
                (false, false) => !previous.same_as(&current),
            },
        }
    }

    fn is_special(&self, field: &FieldInfo) -> bool {
        field.markers().intersects(self.special)
    }
}

impl<T: Entity> ChangeTracking for Tracked<T> {
    /// Skips special-marked properties, and potential implicit keys until
    /// the first special-marked property has been seen.
    #[tracing::instrument(level = "trace", skip(self), fields(entity = T::NAME))]
    fn reset_changes(&mut self) {
        let mut found_key = false;
        let mut snapshot = HashMap::with_capacity(T::fields().len());

        for field in T::fields() {
            if self.is_special(field) {
                found_key = true;
                continue;
            }
            if !found_key && field.is_potential_key() {
                continue;
            }
            let value = self.inner.get_value(field.name).unwrap_or(Value::Null);
            snapshot.insert(field.name, value);
        }

        self.snapshot = snapshot;
    }

    fn dirty_fields(&self) -> Vec<&'static str> {
        let dirty: Vec<&'static str> = T::fields()
            .iter()
            .filter(|field| !self.is_special(field) && self.has_changed(field.name))
            .map(|field| field.name)
            .collect();
        tracing::trace!(entity = T::NAME, dirty = dirty.len(), "Checked for changes");
        dirty
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// An entity produced by [`create_instance`]: tracked when eligible,
/// plain otherwise.
#[derive(Debug, Clone)]
pub enum Instance<T> {
    Plain(T),
    Tracked(Tracked<T>),
}

impl<T: Entity> Instance<T> {
    pub fn is_tracked(&self) -> bool {
        matches!(self, Instance::Tracked(_))
    }

    pub fn as_tracked(&self) -> Option<&Tracked<T>> {
        match self {
            Instance::Tracked(tracked) => Some(tracked),
            Instance::Plain(_) => None,
        }
    }

    pub fn as_tracked_mut(&mut self) -> Option<&mut Tracked<T>> {
        match self {
            Instance::Tracked(tracked) => Some(tracked),
            Instance::Plain(_) => None,
        }
    }

    /// Consume and return the entity, dropping any snapshot.
    pub fn into_inner(self) -> T {
        match self {
            Instance::Plain(entity) => entity,
            Instance::Tracked(tracked) => tracked.into_inner(),
        }
    }
}

impl<T> Deref for Instance<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            Instance::Plain(entity) => entity,
            Instance::Tracked(tracked) => tracked,
        }
    }
}

impl<T> DerefMut for Instance<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Instance::Plain(entity) => entity,
            Instance::Tracked(tracked) => tracked,
        }
    }
}

/// Whether instances of `T` get wrapped in a [`Tracked`] surrogate.
///
/// Only non-sealed types with a table-name marker are tracked, unless the
/// options force it. Projections such as view or procedure results carry no
/// table name and stay plain.
pub fn should_track<T: Entity>(options: &TrackingOptions) -> bool {
    options.force || (!T::SEALED && T::TABLE_NAME.is_some())
}

/// Create an instance of `T`, tracked when eligible.
///
/// An existing instance is moved into the surrogate and reset, so it starts
/// clean. Without one, a default instance is created and every non-null
/// property starts dirty.
pub fn create_instance<T: Entity + Default>(
    existing: Option<T>,
    options: &TrackingOptions,
) -> Instance<T> {
    if !should_track::<T>(options) {
        return Instance::Plain(existing.unwrap_or_default());
    }

    tracing::trace!(entity = T::NAME, existing = existing.is_some(), "Creating tracked instance");
    let special = options.special_markers;
    let tracked = match existing {
        Some(entity) => Tracked::from_existing_with_markers(entity, special),
        None => Tracked::with_markers(T::default(), special),
    };
    Instance::Tracked(tracked)
}

/// Something an entity can be read from: the entity itself or a surrogate.
pub trait EntitySource<T: Entity> {
    fn entity(&self) -> &T;

    /// The change-tracking capability, when the source has one.
    fn change_tracking(&self) -> Option<&dyn ChangeTracking> {
        None
    }
}

impl<T: Entity> EntitySource<T> for T {
    fn entity(&self) -> &T {
        self
    }
}

impl<T: Entity> EntitySource<T> for Tracked<T> {
    fn entity(&self) -> &T {
        &self.inner
    }

    fn change_tracking(&self) -> Option<&dyn ChangeTracking> {
        Some(self as &dyn ChangeTracking)
    }
}

impl<T: Entity> EntitySource<T> for Instance<T> {
    fn entity(&self) -> &T {
        self
    }

    fn change_tracking(&self) -> Option<&dyn ChangeTracking> {
        match self {
            Instance::Tracked(tracked) => Some(tracked as &dyn ChangeTracking),
            Instance::Plain(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::error::Error;
    use crate::types::ValueType;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Hero {
        id: i32,
        name: String,
        age: Option<i32>,
        power: f64,
    }

    const HERO_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("Id", ValueType::I32).key(true),
        FieldInfo::new("Name", ValueType::String),
        FieldInfo::new("Age", ValueType::I32).nullable(true),
        FieldInfo::new("Power", ValueType::F64).computed(true),
    ];

    impl Entity for Hero {
        const NAME: &'static str = "Hero";
        const TABLE_NAME: Option<&'static str> = Some("Heroes");

        fn fields() -> &'static [FieldInfo] {
            HERO_FIELDS
        }

        fn get_value(&self, property: &str) -> Option<Value> {
            match property {
                "Id" => Some(Value::from(self.id)),
                "Name" => Some(Value::from(self.name.clone())),
                "Age" => Some(Value::from(self.age)),
                "Power" => Some(Value::from(self.power)),
                _ => None,
            }
        }

        fn set_value(&mut self, property: &str, value: Value) -> Result<()> {
            match property {
                "Id" => self.id = i32::try_from(value)?,
                "Name" => self.name = String::try_from(value)?,
                "Age" => self.age = Option::<i32>::try_from(value)?,
                "Power" => self.power = f64::try_from(value)?,
                _ => {
                    return Err(Error::UnknownProperty {
                        entity: Self::NAME,
                        property: property.to_string(),
                    });
                }
            }
            Ok(())
        }
    }

    /// A view projection: no table name, never tracked unless forced.
    #[derive(Debug, Clone, Default)]
    struct HeroSummary {
        name: String,
    }

    const SUMMARY_FIELDS: &[FieldInfo] = &[FieldInfo::new("Name", ValueType::String)];

    impl Entity for HeroSummary {
        const NAME: &'static str = "HeroSummary";

        fn fields() -> &'static [FieldInfo] {
            SUMMARY_FIELDS
        }

        fn get_value(&self, property: &str) -> Option<Value> {
            (property == "Name").then(|| Value::from(self.name.clone()))
        }

        fn set_value(&mut self, _property: &str, value: Value) -> Result<()> {
            self.name = String::try_from(value)?;
            Ok(())
        }
    }

    fn loaded_hero() -> Hero {
        Hero {
            id: 7,
            name: "Deadpond".to_string(),
            age: None,
            power: 9.5,
        }
    }

    #[test]
    fn existing_instance_starts_clean() {
        let hero = Tracked::from_existing(loaded_hero());
        assert!(hero.dirty_fields().is_empty());
    }

    #[test]
    fn mutation_reports_exactly_that_field() {
        let mut hero = Tracked::from_existing(loaded_hero());
        hero.name = "Spider-Boy".to_string();
        assert_eq!(hero.dirty_fields(), vec!["Name"]);
    }

    #[test]
    fn reset_twice_stays_clean() {
        let mut hero = Tracked::from_existing(loaded_hero());
        hero.age = Some(30);
        hero.reset_changes();
        hero.reset_changes();
        assert!(hero.dirty_fields().is_empty());
    }

    #[test]
    fn writing_the_same_value_is_not_a_change() {
        let mut hero = Tracked::from_existing(loaded_hero());
        hero.name = "Deadpond".to_string();
        assert!(hero.dirty_fields().is_empty());
    }

    #[test]
    fn null_transitions_are_changes() {
        let mut hero = Tracked::from_existing(loaded_hero());
        hero.age = Some(48);
        assert_eq!(hero.dirty_fields(), vec!["Age"]);

        hero.reset_changes();
        hero.age = None;
        assert_eq!(hero.dirty_fields(), vec!["Age"]);
    }

    #[test]
    fn new_instance_reports_non_null_fields() {
        let hero = Tracked::new(Hero {
            id: 0,
            name: "Rusty-Man".to_string(),
            age: None,
            power: 1.0,
        });
        // `Id` and the computed `Power` are special.
        assert_eq!(hero.dirty_fields(), vec!["Name"]);
    }

    #[test]
    fn special_markers_are_configurable() {
        let special = MarkerSet::ALL.without(Marker::Computed);
        let mut hero = Tracked::from_existing_with_markers(loaded_hero(), special);
        hero.power = 11.0;
        assert_eq!(hero.dirty_fields(), vec!["Power"]);

        hero.add_special_marker(Marker::Computed);
        assert!(hero.dirty_fields().is_empty());
    }

    #[test]
    fn nan_is_unchanged_after_reset() {
        let special = MarkerSet::ALL.without(Marker::Computed);
        let hero = Hero {
            power: f64::NAN,
            ..loaded_hero()
        };
        let mut hero = Tracked::from_existing_with_markers(hero, special);
        hero.reset_changes();
        hero.reset_changes();
        assert!(hero.dirty_fields().is_empty());

        hero.power = 1.0;
        assert_eq!(hero.dirty_fields(), vec!["Power"]);
    }

    #[derive(Debug, Default)]
    struct Widget {
        id: i32,
        code: String,
        legacy_id: i32,
    }

    impl Entity for Widget {
        const NAME: &'static str = "Widget";

        fn fields() -> &'static [FieldInfo] {
            const FIELDS: &[FieldInfo] = &[
                FieldInfo::new("Id", ValueType::I32),
                FieldInfo::new("Code", ValueType::String),
                FieldInfo::new("LegacyId", ValueType::I32),
            ];
            FIELDS
        }

        fn get_value(&self, property: &str) -> Option<Value> {
            match property {
                "Id" => Some(Value::from(self.id)),
                "Code" => Some(Value::from(self.code.clone())),
                "LegacyId" => Some(Value::from(self.legacy_id)),
                _ => None,
            }
        }

        fn set_value(&mut self, _property: &str, _value: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn implicit_id_is_never_snapshotted() {
        let mut widget = Tracked::from_existing(Widget {
            id: 12,
            code: "W-1".to_string(),
            legacy_id: 3,
        });
        assert_eq!(widget.dirty_fields(), vec!["Id"]);

        widget.legacy_id = 4;
        assert_eq!(widget.dirty_fields(), vec!["Id", "LegacyId"]);

        widget.id = 0;
        widget.legacy_id = 3;
        assert!(widget.has_changed("Id"));
    }

    #[derive(Debug, Default)]
    struct Part {
        code: String,
        id: i32,
    }

    impl Entity for Part {
        const NAME: &'static str = "Part";

        fn fields() -> &'static [FieldInfo] {
            const FIELDS: &[FieldInfo] = &[
                FieldInfo::new("Code", ValueType::String).explicit_key(true),
                FieldInfo::new("Id", ValueType::I32),
            ];
            FIELDS
        }

        fn get_value(&self, property: &str) -> Option<Value> {
            match property {
                "Code" => Some(Value::from(self.code.clone())),
                "Id" => Some(Value::from(self.id)),
                _ => None,
            }
        }

        fn set_value(&mut self, _property: &str, _value: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn id_after_special_marker_is_snapshotted() {
        let mut part = Tracked::from_existing(Part {
            code: "A1".to_string(),
            id: 3,
        });
        assert!(part.dirty_fields().is_empty());

        part.id = 4;
        part.code = "B2".to_string();
        assert_eq!(part.dirty_fields(), vec!["Id"]);
    }

    #[test]
    fn factory_tracks_eligible_types() {
        let options = TrackingOptions::default();

        let hero = create_instance(Some(loaded_hero()), &options);
        assert!(hero.is_tracked());
        assert_eq!(hero.name, "Deadpond");
        assert!(hero.change_tracking().unwrap().dirty_fields().is_empty());

        let fresh = create_instance::<Hero>(None, &options);
        assert!(fresh.is_tracked());
    }

    #[test]
    fn factory_leaves_projections_plain() {
        let options = TrackingOptions::default();
        let summary = create_instance(
            Some(HeroSummary {
                name: "Tarantula".to_string(),
            }),
            &options,
        );
        assert!(!summary.is_tracked());
        assert_eq!(summary.name, "Tarantula");
        assert!(summary.change_tracking().is_none());

        let forced = create_instance::<HeroSummary>(None, &options.forced());
        assert!(forced.is_tracked());
    }

    #[test]
    fn plain_entity_source_has_no_tracking() {
        let hero = loaded_hero();
        let source: &dyn EntitySource<Hero> = &hero;
        assert!(source.change_tracking().is_none());
        assert_eq!(source.entity().id, 7);
    }
}
