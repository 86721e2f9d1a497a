use slimgen::prelude::*;
use slimgen::{Marker, MarkerSet, ShapeErrorKind, SqlType};

#[derive(slimgen::Entity, Debug, Default, Clone, PartialEq)]
#[slimgen(table = "Heroes")]
struct Hero {
    #[slimgen(key)]
    id: i64,
    name: String,
    secret_name: String,
    age: Option<i32>,
    #[slimgen(computed)]
    power_level: f64,
}

#[derive(slimgen::Entity, Debug, Default, Clone)]
struct HeroSummary {
    name: String,
    team_count: i32,
}

#[derive(slimgen::Entity, Debug, Default, Clone)]
#[slimgen(table = "HeroArchive", sealed)]
struct ArchivedHero {
    #[slimgen(key)]
    id: i64,
    name: String,
}

fn hero_row(id: i64, name: &str, age: Option<i32>) -> Row {
    Row::new(
        vec!["Id", "Name", "SecretName", "Age", "PowerLevel"],
        vec![
            Value::BigInt(id),
            Value::from(name),
            Value::from("Unknown"),
            Value::from(age),
            Value::Double(9.5),
        ],
    )
}

fn dirty(instance: &Instance<Hero>) -> Vec<&'static str> {
    instance.as_tracked().unwrap().dirty_fields()
}

#[test]
fn wrapped_entity_starts_clean() {
    let hero = Hero {
        id: 1,
        name: "Deadpond".to_string(),
        ..Hero::default()
    };
    let instance = create_instance(Some(hero), &TrackingOptions::default());
    assert!(instance.is_tracked());
    assert!(dirty(&instance).is_empty());
}

#[test]
fn mutation_reports_exactly_the_changed_property() {
    let mut instance = create_instance(Some(Hero::default()), &TrackingOptions::default());
    instance.age = Some(48);
    assert_eq!(dirty(&instance), vec!["Age"]);

    // Computed and key properties are special and never reported.
    instance.power_level = 100.0;
    instance.id = 99;
    assert_eq!(dirty(&instance), vec!["Age"]);
}

#[test]
fn reset_twice_stays_clean() {
    let mut tracked = Tracked::from_existing(Hero::default());
    tracked.name = "Rusty-Man".to_string();
    assert_eq!(tracked.dirty_fields(), vec!["Name"]);

    tracked.reset_changes();
    tracked.reset_changes();
    assert!(tracked.dirty_fields().is_empty());
}

#[test]
fn null_transitions_are_changes() {
    let mut tracked = Tracked::from_existing(Hero {
        age: Some(30),
        ..Hero::default()
    });
    tracked.age = None;
    assert!(tracked.has_changed("Age"));

    tracked.reset_changes();
    tracked.age = Some(31);
    assert_eq!(tracked.dirty_fields(), vec!["Age"]);
}

#[test]
fn custom_special_markers() {
    let mut tracked = Tracked::from_existing_with_markers(
        Hero::default(),
        MarkerSet::EMPTY.with(Marker::Key),
    );
    tracked.power_level = 1.5;
    assert_eq!(tracked.dirty_fields(), vec!["PowerLevel"]);
}

#[test]
fn projections_and_sealed_types_stay_plain() {
    let summary = create_instance::<HeroSummary>(None, &TrackingOptions::default());
    assert!(!summary.is_tracked());

    let archived = create_instance::<ArchivedHero>(None, &TrackingOptions::default());
    assert!(!archived.is_tracked());

    let forced = create_instance::<HeroSummary>(None, &TrackingOptions::new().forced());
    assert!(forced.is_tracked());
}

#[test]
fn materialized_entities_are_clean() {
    let mut hero = materialize::<Hero>(&hero_row(4, "Tarantula", None), &TrackingOptions::default())
        .unwrap();
    assert_eq!(hero.name, "Tarantula");
    assert_eq!(hero.age, None);
    assert!(dirty(&hero).is_empty());

    hero.secret_name = "Natalia Roman-on".to_string();
    let generator = MssqlGenerator::<Hero>::new().unwrap();
    assert_eq!(
        generator.update_sql(Some(&hero)),
        "UPDATE [Heroes] SET [SecretName] = @SecretName WHERE [Id] = @Id;"
    );
}

#[test]
fn materialize_all_stops_at_missing_column() {
    let rows = vec![
        hero_row(1, "Deadpond", Some(30)),
        hero_row(2, "Spider-Boy", None),
    ];
    let heroes = slimgen::materialize_all::<Hero>(&rows, &TrackingOptions::default()).unwrap();
    assert_eq!(heroes.len(), 2);
    assert_eq!(heroes[0].age, Some(30));

    let partial = Row::new(vec!["Id", "Name"], vec![Value::BigInt(3), Value::from("X")]);
    let err = materialize::<Hero>(&partial, &TrackingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Type(_)));
    assert!(err.to_string().contains("SecretName"));
}

#[test]
fn plain_materialization_for_projections() {
    let row = Row::new(
        vec!["Name", "TeamCount"],
        vec![Value::from("Deadpond"), Value::Int(2)],
    );
    let summary = materialize::<HeroSummary>(&row, &TrackingOptions::default()).unwrap();
    assert!(!summary.is_tracked());
    assert_eq!(summary.team_count, 2);
}

#[test]
fn table_parameter_from_entities() {
    let heroes = vec![
        Hero {
            id: 1,
            name: "Deadpond".to_string(),
            ..Hero::default()
        },
        Hero {
            id: 2,
            name: "Spider-Boy".to_string(),
            age: Some(17),
            ..Hero::default()
        },
    ];

    let tvp = heroes
        .table_parameter("dbo.HeroList")
        .add_column(|h: &Hero| h.id, "Id", None)
        .unwrap()
        .add_column(|h: &Hero| h.age, "Age", None)
        .unwrap()
        .build();

    assert_eq!(tvp.columns()[0].sql_type, SqlType::BigInt);
    assert_eq!(tvp.columns()[1].ordinal, 1);
    assert_eq!(tvp.records()[0], vec![Value::BigInt(1), Value::Null]);
    assert_eq!(tvp.records()[1], vec![Value::BigInt(2), Value::Int(17)]);

    let names: Vec<String> = heroes.iter().map(|h| h.name.clone()).collect();
    let tvp = names.as_table_parameter("dbo.NameList", "Name", None).unwrap();
    assert_eq!(tvp.columns()[0].max_length, Some(slimgen::DEFAULT_TEXT_LENGTH));

    let err = TvpBuilder::new("dbo.Bad", &heroes)
        .add_column(|_: &Hero| serde_json::Value::Null, "Doc", None)
        .unwrap_err();
    assert_eq!(err.shape_kind(), Some(ShapeErrorKind::UnmappableType));
}

#[derive(slimgen::Entity, Debug, Default, Clone)]
#[slimgen(table = "Gauges")]
struct Gauge {
    #[slimgen(key)]
    id: i32,
    reading: f64,
}

#[test]
fn nan_reading_is_clean_after_reset() {
    let mut gauge = Tracked::from_existing(Gauge {
        id: 1,
        reading: f64::NAN,
    });
    gauge.reset_changes();
    gauge.reset_changes();
    assert!(gauge.dirty_fields().is_empty());
}

#[test]
fn insert_key_row_reads_as_scalar() {
    let identity = Row::new([""], vec![Value::Decimal("17".to_string())]);
    assert_eq!(materialize_scalar::<i64>(&identity).unwrap(), 17);

    let key = uuid::Uuid::from_u128(7);
    let inserted = Row::new(["Id"], vec![Value::from(key)]);
    assert_eq!(materialize_scalar::<uuid::Uuid>(&inserted).unwrap(), key);

    let keyless = Row::new([""], vec![Value::Int(0)]);
    assert_eq!(materialize_scalar::<i32>(&keyless).unwrap(), 0);
}
