use lectern_core::db::open_db_in_memory;
use lectern_core::service::{
    CollectionPatch, CollectionService, NaturalKeyField, NewCollection, NewUnit, PageRequest,
    UnitService,
};
use lectern_core::{
    CoreConfig, EntityKind, ErrorCategory, FixedClock, NodeRepository, ServiceContext,
    ServiceError, SqliteStore,
};
use uuid::Uuid;

fn kjv() -> NewCollection {
    NewCollection {
        name: "King James Version".to_string(),
        code: "KJV".to_string(),
        language: "en".to_string(),
        description: Some("Authorized Version of 1611".to_string()),
    }
}

fn web() -> NewCollection {
    NewCollection {
        name: "World English Bible".to_string(),
        code: "WEB".to_string(),
        language: "en".to_string(),
        description: None,
    }
}

#[test]
fn create_normalizes_fields_and_get_returns_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let service = CollectionService::new(ctx);

    let mut input = kjv();
    input.name = "  King   James\tVersion ".to_string();
    input.code = " KJV ".to_string();
    let created = service.create(&input).unwrap();
    assert_eq!(created.name, "King James Version");
    assert_eq!(created.code, "KJV");
    assert_eq!(created.created_at, 1_000);
    assert_eq!(created.updated_at, 1_000);

    let detail = service.get(created.id).unwrap();
    assert_eq!(detail.collection, created);
    assert!(detail.units.is_empty());
}

#[test]
fn detail_lists_units_in_ordinal_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);

    let collection = CollectionService::new(ctx).create(&kjv()).unwrap();
    let units = UnitService::new(ctx);
    for (ordinal, name, code) in [(2, "Exodus", "Exo"), (1, "Genesis", "Gen")] {
        units
            .create(&NewUnit {
                collection_id: collection.id,
                ordinal,
                name: name.to_string(),
                code: code.to_string(),
                category: "OT".to_string(),
            })
            .unwrap();
    }

    let detail = CollectionService::new(ctx).get(collection.id).unwrap();
    let names: Vec<&str> = detail.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Genesis", "Exodus"]);

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["code"], "KJV");
    assert_eq!(json["units"][0]["ordinal"], 1);
    assert_eq!(json["units"][0]["category"], "OT");
}

#[test]
fn duplicate_code_is_a_conflict_and_store_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    service.create(&kjv()).unwrap();
    let mut second = web();
    second.code = "KJV".to_string();

    let err = service.create(&second).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    match err {
        ServiceError::NaturalKeyTaken { field, value } => {
            assert_eq!(field, NaturalKeyField::Code);
            assert_eq!(value, "KJV");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.count(EntityKind::Collection, None).unwrap(), 1);
}

#[test]
fn duplicate_name_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    service.create(&kjv()).unwrap();
    let mut second = kjv();
    second.code = "AV".to_string();

    assert!(matches!(
        service.create(&second),
        Err(ServiceError::NaturalKeyTaken {
            field: NaturalKeyField::Name,
            ..
        })
    ));
}

#[test]
fn invalid_input_reports_every_field_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    let input = NewCollection {
        name: String::new(),
        code: "THIS-CODE-IS-TOO-LONG".to_string(),
        language: "en".to_string(),
        description: None,
    };
    match service.create(&input).unwrap_err() {
        ServiceError::InvalidInput(errors) => {
            assert!(errors.has_field("name"));
            assert!(errors.has_field("code"));
            assert!(!errors.has_field("language"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.count(EntityKind::Collection, None).unwrap(), 0);
}

#[test]
fn update_rechecks_natural_key_excluding_itself() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    let kjv = service.create(&kjv()).unwrap();
    service.create(&web()).unwrap();

    let taken = CollectionPatch {
        code: Some("WEB".to_string()),
        ..CollectionPatch::default()
    };
    assert!(matches!(
        service.update(kjv.id, &taken),
        Err(ServiceError::NaturalKeyTaken { .. })
    ));

    clock.advance(500);
    let own = CollectionPatch {
        code: Some("KJV".to_string()),
        language: Some("en-GB".to_string()),
        ..CollectionPatch::default()
    };
    let updated = service.update(kjv.id, &own).unwrap();
    assert_eq!(updated.code, "KJV");
    assert_eq!(updated.language, "en-GB");
    assert_eq!(updated.created_at, 1_000);
    assert_eq!(updated.updated_at, 1_500);
    assert_eq!(service.get(kjv.id).unwrap().collection, updated);
}

#[test]
fn list_is_ordered_by_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    service.create(&web()).unwrap();
    service.create(&kjv()).unwrap();

    let page = service.list(PageRequest::default()).unwrap();
    let codes: Vec<&str> = page.data.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["KJV", "WEB"]);
    assert_eq!(page.meta.limit, 20);
    assert_eq!(page.meta.total, 2);
}

#[test]
fn missing_collection_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    let missing = Uuid::new_v4();
    let err = service.get(missing).unwrap_err();
    assert_eq!(err.category().status_code(), 404);
    let err = service
        .update(missing, &CollectionPatch::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id, .. } if id == missing));
}

#[test]
fn invalid_patch_for_missing_collection_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    let missing = Uuid::new_v4();
    let blank_name = CollectionPatch {
        name: Some("   ".to_string()),
        ..CollectionPatch::default()
    };
    let err = service.update(missing, &blank_name).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id, .. } if id == missing));
    assert_eq!(err.category().status_code(), 404);
}

#[test]
fn blank_description_clears_the_stored_value() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let service = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    let kjv = service.create(&kjv()).unwrap();
    assert_eq!(kjv.description.as_deref(), Some("Authorized Version of 1611"));

    let untouched = service.update(kjv.id, &CollectionPatch::default()).unwrap();
    assert_eq!(untouched.description, kjv.description);

    let clear = CollectionPatch {
        description: Some("  ".to_string()),
        ..CollectionPatch::default()
    };
    let cleared = service.update(kjv.id, &clear).unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(service.get(kjv.id).unwrap().collection.description, None);

    let mut blank = web();
    blank.description = Some(String::new());
    assert_eq!(service.create(&blank).unwrap().description, None);
}
