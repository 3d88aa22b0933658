use lectern_core::db::open_db_in_memory;
use lectern_core::service::{
    BulkLeaves, CollectionService, LeafService, LeafSpec, NewCollection, NewSubunit, NewUnit,
    PageRequest, SubunitService, UnitService,
};
use lectern_core::{
    CoreConfig, EntityId, ErrorCategory, FixedClock, ServiceContext, ServiceError, SqliteStore,
    Store,
};

fn seed_collection<S: Store>(ctx: ServiceContext<'_, S>, code: &str) -> EntityId {
    CollectionService::new(ctx)
        .create(&NewCollection {
            name: format!("Collection {code}"),
            code: code.to_string(),
            language: "en".to_string(),
            description: None,
        })
        .unwrap()
        .id
}

fn seed_units<S: Store>(ctx: ServiceContext<'_, S>, collection_id: EntityId, count: u32) {
    let units = UnitService::new(ctx);
    for ordinal in 1..=count {
        units
            .create(&NewUnit {
                collection_id,
                ordinal,
                name: format!("Unit {ordinal}"),
                code: format!("U{ordinal}"),
                category: "NT".to_string(),
            })
            .unwrap();
    }
}

fn seed_leaves<S: Store>(ctx: ServiceContext<'_, S>, count: u32) -> EntityId {
    let collection_id = seed_collection(ctx, "KJV");
    seed_units(ctx, collection_id, 1);
    let unit_id = UnitService::new(ctx)
        .list(Some(collection_id), PageRequest::default())
        .unwrap()
        .data[0]
        .unit
        .id;
    let subunit_id = SubunitService::new(ctx)
        .create(&NewSubunit { unit_id, ordinal: 1 })
        .unwrap()
        .subunit
        .id;
    LeafService::new(ctx)
        .bulk_create(&BulkLeaves {
            subunit_id,
            leaves: (1..=count).map(|n| LeafSpec::new(n, format!("verse {n}"))).collect(),
        })
        .unwrap();
    subunit_id
}

#[test]
fn second_page_of_twenty_five_leaves() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let subunit_id = seed_leaves(ctx, 25);

    let page = LeafService::new(ctx)
        .list(Some(subunit_id), PageRequest::new(2, 10))
        .unwrap();
    let ordinals: Vec<u32> = page.data.iter().map(|v| v.leaf.ordinal).collect();
    assert_eq!(ordinals, (11..=20).collect::<Vec<_>>());
    assert_eq!(page.meta.total, 25);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.limit, 10);
    assert_eq!(page.meta.total_pages, 3);

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["meta"]["totalPages"], 3);
    assert_eq!(json["data"][0]["ordinal"], 11);
    assert_eq!(json["data"][0]["subunit"]["unit"]["collection"]["code"], "KJV");
}

#[test]
fn child_lists_default_to_fifty_per_page() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let collection_id = seed_collection(ctx, "KJV");
    seed_units(ctx, collection_id, 60);

    let page = UnitService::new(ctx)
        .list(None, PageRequest::default())
        .unwrap();
    assert_eq!(page.data.len(), 50);
    assert_eq!(page.meta.limit, 50);
    assert_eq!(page.meta.total, 60);
    assert_eq!(page.meta.total_pages, 2);
}

#[test]
fn parent_filter_restricts_data_and_total() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let first = seed_collection(ctx, "KJV");
    let second = seed_collection(ctx, "WEB");
    seed_units(ctx, first, 3);
    seed_units(ctx, second, 5);

    let units = UnitService::new(ctx);
    let page = units.list(Some(first), PageRequest::default()).unwrap();
    assert_eq!(page.meta.total, 3);
    assert!(page.data.iter().all(|v| v.unit.collection_id == first));

    let all = units.list(None, PageRequest::default()).unwrap();
    assert_eq!(all.meta.total, 8);
}

#[test]
fn zero_page_or_limit_is_bad_request() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let collections = CollectionService::new(ServiceContext::new(&store, &clock, &config));

    for request in [PageRequest::new(0, 10), PageRequest::new(1, 0)] {
        let err = collections.list(request).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert!(matches!(err, ServiceError::InvalidPage { .. }));
    }
}

#[test]
fn oversized_limit_follows_configuration() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let clamped = CoreConfig::default();
    let unbounded = CoreConfig::builder().unbounded_page_limit().build();
    let subunit_id = seed_leaves(ServiceContext::new(&store, &clock, &clamped), 150);

    let page = LeafService::new(ServiceContext::new(&store, &clock, &clamped))
        .list(Some(subunit_id), PageRequest::new(1, 1000))
        .unwrap();
    assert_eq!(page.meta.limit, 100);
    assert_eq!(page.data.len(), 100);

    let page = LeafService::new(ServiceContext::new(&store, &clock, &unbounded))
        .list(Some(subunit_id), PageRequest::new(1, 1000))
        .unwrap();
    assert_eq!(page.meta.limit, 1000);
    assert_eq!(page.data.len(), 150);
    assert_eq!(page.meta.total_pages, 1);
}
