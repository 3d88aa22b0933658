use lectern_core::db::open_db_in_memory;
use lectern_core::service::{
    BulkLeaves, CollectionService, LeafService, LeafSpec, NewCollection, NewSubunit, NewUnit,
    SubunitService, UnitService,
};
use lectern_core::{
    CoreConfig, DeletePolicy, EntityId, EntityKind, ErrorCategory, FixedClock, NodeRepository,
    ServiceContext, ServiceError, SqliteStore, Store,
};
use uuid::Uuid;

struct Tree {
    collection: EntityId,
    unit: EntityId,
    subunit: EntityId,
    leaves: Vec<EntityId>,
}

fn seed_tree<S: Store>(ctx: ServiceContext<'_, S>) -> Tree {
    let collection = CollectionService::new(ctx)
        .create(&NewCollection {
            name: "King James Version".to_string(),
            code: "KJV".to_string(),
            language: "en".to_string(),
            description: None,
        })
        .unwrap()
        .id;
    let unit = UnitService::new(ctx)
        .create(&NewUnit {
            collection_id: collection,
            ordinal: 1,
            name: "Genesis".to_string(),
            code: "Gen".to_string(),
            category: "OT".to_string(),
        })
        .unwrap()
        .unit
        .id;
    let subunit = SubunitService::new(ctx)
        .create(&NewSubunit {
            unit_id: unit,
            ordinal: 1,
        })
        .unwrap()
        .subunit
        .id;
    let leaves = LeafService::new(ctx)
        .bulk_create(&BulkLeaves {
            subunit_id: subunit,
            leaves: (1..=3).map(|n| LeafSpec::new(n, format!("verse {n}"))).collect(),
        })
        .unwrap()
        .leaves
        .into_iter()
        .map(|leaf| leaf.id)
        .collect();
    Tree {
        collection,
        unit,
        subunit,
        leaves,
    }
}

fn total_rows(store: &SqliteStore<'_>) -> u64 {
    EntityKind::ALL
        .into_iter()
        .map(|kind| store.count(kind, None).unwrap())
        .sum()
}

#[test]
fn restrict_refuses_parents_with_children() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let tree = seed_tree(ctx);

    let err = CollectionService::new(ctx).delete(tree.collection).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert!(matches!(
        err,
        ServiceError::HasChildren {
            kind: EntityKind::Collection,
            children: 1,
            ..
        }
    ));
    let err = SubunitService::new(ctx).delete(tree.subunit).unwrap_err();
    assert!(matches!(err, ServiceError::HasChildren { children: 3, .. }));
    assert_eq!(total_rows(&store), 6);
}

#[test]
fn restrict_deletes_leaves_then_parents_bottom_up() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let tree = seed_tree(ctx);

    let leaves = LeafService::new(ctx);
    for id in &tree.leaves {
        assert_eq!(leaves.delete(*id).unwrap(), 1);
    }
    assert!(matches!(
        leaves.get(tree.leaves[0]),
        Err(ServiceError::NotFound { .. })
    ));
    SubunitService::new(ctx).delete(tree.subunit).unwrap();
    UnitService::new(ctx).delete(tree.unit).unwrap();
    CollectionService::new(ctx).delete(tree.collection).unwrap();
    assert_eq!(total_rows(&store), 0);
}

#[test]
fn deleting_missing_id_is_not_found_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::default();
    let ctx = ServiceContext::new(&store, &clock, &config);
    seed_tree(ctx);

    let missing = Uuid::new_v4();
    let err = UnitService::new(ctx).delete(missing).unwrap_err();
    assert_eq!(err.category().status_code(), 404);
    assert!(matches!(
        err,
        ServiceError::NotFound { kind: EntityKind::Unit, id } if id == missing
    ));
    assert_eq!(total_rows(&store), 6);
}

#[test]
fn cascade_removes_the_whole_subtree() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::builder()
        .delete_policy(DeletePolicy::Cascade)
        .build();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let tree = seed_tree(ctx);
    let other = CollectionService::new(ctx)
        .create(&NewCollection {
            name: "World English Bible".to_string(),
            code: "WEB".to_string(),
            language: "en".to_string(),
            description: None,
        })
        .unwrap();

    let removed = CollectionService::new(ctx).delete(tree.collection).unwrap();
    assert_eq!(removed, 6);
    assert_eq!(total_rows(&store), 1);
    assert!(store.exists(EntityKind::Collection, other.id).unwrap());
    assert!(!store.exists(EntityKind::Leaf, tree.leaves[2]).unwrap());
}

#[test]
fn cascade_on_a_subunit_keeps_ancestors() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let clock = FixedClock::new(1_000);
    let config = CoreConfig::builder()
        .delete_policy(DeletePolicy::Cascade)
        .build();
    let ctx = ServiceContext::new(&store, &clock, &config);
    let tree = seed_tree(ctx);

    assert_eq!(SubunitService::new(ctx).delete(tree.subunit).unwrap(), 4);
    assert!(store.exists(EntityKind::Unit, tree.unit).unwrap());
    assert_eq!(store.count(EntityKind::Leaf, None).unwrap(), 0);
}
