mod common;

use common::{client, list_item, seed_service, NOW};
use designflow_core::db::open_db_in_memory;
use designflow_core::model::validation::ValidationError;
use designflow_core::repo::order_repo::OrderSnapshotRepository;
use designflow_core::{
    EntityRef, FixedClock, OrderSnapshotStore, RepoError, ServiceError, SqliteRepositories,
};
use uuid::Uuid;

#[test]
fn version_numbers_are_monotonic_per_order_across_interleaving() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let store = OrderSnapshotStore::new(repos.context(&clock));
    let service = seed_service(&repos, "Layout", 100.0, Vec::new(), &[]);
    let items = vec![list_item(&service, 1.0)];

    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let sequence = [a, b, a, a, b];
    let versions = sequence
        .iter()
        .map(|&order| store.create_version(order, &client(), &items).unwrap().version_number)
        .collect::<Vec<_>>();
    assert_eq!(versions, vec![1, 1, 2, 3, 2]);

    let listed = store
        .list_versions(a)
        .unwrap()
        .iter()
        .map(|snapshot| snapshot.version_number)
        .collect::<Vec<_>>();
    assert_eq!(listed, vec![1, 2, 3]);
    assert_eq!(store.get_latest_version(b).unwrap().version_number, 2);
}

#[test]
fn stored_versions_are_unchanged_by_later_versions() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let store = OrderSnapshotStore::new(repos.context(&clock));
    let service = seed_service(&repos, "Layout", 100.0, Vec::new(), &[]);
    let order = Uuid::new_v4();

    let first = store
        .create_version(order, &client(), &[list_item(&service, 2.0)])
        .unwrap();
    let read_once = store.get_version(order, 1).unwrap();
    assert_eq!(read_once, first);

    clock.advance_ms(1_000);
    store
        .create_version(
            order,
            &client(),
            &[list_item(&service, 2.0), list_item(&service, 5.0)],
        )
        .unwrap();

    let read_again = store.get_version(order, 1).unwrap();
    assert_eq!(read_again, read_once);
    assert_eq!(read_again.items.len(), 1);
    assert_eq!(read_again.items[0].subtotal, 200.0);
    assert_eq!(store.get_latest_version(order).unwrap().items.len(), 2);
}

#[test]
fn snapshot_rows_reject_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let service = seed_service(&repos, "Layout", 100.0, Vec::new(), &[]);
    repos
        .orders
        .insert_next_version(Uuid::new_v4(), &client(), &[list_item(&service, 1.0)], NOW)
        .unwrap();

    assert!(conn
        .execute("UPDATE order_snapshot_items SET quantity = 9;", [])
        .is_err());
    assert!(conn.execute("DELETE FROM order_snapshots;", []).is_err());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM order_snapshot_items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn invalid_item_lists_are_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let store = OrderSnapshotStore::new(repos.context(&clock));
    let service = seed_service(&repos, "Layout", 100.0, Vec::new(), &[]);
    let order = Uuid::new_v4();

    let err = store.create_version(order, &client(), &[]).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyItems)));

    let mut nil_service = list_item(&service, 1.0);
    nil_service.service_id = Uuid::nil();
    let err = repos
        .orders
        .insert_next_version(order, &client(), &[list_item(&service, 1.0), nil_service], NOW)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingServiceId { index: 1 })
    ));

    for quantity in [0.0, -1.0, f64::NAN] {
        let mut item = list_item(&service, 1.0);
        item.quantity = quantity;
        let err = store.create_version(order, &client(), &[item]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidQuantity { index: 0, .. })
        ));
    }

    assert!(store.list_versions(order).unwrap().is_empty());
}

#[test]
fn missing_versions_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let store = OrderSnapshotStore::new(repos.context(&clock));
    let order = Uuid::new_v4();

    let err = store.get_latest_version(order).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Order(id)) if id == order));

    let err = store.get_version(order, 4).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound(EntityRef::OrderVersion {
            version_number: 4,
            ..
        })
    ));
}

#[test]
fn client_snapshot_round_trips_with_contacts() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let service = seed_service(&repos, "Layout", 100.0, Vec::new(), &[]);
    let client = client();

    let snapshot = repos
        .orders
        .insert_next_version(Uuid::new_v4(), &client, &[list_item(&service, 1.0)], NOW)
        .unwrap();
    let loaded = repos
        .orders
        .get_latest_version(snapshot.order_id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.client, client);
    assert_eq!(loaded.client.contacts[0].name, "Mina");
    assert_eq!(loaded.created_at, NOW);
}
