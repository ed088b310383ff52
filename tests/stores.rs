mod common;

use inventory_server::db::UPDATE_BATCH_SIZE;
use inventory_server::error::DatabaseError;
use inventory_server::ItemUpdate;

#[tokio::test]
async fn test_duplicate_registration() {
    let Some(t) = common::test_db().await else { return };
    let users = t.db.credentials();

    users.register("dup", "first").await.unwrap();
    match users.register("dup", "second").await {
        Err(DatabaseError::DuplicateUsername) => (),
        other => panic!("Expected duplicate username, got {:?}", other),
    }

    let stored = users.fetch_by_username("dup").await.unwrap().unwrap();
    assert_eq!(stored.password, "first");
}

#[tokio::test]
async fn test_verify_login_is_exact() {
    let Some(t) = common::test_db().await else { return };
    let users = t.db.credentials();

    users.register("login", "login").await.unwrap();

    assert!(users.verify_login("login", "login").await.unwrap());
    assert!(!users.verify_login("login", "Login").await.unwrap());
    assert!(!users.verify_login("Login", "login").await.unwrap());
    assert!(!users.verify_login("nobody", "login").await.unwrap());
    assert!(users.fetch_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_add_and_list_are_per_user() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("alice", "a").await.unwrap();
    t.db.credentials().register("bob", "b").await.unwrap();
    let inventory = t.db.inventory();

    let apples = inventory.add_item("apples", 4, "alice").await.unwrap();
    let pears = inventory.add_item("pears", 2, "bob").await.unwrap();
    assert!(apples > 0);
    assert_ne!(apples, pears);

    let alice = inventory.list_for_user("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!((alice[0].id, alice[0].name.as_str(), alice[0].amount), (apples, "apples", 4));

    let bob = inventory.list_for_user("bob").await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, pears);
    assert_eq!(bob[0].owner, alice[0].owner + 1);
}

#[tokio::test]
async fn test_add_for_unknown_user_is_not_found() {
    let Some(t) = common::test_db().await else { return };

    match t.db.inventory().add_item("apples", 4, "ghost").await {
        Err(DatabaseError::NotFound) => (),
        other => panic!("Expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_touches_only_listed_ids() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    let inventory = t.db.inventory();

    let first = inventory.add_item("apples", 4, "login").await.unwrap();
    let second = inventory.add_item("cherries", 9, "login").await.unwrap();
    assert_eq!(first, 1);

    inventory
        .update_items(&[ItemUpdate::new(1, "bananas", 5)])
        .await
        .unwrap();

    let items = inventory.list_for_user("login").await.unwrap();
    let updated = items.iter().find(|i| i.id == first).unwrap();
    let untouched = items.iter().find(|i| i.id == second).unwrap();
    assert_eq!((updated.name.as_str(), updated.amount), ("bananas", 5));
    assert_eq!((untouched.name.as_str(), untouched.amount), ("cherries", 9));
}

#[tokio::test]
async fn test_update_spanning_several_batches() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("bulk", "bulk").await.unwrap();
    let inventory = t.db.inventory();

    let count = UPDATE_BATCH_SIZE * 2 + 3;
    let mut updates = Vec::new();
    for n in 0..count {
        let id = inventory.add_item(&format!("item-{}", n), 0, "bulk").await.unwrap();
        updates.push(ItemUpdate::new(id, format!("renamed-{}", n), n as i32));
    }

    // an id that does not exist is skipped, not an error
    updates.push(ItemUpdate::new(99_999, "missing", 1));
    inventory.update_items(&updates).await.unwrap();

    let mut items = inventory.list_for_user("bulk").await.unwrap();
    items.sort_by_key(|i| i.id);
    assert_eq!(items.len(), count);
    for (n, item) in items.iter().enumerate() {
        assert_eq!(item.name, format!("renamed-{}", n));
        assert_eq!(item.amount, n as i32);
    }
}

#[tokio::test]
async fn test_repeated_id_keeps_last_update() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    let inventory = t.db.inventory();

    let id = inventory.add_item("apples", 4, "login").await.unwrap();
    let updates: Vec<_> = (0..5)
        .map(|n| ItemUpdate::new(id, format!("v{}", n), n))
        .collect();
    inventory.update_items(&updates).await.unwrap();

    let items = inventory.list_for_user("login").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].name.as_str(), items[0].amount), ("v4", 4));

    // the same id split across two batches
    let mut updates: Vec<_> = (0..UPDATE_BATCH_SIZE as i32)
        .map(|n| ItemUpdate::new(id, format!("early-{}", n), n))
        .collect();
    updates.push(ItemUpdate::new(id, "late", 99));
    inventory.update_items(&updates).await.unwrap();

    let items = inventory.list_for_user("login").await.unwrap();
    assert_eq!((items[0].name.as_str(), items[0].amount), ("late", 99));
}

#[tokio::test]
async fn test_delete_item() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    let inventory = t.db.inventory();

    let keep = inventory.add_item("apples", 4, "login").await.unwrap();
    let gone = inventory.add_item("plums", 1, "login").await.unwrap();

    inventory.delete_item(gone).await.unwrap();
    let items = inventory.list_for_user("login").await.unwrap();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![keep]);

    // deleting again, or deleting an unknown id, is a no-op
    inventory.delete_item(gone).await.unwrap();
    inventory.delete_item(424_242).await.unwrap();
    assert_eq!(inventory.list_for_user("login").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_restarts_sequences() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    t.db.inventory().add_item("apples", 4, "login").await.unwrap();
    t.db.inventory().add_item("pears", 4, "login").await.unwrap();

    t.db.inventory().reset_all().await.unwrap();
    assert!(t.db.inventory().list_for_user("login").await.unwrap().is_empty());
    assert_eq!(t.db.inventory().add_item("kiwis", 1, "login").await.unwrap(), 1);

    t.db.clean_database().await.unwrap();
    t.db.credentials().register("fresh", "fresh").await.unwrap();
    let fresh = t.db.credentials().fetch_by_username("fresh").await.unwrap().unwrap();
    assert_eq!(fresh.id, 1);
}

#[tokio::test]
async fn test_failed_reset_rolls_back() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    t.db.inventory().add_item("apples", 4, "login").await.unwrap();

    // inventory rows still reference the user, so clearing users fails
    match t.db.credentials().reset_all().await {
        Err(DatabaseError::QueryError(_)) => (),
        other => panic!("Expected query error, got {:?}", other),
    }
    assert!(t.db.credentials().fetch_by_username("login").await.unwrap().is_some());

    // the connection is back in autocommit mode: plain writes are visible
    // to another session without any commit
    t.db.credentials().register("after", "after").await.unwrap();
    t.db.inventory().add_item("pears", 2, "login").await.unwrap();

    let observer = common::observer_db().await;
    assert!(observer.credentials().fetch_by_username("after").await.unwrap().is_some());
    assert_eq!(observer.inventory().list_for_user("login").await.unwrap().len(), 2);
    observer.supervisor().close().await;
}

#[tokio::test]
async fn test_writes_after_reset_are_committed() {
    let Some(t) = common::test_db().await else { return };

    t.db.inventory().reset_all().await.unwrap();
    t.db.credentials().register("login", "login").await.unwrap();
    let id = t.db.inventory().add_item("apples", 4, "login").await.unwrap();

    let observer = common::observer_db().await;
    let seen = observer.inventory().list_for_user("login").await.unwrap();
    assert_eq!(seen.iter().map(|i| i.id).collect::<Vec<_>>(), vec![id]);
    observer.supervisor().close().await;
}

#[tokio::test]
async fn test_health_check_replaces_dead_connection() {
    let Some(t) = common::test_db().await else { return };
    t.db.credentials().register("login", "login").await.unwrap();
    let supervisor = t.db.supervisor();

    {
        let mut conn = supervisor.acquire().await.unwrap();
        // the server ends this session; the statement itself may error
        let _ = sqlx::query("SELECT pg_terminate_backend(pg_backend_pid())")
            .execute(&mut *conn)
            .await;
    }

    match t.db.credentials().fetch_by_username("login").await {
        Err(DatabaseError::Unavailable(_)) => (),
        other => panic!("Expected store unavailable, got {:?}", other),
    }

    assert!(supervisor.check().await);
    assert!(supervisor.is_connected().await);

    let user = t.db.credentials().fetch_by_username("login").await.unwrap();
    assert_eq!(user.map(|u| u.username), Some("login".to_string()));
}

#[tokio::test]
async fn test_store_calls_fail_when_connection_is_down() {
    let db = common::unreachable_db();

    assert!(matches!(
        db.credentials().register("u", "p").await,
        Err(DatabaseError::Unavailable(_))
    ));
    assert!(matches!(
        db.inventory().list_for_user("u").await,
        Err(DatabaseError::Unavailable(_))
    ));
    assert!(matches!(
        db.inventory().delete_item(1).await,
        Err(DatabaseError::Unavailable(_))
    ));
}
