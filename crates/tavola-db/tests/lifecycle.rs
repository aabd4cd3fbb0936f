//! End-to-end tests for the table / order / line lifecycle against an
//! in-memory SQLite database.

use tavola_core::{DomainError, LineStatus, OrderStatus, TableStatus};
use tavola_db::{Database, DbConfig, LineDraft, ServiceError};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Seeds one menu item and returns its id.
async fn seed_item(db: &Database, name: &str, price_cents: i64) -> String {
    db.menu_repo()
        .create(name, None, "Mains", price_cents)
        .await
        .unwrap()
        .id
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

// =============================================================================
// Tables
// =============================================================================

#[tokio::test]
async fn create_and_list_tables() {
    let db = test_db().await;

    let t1 = db.tables().create_table("1", 4).await.unwrap();
    db.tables().create_table("2", 2).await.unwrap();

    assert_eq!(t1.status, TableStatus::Available);
    assert_eq!(t1.current_order_id, None);

    let all = db.tables().list().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn duplicate_table_number_rejected() {
    let db = test_db().await;

    db.tables().create_table("12", 4).await.unwrap();
    let err = domain(db.tables().create_table("12", 6).await.unwrap_err());
    assert!(matches!(err, DomainError::DuplicateTableNumber(n) if n == "12"));
}

#[tokio::test]
async fn set_status_is_idempotent_and_clears_order_ref() {
    let db = test_db().await;
    let table = db.tables().create_table("5", 4).await.unwrap();
    let item = seed_item(&db, "Tiramisu", 700).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let occupied = db.tables().get(&table.id).await.unwrap();
    assert_eq!(occupied.status, TableStatus::Occupied);
    assert_eq!(occupied.current_order_id, Some(opened.order.id.clone()));

    // Re-asserting the current status is a no-op, not an error.
    let same = db
        .tables()
        .set_status(&table.id, TableStatus::Occupied)
        .await
        .unwrap();
    assert_eq!(same.status, TableStatus::Occupied);

    // Forcing the table back to available clears the bound order.
    let freed = db
        .tables()
        .set_status(&table.id, TableStatus::Available)
        .await
        .unwrap();
    assert_eq!(freed.status, TableStatus::Available);
    assert_eq!(freed.current_order_id, None);
}

#[tokio::test]
async fn delete_occupied_table_refused() {
    let db = test_db().await;
    let table = db.tables().create_table("3", 4).await.unwrap();
    let item = seed_item(&db, "Lasagna al Forno", 1450).await;

    db.orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let err = domain(db.tables().delete(&table.id).await.unwrap_err());
    assert!(matches!(err, DomainError::TableOccupied { .. }));

    // Reserved tables can be removed.
    let spare = db.tables().create_table("4", 2).await.unwrap();
    db.tables()
        .set_status(&spare.id, TableStatus::Reserved)
        .await
        .unwrap();
    db.tables().delete(&spare.id).await.unwrap();
}

// =============================================================================
// Opening Orders
// =============================================================================

#[tokio::test]
async fn open_order_computes_totals_and_binds_table() {
    let db = test_db().await;
    let table = db.tables().create_table("7", 4).await.unwrap();
    let pizza = seed_item(&db, "Margherita Pizza", 1000).await;
    let wine = seed_item(&db, "House Red (glass)", 500).await;

    // Two pizzas + one glass of wine at the default 5% rate.
    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[
                LineDraft {
                    menu_item_id: pizza,
                    quantity: 2,
                },
                LineDraft {
                    menu_item_id: wine,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();

    assert!(opened.warnings.is_empty());
    assert_eq!(opened.order.status, OrderStatus::Open);
    assert_eq!(opened.order.subtotal_cents, 2500);
    assert_eq!(opened.order.tax_cents, 125);
    assert_eq!(opened.order.total_cents, 2625);

    let lines = db.orders().lines(&opened.order.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].line_index, 0);
    assert_eq!(lines[1].line_index, 1);
    assert!(lines.iter().all(|l| l.status == LineStatus::Pending));

    let bound = db.tables().get(&table.id).await.unwrap();
    assert_eq!(bound.status, TableStatus::Occupied);
    assert_eq!(bound.current_order_id, Some(opened.order.id));
}

#[tokio::test]
async fn open_order_on_occupied_table_refused() {
    let db = test_db().await;
    let table = db.tables().create_table("8", 4).await.unwrap();
    let item = seed_item(&db, "Espresso", 250).await;

    db.orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item.clone(),
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let err = domain(
        db.orders()
            .open_order(
                &table.id,
                &[LineDraft {
                    menu_item_id: item,
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::TableNotAvailable { .. }));
}

#[tokio::test]
async fn open_order_skips_unavailable_items_with_warning() {
    let db = test_db().await;
    let table = db.tables().create_table("9", 4).await.unwrap();
    let soup = seed_item(&db, "Minestrone Soup", 600).await;
    let special = seed_item(&db, "Seasonal Special", 1800).await;
    db.menu_repo().set_availability(&special, false).await.unwrap();

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[
                LineDraft {
                    menu_item_id: soup,
                    quantity: 1,
                },
                LineDraft {
                    menu_item_id: special,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(opened.warnings.len(), 1);
    assert!(opened.warnings[0].contains("Seasonal Special"));

    let lines = db.orders().lines(&opened.order.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(opened.order.subtotal_cents, 600);
}

#[tokio::test]
async fn open_order_skips_unknown_items_with_warning() {
    let db = test_db().await;
    let table = db.tables().create_table("10", 2).await.unwrap();
    let soup = seed_item(&db, "Minestrone Soup", 600).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[
                LineDraft {
                    menu_item_id: soup,
                    quantity: 1,
                },
                LineDraft {
                    menu_item_id: "no-such-item".to_string(),
                    quantity: 2,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(opened.warnings.len(), 1);
    assert!(opened.warnings[0].contains("no-such-item"));

    let lines = db.orders().lines(&opened.order.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name_snapshot, "Minestrone Soup");
    assert_eq!(opened.order.subtotal_cents, 600);
}

// =============================================================================
// Line-Items
// =============================================================================

#[tokio::test]
async fn add_line_snapshots_price_and_updates_totals() {
    let db = test_db().await;
    let table = db.tables().create_table("10", 2).await.unwrap();
    let pasta = seed_item(&db, "Spaghetti Carbonara", 1350).await;

    let opened = db.orders().open_order(&table.id, &[]).await.unwrap();
    assert_eq!(opened.order.total_cents, 0);

    let line = db.orders().add_line(&opened.order.id, &pasta, 2).await.unwrap();
    assert_eq!(line.line_index, 0);
    assert_eq!(line.unit_price_cents, 1350);
    assert_eq!(line.name_snapshot, "Spaghetti Carbonara");

    // Repricing the catalog must not touch the existing order line.
    db.menu_repo().update_price(&pasta, 9999).await.unwrap();

    let order = db.orders().get(&opened.order.id).await.unwrap();
    assert_eq!(order.subtotal_cents, 2700);
    assert_eq!(order.tax_cents, 135);
    assert_eq!(order.total_cents, 2835);

    let lines = db.orders().lines(&order.id).await.unwrap();
    assert_eq!(lines[0].unit_price_cents, 1350);
}

#[tokio::test]
async fn add_unavailable_item_refused() {
    let db = test_db().await;
    let table = db.tables().create_table("11", 2).await.unwrap();
    let item = seed_item(&db, "Grilled Salmon", 1950).await;
    db.menu_repo().set_availability(&item, false).await.unwrap();

    let opened = db.orders().open_order(&table.id, &[]).await.unwrap();
    let err = domain(db.orders().add_line(&opened.order.id, &item, 1).await.unwrap_err());
    assert!(matches!(err, DomainError::ItemUnavailable { .. }));
}

#[tokio::test]
async fn line_walks_forward_and_rejects_backward() {
    let db = test_db().await;
    let table = db.tables().create_table("14", 4).await.unwrap();
    let item = seed_item(&db, "Calamari Fritti", 1150).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();
    let order_id = opened.order.id;

    let line = db
        .orders()
        .set_line_status(&order_id, 0, LineStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(line.status, LineStatus::Preparing);

    let line = db
        .orders()
        .set_line_status(&order_id, 0, LineStatus::Served)
        .await
        .unwrap();
    assert_eq!(line.status, LineStatus::Served);

    let err = domain(
        db.orders()
            .set_line_status(&order_id, 0, LineStatus::Preparing)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::InvalidLineTransition { .. }));
}

#[tokio::test]
async fn line_status_same_value_is_noop() {
    let db = test_db().await;
    let table = db.tables().create_table("15", 4).await.unwrap();
    let item = seed_item(&db, "Panna Cotta", 650).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    // Double-delivery of the same transition must not error.
    db.orders()
        .set_line_status(&opened.order.id, 0, LineStatus::Preparing)
        .await
        .unwrap();
    let line = db
        .orders()
        .set_line_status(&opened.order.id, 0, LineStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(line.status, LineStatus::Preparing);
}

#[tokio::test]
async fn cancelling_a_line_drops_it_from_totals() {
    let db = test_db().await;
    let table = db.tables().create_table("16", 4).await.unwrap();
    let pizza = seed_item(&db, "Diavola Pizza", 1000).await;
    let dessert = seed_item(&db, "Gelato (2 scoops)", 500).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[
                LineDraft {
                    menu_item_id: pizza,
                    quantity: 2,
                },
                LineDraft {
                    menu_item_id: dessert,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(opened.order.total_cents, 2625);

    db.orders()
        .set_line_status(&opened.order.id, 1, LineStatus::Cancelled)
        .await
        .unwrap();

    let order = db.orders().get(&opened.order.id).await.unwrap();
    assert_eq!(order.subtotal_cents, 2000);
    assert_eq!(order.tax_cents, 100);
    assert_eq!(order.total_cents, 2100);

    // The cancelled line stays in the sequence for audit.
    let lines = db.orders().lines(&order.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].status, LineStatus::Cancelled);

    // And cancellation is terminal.
    let err = domain(
        db.orders()
            .set_line_status(&order.id, 1, LineStatus::Pending)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::InvalidLineTransition { .. }));
}

#[tokio::test]
async fn missing_line_index_is_not_found() {
    let db = test_db().await;
    let table = db.tables().create_table("17", 4).await.unwrap();
    let item = seed_item(&db, "Bruschetta", 650).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let err = domain(
        db.orders()
            .set_line_status(&opened.order.id, 5, LineStatus::Preparing)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::OrderLineNotFound { index: 5, .. }));
}

// =============================================================================
// Closing
// =============================================================================

#[tokio::test]
async fn close_freezes_the_order() {
    let db = test_db().await;
    let table = db.tables().create_table("20", 4).await.unwrap();
    let item = seed_item(&db, "Risotto ai Funghi", 1550).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item.clone(),
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let closed = db.orders().close_order(&opened.order.id).await.unwrap();
    assert_eq!(closed.status, OrderStatus::Closed);
    assert!(closed.closed_at.is_some());

    // No line edits after close.
    let err = domain(db.orders().add_line(&closed.id, &item, 1).await.unwrap_err());
    assert!(matches!(err, DomainError::OrderNotOpen { .. }));

    let err = domain(
        db.orders()
            .set_line_status(&closed.id, 0, LineStatus::Served)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::OrderNotOpen { .. }));

    // Closing twice is refused, not silently absorbed.
    let err = domain(db.orders().close_order(&closed.id).await.unwrap_err());
    assert!(matches!(err, DomainError::OrderNotOpen { .. }));

    // The table stays occupied until billing releases it.
    let bound = db.tables().get(&table.id).await.unwrap();
    assert_eq!(bound.status, TableStatus::Occupied);
}

#[tokio::test]
async fn close_with_only_cancelled_lines_refused() {
    let db = test_db().await;
    let table = db.tables().create_table("21", 4).await.unwrap();
    let item = seed_item(&db, "Garlic Bread", 450).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    db.orders()
        .set_line_status(&opened.order.id, 0, LineStatus::Cancelled)
        .await
        .unwrap();

    let err = domain(db.orders().close_order(&opened.order.id).await.unwrap_err());
    assert!(matches!(err, DomainError::NoActiveLineItems(_)));
}

// =============================================================================
// Kitchen Projection
// =============================================================================

#[tokio::test]
async fn kitchen_queue_orders_by_age_then_preparing_first() {
    let db = test_db().await;
    let t1 = db.tables().create_table("k1", 4).await.unwrap();
    let t2 = db.tables().create_table("k2", 4).await.unwrap();
    let pizza = seed_item(&db, "Margherita Pizza", 1200).await;
    let pasta = seed_item(&db, "Spaghetti Carbonara", 1350).await;

    // Older order with two lines, second one already on the stove.
    let first = db
        .orders()
        .open_order(
            &t1.id,
            &[
                LineDraft {
                    menu_item_id: pizza.clone(),
                    quantity: 1,
                },
                LineDraft {
                    menu_item_id: pasta.clone(),
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();
    db.orders()
        .set_line_status(&first.order.id, 1, LineStatus::Preparing)
        .await
        .unwrap();

    // Newer order.
    let second = db
        .orders()
        .open_order(
            &t2.id,
            &[LineDraft {
                menu_item_id: pizza,
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    let queue = db.kitchen().list_in_flight().await.unwrap();
    assert_eq!(queue.len(), 3);

    // Oldest order first; within it, preparing before pending.
    assert_eq!(queue[0].order_id, first.order.id);
    assert_eq!(queue[0].status, LineStatus::Preparing);
    assert_eq!(queue[0].line_index, 1);
    assert_eq!(queue[1].order_id, first.order.id);
    assert_eq!(queue[1].status, LineStatus::Pending);
    assert_eq!(queue[2].order_id, second.order.id);

    // Served and cancelled lines leave the queue.
    db.orders()
        .set_line_status(&first.order.id, 1, LineStatus::Served)
        .await
        .unwrap();
    db.orders()
        .set_line_status(&first.order.id, 0, LineStatus::Cancelled)
        .await
        .unwrap();
    let queue = db.kitchen().list_in_flight().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].order_id, second.order.id);
}

#[tokio::test]
async fn kitchen_queue_drops_closed_orders() {
    let db = test_db().await;
    let table = db.tables().create_table("k3", 4).await.unwrap();
    let item = seed_item(&db, "Chicken Parmigiana", 1650).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    assert_eq!(db.kitchen().list_in_flight().await.unwrap().len(), 1);

    // Even a still-pending line disappears once the order closes.
    db.orders().close_order(&opened.order.id).await.unwrap();
    assert!(db.kitchen().list_in_flight().await.unwrap().is_empty());
}
