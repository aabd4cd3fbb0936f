//! End-to-end tests for bill finalization and reporting.

use chrono::{Duration, Utc};
use tavola_core::{DomainError, LineStatus, OrderStatus, PaymentMethod, TableStatus};
use tavola_db::{Database, DbConfig, LineDraft, ServiceError};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

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

/// Seeds a table with one closed order: qty 2 @ $10.00 + qty 1 @ $5.00
/// at the default 5% rate, so the frozen total is $26.25.
async fn closed_order(db: &Database, table_number: &str) -> (String, String) {
    let table = db.tables().create_table(table_number, 4).await.unwrap();
    let pizza = seed_item(db, "Margherita Pizza", 1000).await;
    let wine = seed_item(db, "House Red (glass)", 500).await;

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
    db.orders().close_order(&opened.order.id).await.unwrap();

    (table.id, opened.order.id)
}

// =============================================================================
// Finalize
// =============================================================================

#[tokio::test]
async fn finalize_produces_bill_and_releases_table() {
    let db = test_db().await;
    let (table_id, order_id) = closed_order(&db, "30").await;

    let bill = db
        .billing()
        .finalize_bill(&order_id, 0, PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(bill.subtotal_cents, 2500);
    assert_eq!(bill.tax_cents, 125);
    assert_eq!(bill.total_cents, 2625);
    assert_eq!(bill.discount_cents, 0);
    assert_eq!(bill.tax_rate_bps, 500);
    assert_eq!(bill.table_number, "30");

    // Order is terminal and back-references the bill.
    let order = db.orders().get(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Billed);
    assert_eq!(order.bill_id, Some(bill.id.clone()));

    // The table went back to available with no bound order.
    let table = db.tables().get(&table_id).await.unwrap();
    assert_eq!(table.status, TableStatus::Available);
    assert_eq!(table.current_order_id, None);

    // The bill snapshotted both live lines.
    let lines = db.billing().bill_lines(&bill.id).await.unwrap();
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn finalize_applies_discount_with_floor_at_zero() {
    let db = test_db().await;
    let (_, order_id) = closed_order(&db, "31").await;

    // $26.25 − $1.25 = $25.00
    let bill = db
        .billing()
        .finalize_bill(&order_id, 125, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(bill.total_cents, 2500);
    assert_eq!(bill.discount_cents, 125);

    // A discount above the total clamps to zero on a fresh order.
    let (_, order_id) = closed_order(&db, "32").await;
    let bill = db
        .billing()
        .finalize_bill(&order_id, 999_999, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(bill.total_cents, 0);
}

#[tokio::test]
async fn negative_discount_rejected() {
    let db = test_db().await;
    let (_, order_id) = closed_order(&db, "33").await;

    let err = domain(
        db.billing()
            .finalize_bill(&order_id, -100, PaymentMethod::Cash)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::InvalidDiscount(-100)));
}

#[tokio::test]
async fn finalize_requires_closed_order() {
    let db = test_db().await;
    let table = db.tables().create_table("34", 4).await.unwrap();
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

    let err = domain(
        db.billing()
            .finalize_bill(&opened.order.id, 0, PaymentMethod::Cash)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::OrderNotClosed { .. }));

    let err = domain(
        db.billing()
            .finalize_bill("no-such-order", 0, PaymentMethod::Cash)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::OrderNotFound(_)));
}

#[tokio::test]
async fn second_finalize_is_already_billed() {
    let db = test_db().await;
    let (_, order_id) = closed_order(&db, "35").await;

    db.billing()
        .finalize_bill(&order_id, 0, PaymentMethod::Cash)
        .await
        .unwrap();

    let err = domain(
        db.billing()
            .finalize_bill(&order_id, 0, PaymentMethod::Card)
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::AlreadyBilled(_)));

    // Exactly one bill exists for the order.
    let bill = db.billing().get_for_order(&order_id).await.unwrap();
    assert!(bill.is_some());
}

#[tokio::test]
async fn cancelled_lines_never_reach_the_bill() {
    let db = test_db().await;
    let table = db.tables().create_table("36", 4).await.unwrap();
    let pizza = seed_item(&db, "Diavola Pizza", 1400).await;
    let salad = seed_item(&db, "Caprese Salad", 850).await;

    let opened = db
        .orders()
        .open_order(
            &table.id,
            &[
                LineDraft {
                    menu_item_id: pizza,
                    quantity: 1,
                },
                LineDraft {
                    menu_item_id: salad,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();
    db.orders()
        .set_line_status(&opened.order.id, 1, LineStatus::Cancelled)
        .await
        .unwrap();
    db.orders().close_order(&opened.order.id).await.unwrap();

    let bill = db
        .billing()
        .finalize_bill(&opened.order.id, 0, PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(bill.subtotal_cents, 1400);
    let lines = db.billing().bill_lines(&bill.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name_snapshot, "Diavola Pizza");
}

#[tokio::test]
async fn table_is_reusable_after_billing() {
    let db = test_db().await;
    let (table_id, order_id) = closed_order(&db, "37").await;
    db.billing()
        .finalize_bill(&order_id, 0, PaymentMethod::Cash)
        .await
        .unwrap();

    // The next party can be seated at the same table straight away.
    let item = seed_item(&db, "Espresso", 250).await;
    let opened = db
        .orders()
        .open_order(
            &table_id,
            &[LineDraft {
                menu_item_id: item,
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(opened.order.status, OrderStatus::Open);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn today_summary_aggregates_bills() {
    let db = test_db().await;

    let (_, o1) = closed_order(&db, "40").await;
    let (_, o2) = closed_order(&db, "41").await;
    db.billing()
        .finalize_bill(&o1, 0, PaymentMethod::Cash)
        .await
        .unwrap();
    db.billing()
        .finalize_bill(&o2, 125, PaymentMethod::Card)
        .await
        .unwrap();

    let summary = db.reports().today_summary().await.unwrap();
    assert_eq!(summary.bill_count, 2);
    assert_eq!(summary.subtotal_cents, 5000);
    assert_eq!(summary.tax_cents, 250);
    assert_eq!(summary.discount_cents, 125);
    assert_eq!(summary.total_cents, 2625 + 2500);

    // An empty window aggregates to zeroes, not an error.
    let long_ago = Utc::now() - Duration::days(30);
    let empty = db
        .reports()
        .summary_between(long_ago, long_ago + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(empty.bill_count, 0);
    assert_eq!(empty.total_cents, 0);
}

#[tokio::test]
async fn top_items_ranked_by_quantity() {
    let db = test_db().await;
    let pizza = seed_item(&db, "Margherita Pizza", 1000).await;
    let wine = seed_item(&db, "House Red (glass)", 500).await;

    // Two parties; the pizza sells 2 + 2, the wine 1 + 1.
    for number in ["42", "43"] {
        let table = db.tables().create_table(number, 4).await.unwrap();
        let opened = db
            .orders()
            .open_order(
                &table.id,
                &[
                    LineDraft {
                        menu_item_id: pizza.clone(),
                        quantity: 2,
                    },
                    LineDraft {
                        menu_item_id: wine.clone(),
                        quantity: 1,
                    },
                ],
            )
            .await
            .unwrap();
        db.orders().close_order(&opened.order.id).await.unwrap();
        db.billing()
            .finalize_bill(&opened.order.id, 0, PaymentMethod::Cash)
            .await
            .unwrap();
    }

    let from = Utc::now() - Duration::hours(1);
    let to = Utc::now() + Duration::hours(1);
    let top = db.reports().top_items(from, to, 10).await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name_snapshot, "Margherita Pizza");
    assert_eq!(top[0].total_quantity, 4);
    assert_eq!(top[0].total_cents, 4000);
    assert_eq!(top[1].name_snapshot, "House Red (glass)");
    assert_eq!(top[1].total_quantity, 2);
}
