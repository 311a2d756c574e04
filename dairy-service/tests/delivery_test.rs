//! Delivery ledger integration tests.
//!
//! Run with a live PostgreSQL: TEST_DATABASE_URL=... cargo test -- --ignored

mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore]
async fn recording_same_day_twice_overwrites() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let customer = app
        .create_customer(owner, agent, "Asha", "North", Some(dec!(60)))
        .await;

    // First write: 1.5L at rate 60 -> 90.00
    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": customer,
                "delivery_man_id": agent,
                "quantity": 1.5,
                "delivery_date": "2024-10-05",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["delivery"]["total_amount"].as_f64(), Some(90.0));
    assert_eq!(body["message"].as_str(), Some("Delivery recorded successfully"));

    // Second write for the same day replaces the record entirely
    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": customer,
                "delivery_man_id": agent,
                "quantity": 1.0,
                "delivery_date": "2024-10-05",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["delivery"]["quantity"].as_f64(), Some(1.0));
    assert_eq!(body["delivery"]["total_amount"].as_f64(), Some(60.0));

    // Exactly one record remains for that day
    let response = app
        .get_as(
            "delivery_man",
            agent,
            &format!("/delivery/record?delivery_man_id={}&date=2024-10-05", agent),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let deliveries = body["deliveries"].as_array().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0]["quantity"].as_f64(), Some(1.0));

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn rate_is_snapshotted_at_write_time() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let customer = app
        .create_customer(owner, agent, "Asha", "North", Some(dec!(60)))
        .await;

    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": customer,
                "delivery_man_id": agent,
                "quantity": 2.0,
                "delivery_date": "2024-10-05",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // Raise the rate; the stored record keeps the old snapshot
    let response = app
        .client
        .put(format!("{}/customers/{}", app.address, customer))
        .header("x-caller-role", "owner")
        .header("x-caller-id", owner.to_string())
        .json(&json!({ "rate_per_liter": 80.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .get_as(
            "owner",
            owner,
            &format!("/customers/{}?month=10&year=2024", customer),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let deliveries = body["deliveries"].as_array().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0]["rate_per_liter"].as_f64(), Some(60.0));
    assert_eq!(deliveries[0]["amount"].as_f64(), Some(120.0));

    // New deliveries pick up the new rate
    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": customer,
                "delivery_man_id": agent,
                "quantity": 1.0,
                "delivery_date": "2024-10-06",
            }),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["delivery"]["total_amount"].as_f64(), Some(80.0));

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn rejects_missing_and_invalid_quantity() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let customer = app
        .create_customer(owner, agent, "Asha", "North", None)
        .await;

    // Missing quantity
    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({ "customer_id": customer, "delivery_man_id": agent }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    // Zero quantity
    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": customer,
                "delivery_man_id": agent,
                "quantity": 0.0,
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn rejects_unknown_customer() {
    let app = TestApp::spawn().await;
    let agent = app.seed_agent("Ravi").await;

    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": Uuid::new_v4(),
                "delivery_man_id": agent,
                "quantity": 1.0,
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn enforces_caller_context() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let other_agent = app.seed_agent("Mohan").await;
    let customer = app
        .create_customer(owner, agent, "Asha", "North", None)
        .await;

    let body = json!({
        "customer_id": customer,
        "delivery_man_id": agent,
        "quantity": 1.0,
    });

    // No caller headers at all
    let response = app
        .client
        .post(format!("{}/delivery/record", app.address))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // An agent cannot record under another agent's id
    let response = app
        .record_delivery("delivery_man", other_agent, body.clone())
        .await;
    assert_eq!(response.status().as_u16(), 403);

    // Customers cannot record at all
    let response = app.record_delivery("customer", customer, body.clone()).await;
    assert_eq!(response.status().as_u16(), 403);

    // The owner may record on any agent's behalf
    let response = app.record_delivery("owner", owner, body).await;
    assert_eq!(response.status().as_u16(), 200);

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn listing_orders_most_recent_write_first() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let first = app
        .create_customer(owner, agent, "Asha", "North", None)
        .await;
    let second = app
        .create_customer(owner, agent, "Binita", "North", None)
        .await;

    for customer in [first, second] {
        let response = app
            .record_delivery(
                "delivery_man",
                agent,
                json!({
                    "customer_id": customer,
                    "delivery_man_id": agent,
                    "quantity": 1.0,
                    "delivery_date": "2024-10-05",
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }

    let response = app
        .get_as(
            "delivery_man",
            agent,
            &format!("/delivery/record?delivery_man_id={}&date=2024-10-05", agent),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let deliveries = body["deliveries"].as_array().unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0]["customer_name"].as_str(), Some("Binita"));
    assert_eq!(deliveries[1]["customer_name"].as_str(), Some("Asha"));

    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn concurrent_same_day_writes_leave_one_record() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let customer = app
        .create_customer(owner, agent, "Asha", "North", Some(dec!(60)))
        .await;

    let make_body = |quantity: f64| {
        json!({
            "customer_id": customer,
            "delivery_man_id": agent,
            "quantity": quantity,
            "delivery_date": "2024-10-05",
        })
    };

    // Race two writes for the same (customer, day). The upsert serializes on
    // the unique constraint: neither caller sees a duplicate-key failure.
    let (first, second) = tokio::join!(
        app.record_delivery("delivery_man", agent, make_body(1.0)),
        app.record_delivery("delivery_man", agent, make_body(2.0)),
    );
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);

    let response = app
        .get_as(
            "delivery_man",
            agent,
            &format!("/delivery/record?delivery_man_id={}&date=2024-10-05", agent),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let deliveries = body["deliveries"].as_array().unwrap();
    assert_eq!(deliveries.len(), 1);
    let quantity = deliveries[0]["quantity"].as_f64().unwrap();
    assert!(quantity == 1.0 || quantity == 2.0, "got {}", quantity);

    app.cleanup().await;
}
