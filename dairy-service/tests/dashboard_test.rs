//! Owner dashboard integration tests.
//!
//! Run with a live PostgreSQL: TEST_DATABASE_URL=... cargo test -- --ignored

mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn dashboard_reflects_the_days_ledger() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;
    let recorded = app
        .create_customer(owner, agent, "Asha", "North", Some(dec!(60)))
        .await;
    let _pending = app
        .create_customer(owner, agent, "Binita", "South", Some(dec!(60)))
        .await;

    let response = app
        .record_delivery(
            "delivery_man",
            agent,
            json!({
                "customer_id": recorded,
                "delivery_man_id": agent,
                "quantity": 1.5,
                "delivery_date": "2024-10-05",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .get_as("owner", owner, "/owner/dashboard?date=2024-10-05")
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();

    let stats = &body["todayStats"];
    assert_eq!(stats["totalMilkDelivered"].as_f64(), Some(1.5));
    assert_eq!(stats["totalRevenue"].as_f64(), Some(90.0));
    assert_eq!(stats["totalCustomers"].as_i64(), Some(2));
    assert_eq!(stats["completedDeliveries"].as_i64(), Some(1));
    assert_eq!(stats["pendingDeliveries"].as_i64(), Some(1));
    assert_eq!(stats["activeDeliveryMen"].as_i64(), Some(1));

    let agents = body["deliveryMenStats"].as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["name"].as_str(), Some("Ravi"));
    assert_eq!(agents[0]["customers"].as_i64(), Some(2));
    assert_eq!(agents[0]["completed"].as_i64(), Some(1));
    assert_eq!(agents[0]["pending"].as_i64(), Some(1));
    assert_eq!(agents[0]["milkDelivered"].as_f64(), Some(1.5));
    let areas = agents[0]["area"].as_str().unwrap();
    assert!(areas.contains("North") && areas.contains("South"), "got {}", areas);

    let activity = body["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0]["type"].as_str(), Some("delivery"));
    assert_eq!(activity[0]["customerName"].as_str(), Some("Asha"));
    assert_eq!(activity[0]["deliveryManName"].as_str(), Some("Ravi"));

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn pending_count_is_never_negative() {
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
                "quantity": 1.0,
                "delivery_date": "2024-10-05",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // Deactivate the recorded customer: it drops out of the active set while
    // its delivery record remains in the ledger.
    let response = app
        .client
        .delete(format!("{}/customers/{}", app.address, customer))
        .header("x-caller-role", "owner")
        .header("x-caller-id", owner.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .get_as("owner", owner, "/owner/dashboard?date=2024-10-05")
        .await;
    let body: Value = response.json().await.unwrap();
    let pending = body["todayStats"]["pendingDeliveries"].as_i64().unwrap();
    assert!(pending >= 0, "pending went negative: {}", pending);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn dashboard_requires_owner_role() {
    let app = TestApp::spawn().await;
    let agent = app.seed_agent("Ravi").await;

    let response = app.get_as("delivery_man", agent, "/owner/dashboard").await;
    assert_eq!(response.status().as_u16(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn recent_activity_is_capped_and_newest_first() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let agent = app.seed_agent("Ravi").await;

    let mut last_name = String::new();
    for i in 0..12 {
        let name = format!("Customer{:02}", i);
        let customer = app
            .create_customer(owner, agent, &name, "North", Some(dec!(60)))
            .await;
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
        last_name = name;
    }

    let response = app
        .get_as("owner", owner, "/owner/dashboard?date=2024-10-05")
        .await;
    let body: Value = response.json().await.unwrap();
    let activity = body["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 10);
    assert_eq!(activity[0]["customerName"].as_str(), Some(last_name.as_str()));

    app.cleanup().await;
}
