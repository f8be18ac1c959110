use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ledger::Ledger;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app_with_account() -> (Router, Ledger) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build();
    ledger.open_account("alice").await.unwrap();
    (server::app(ledger.clone()), ledger)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-account-id", "alice")
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_entry_then_read_balance() {
    let (app, _ledger) = app_with_account().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/entries",
            Some(json!({
                "title": "Salary",
                "amount_cents": 100,
                "kind": "income",
                "occurred_at": "2026-03-10T12:00:00+00:00",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(body.get("id").is_some());

    let response = app
        .oneshot(request("GET", "/balance", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["balance_cents"], 100);
}

#[tokio::test]
async fn missing_owner_header_is_unauthorized() {
    let (app, _ledger) = app_with_account().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/balance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_owner_is_not_found() {
    let (app, _ledger) = app_with_account().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/balance")
                .header("x-account-id", "mallory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_amount_is_unprocessable() {
    let (app, _ledger) = app_with_account().await;

    let response = app
        .oneshot(request(
            "POST",
            "/entries",
            Some(json!({
                "title": "Broken",
                "amount_cents": -5,
                "kind": "expense",
                "occurred_at": "2026-03-10T12:00:00+00:00",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn daily_view_lists_entries_for_date() {
    let (app, ledger) = app_with_account().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/entries",
            Some(json!({
                "title": "Salary",
                "description": "March",
                "amount_cents": 1000,
                "kind": "income",
                "occurred_at": "2026-03-10T12:00:00+00:00",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("GET", "/entries?date=2026-03-10", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["balance_cents"], 1000);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["entries"][0]["title"], "Salary");
    assert_eq!(body["entries"][0]["description"], "March");

    // Sanity-check against the engine directly.
    assert_eq!(
        ledger.balance("alice").await.unwrap(),
        ledger::MoneyCents::new(1000)
    );
}

#[tokio::test]
async fn edit_and_delete_round_trip() {
    let (app, ledger) = app_with_account().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/entries",
            Some(json!({
                "title": "Salary",
                "amount_cents": 100,
                "kind": "income",
                "occurred_at": "2026-03-10T12:00:00+00:00",
            })),
        ))
        .await
        .unwrap();
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/entries/{id}"),
            Some(json!({
                "title": "Salary",
                "amount_cents": 40,
                "kind": "income",
                "occurred_at": "2026-03-10T12:00:00+00:00",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        ledger.balance("alice").await.unwrap(),
        ledger::MoneyCents::new(40)
    );

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/entries/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        ledger.balance("alice").await.unwrap(),
        ledger::MoneyCents::ZERO
    );

    let response = app
        .oneshot(request("DELETE", &format!("/entries/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn balance_adjustment_sets_balance_and_reports_entry() {
    let (app, ledger) = app_with_account().await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/balance",
            Some(json!({ "balance_cents": 500 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["balance_cents"], 500);
    assert!(body.get("entry_id").is_some());

    assert_eq!(
        ledger.audit_balance("alice").await.unwrap(),
        ledger::MoneyCents::new(500)
    );
}

#[tokio::test]
async fn monthly_report_returns_totals() {
    let (app, _ledger) = app_with_account().await;

    for (title, amount, kind, day) in [
        ("Salary", 1000, "income", 1),
        ("Rent", 400, "expense", 5),
        ("Groceries", 100, "expense", 20),
    ] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/entries",
                Some(json!({
                    "title": title,
                    "amount_cents": amount,
                    "kind": kind,
                    "occurred_at": format!("2026-03-{day:02}T12:00:00+00:00"),
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(request("GET", "/reports/monthly?year=2026&month=3", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total_income_cents"], 1000);
    assert_eq!(body["total_expense_cents"], 500);
    assert_eq!(body["net_cents"], 500);
    assert_eq!(body["entries"].as_array().unwrap().len(), 3);
}
