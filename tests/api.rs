use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use sharedexpenses::routes;
use sharedexpenses::schemas::{Item, ItemType, User, UsersEnvelope};
use sharedexpenses::{ExpenseTracker, InMemoryStore};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .wrap(Cors::permissive())
                .app_data(web::Data::new(ExpenseTracker::new(Arc::new(
                    InMemoryStore::new(),
                ))))
                .service(web::scope("/api").configure(routes::configure)),
        )
        .await
    };
}

#[actix_web::test]
async fn health_check_answers() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "message": "Shared Expense Tracker API" }));
}

#[actix_web::test]
async fn users_are_deduplicated_by_name() {
    let app = app!();
    let create = || {
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "name": "Matias" }))
            .to_request()
    };
    let first: User = test::call_and_read_body_json(&app, create()).await;
    let second: User = test::call_and_read_body_json(&app, create()).await;
    assert_eq!(first.id, second.id);

    let req = test::TestRequest::get().uri("/api/users").to_request();
    let users: Vec<User> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users, vec![first]);
}

#[actix_web::test]
async fn init_users_returns_the_same_pair_every_time() {
    let app = app!();
    let init = || test::TestRequest::post().uri("/api/users/init").to_request();
    let first: UsersEnvelope = test::call_and_read_body_json(&app, init()).await;
    let second: UsersEnvelope = test::call_and_read_body_json(&app, init()).await;
    assert_eq!(first.users.len(), 2);
    assert_eq!(first.users, second.users);
}

#[actix_web::test]
async fn coffee_goes_from_cart_to_divided_expense_to_gone() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/items")
        .set_json(json!({ "name": "Coffee", "amount": 125.75, "type": "cart", "createdBy": "U1" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["currency"], "DKK");
    assert_eq!(created["type"], "cart");
    assert_eq!(created["isDivided"], false);
    assert_eq!(created["paidBy"], Value::Null);
    assert!(created["createdAt"].is_string());
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{id}/move-to-expense?paid_by=U2"))
        .to_request();
    let moved: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(moved.kind, ItemType::Expense);
    assert_eq!(moved.paid_by.as_deref(), Some("U2"));

    let req = test::TestRequest::get().uri(&format!("/api/items/{id}")).to_request();
    let fetched: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, moved);

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{id}/toggle-divided"))
        .to_request();
    let toggled: Item = test::call_and_read_body_json(&app, req).await;
    assert!(toggled.is_divided);

    let req = test::TestRequest::delete().uri(&format!("/api/items/{id}")).to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted, json!({ "message": "Item deleted successfully" }));

    let req = test::TestRequest::get().uri(&format!("/api/items/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Item not found");
}

#[actix_web::test]
async fn list_filters_by_type_newest_first() {
    let app = app!();
    for (name, kind) in [("Bread", "cart"), ("Rent", "expense"), ("Milk", "cart")] {
        let req = test::TestRequest::post()
            .uri("/api/items")
            .set_json(json!({ "name": name, "amount": 10.0, "type": kind, "createdBy": "U1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::get().uri("/api/items?type=cart").to_request();
    let carts: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(carts.len(), 2);
    assert!(carts.iter().all(|item| item.kind == ItemType::Cart));
    assert!(carts[0].created_at >= carts[1].created_at);

    let req = test::TestRequest::get().uri("/api/items?type=expense").to_request();
    let expenses: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].name, "Rent");

    let req = test::TestRequest::get().uri("/api/items").to_request();
    let all: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.len(), 3);

    let req = test::TestRequest::get().uri("/api/items?type=").to_request();
    let unfiltered: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unfiltered, all);
}

macro_rules! create_cart_item {
    ($app:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/items")
            .set_json(json!({ "name": $name, "amount": 42.0, "createdBy": "U1" }))
            .to_request();
        let item: Item = test::call_and_read_body_json(&$app, req).await;
        item
    }};
}

#[actix_web::test]
async fn move_to_expense_without_payer_clears_paid_by() {
    let app = app!();
    let item = create_cart_item!(app, "Detergent");

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{}/move-to-expense", item.id))
        .to_request();
    let moved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(moved["type"], "expense");
    assert_eq!(moved["paidBy"], Value::Null);

    let req = test::TestRequest::get()
        .uri(&format!("/api/items/{}", item.id))
        .to_request();
    let fetched: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.kind, ItemType::Expense);
    assert_eq!(fetched.paid_by, None);
}

#[actix_web::test]
async fn move_to_expense_keeps_an_empty_payer_verbatim() {
    let app = app!();
    let item = create_cart_item!(app, "Batteries");

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{}/move-to-expense?paid_by=", item.id))
        .to_request();
    let moved: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(moved.kind, ItemType::Expense);
    assert_eq!(moved.paid_by.as_deref(), Some(""));
}

#[actix_web::test]
async fn partial_update_touches_only_given_fields() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/items")
        .set_json(json!({ "name": "Soap", "amount": 20.0, "createdBy": "U1" }))
        .to_request();
    let created: Item = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{}", created.id))
        .set_json(json!({}))
        .to_request();
    let unchanged: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged, created);

    let req = test::TestRequest::put()
        .uri(&format!("/api/items/{}", created.id))
        .set_json(json!({ "amount": 25.5 }))
        .to_request();
    let updated: Item = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.amount, 25.5);
    assert_eq!(updated.name, "Soap");
}

#[actix_web::test]
async fn mutating_a_missing_item_is_404() {
    let app = app!();
    let requests = [
        test::TestRequest::put().uri("/api/items/nope").set_json(json!({ "name": "x" })),
        test::TestRequest::delete().uri("/api/items/nope"),
        test::TestRequest::put().uri("/api/items/nope/toggle-divided"),
        test::TestRequest::put().uri("/api/items/nope/move-to-expense?paid_by=U2"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn malformed_input_is_rejected_with_json_detail() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/items")
        .set_json(json!({ "name": "No amount", "createdBy": "U1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());

    let req = test::TestRequest::get().uri("/api/items?type=refund").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn cors_preflight_allows_any_origin() {
    let app = app!();
    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/items")
        .insert_header((header::ORIGIN, "https://expenses.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("https://expenses.example")
    );
}
