//! End-to-end tests of the bot API: full router, token middleware, and the
//! managers over an in-memory database.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use flatmate_gateway::auth::{mint_token, BOT_SUBJECT};
use flatmate_gateway::{build_router, AppState};

const SECRET: &str = "integration-secret";

fn app() -> Router {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    flatmate_rooms::db::init_db(&conn).unwrap();
    flatmate_rota::db::init_db(&conn).unwrap();
    let db = Arc::new(Mutex::new(conn));
    let state = Arc::new(AppState {
        secret: SECRET.to_string(),
        directory: flatmate_rooms::RoomDirectory::new(Arc::clone(&db)),
        invitations: flatmate_rooms::InvitationManager::new(Arc::clone(&db), 50, 7),
        rules: flatmate_rooms::RuleBook::new(Arc::clone(&db)),
        orders: flatmate_rota::OrderBook::new(Arc::clone(&db), 50),
        tasks: flatmate_rota::TaskManager::new(Arc::clone(&db), 50),
        manual: flatmate_rota::ManualTaskManager::new(Arc::clone(&db), 50),
    });
    build_router(state)
}

fn bot_token() -> String {
    mint_token(SECRET, BOT_SUBJECT, -1)
}

async fn send(app: &Router, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-token", token);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// POST with the standard bot token and assert 200, returning the body.
async fn post_ok(app: &Router, path: &str, body: Value) -> Value {
    let token = bot_token();
    let (status, value) = send(app, path, Some(&token), body).await;
    assert_eq!(status, StatusCode::OK, "{path}: {value}");
    value
}

async fn post_err(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let token = bot_token();
    send(app, path, Some(&token), body).await
}

/// Register two users and put them in one room; returns the room id.
async fn room_of_two(app: &Router) -> i64 {
    post_ok(app, "/bot/user/create", json!({"user_id": 1})).await;
    post_ok(app, "/bot/user/save_alias", json!({"user_id": 1, "alias": "anna"})).await;
    post_ok(app, "/bot/user/create", json!({"user_id": 2})).await;
    post_ok(app, "/bot/user/save_alias", json!({"user_id": 2, "alias": "ben"})).await;

    let room_id = post_ok(
        app,
        "/bot/room/create",
        json!({"user_id": 1, "room": {"name": "flat 5"}}),
    )
    .await;
    post_ok(
        app,
        "/bot/invitation/create",
        json!({"user_id": 1, "addressee": {"alias": "ben"}}),
    )
    .await;

    let inbox = post_ok(app, "/bot/invitation/inbox", json!({"user_id": 2})).await;
    let invitation_id = inbox["invitations"][0]["id"].clone();
    let joined = post_ok(
        app,
        "/bot/invitation/accept",
        json!({"user_id": 2, "invitation": {"id": invitation_id}}),
    )
    .await;
    assert_eq!(joined, room_id);
    room_id.as_i64().unwrap()
}

#[tokio::test]
async fn health_is_open() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_code_1() {
    let app = app();
    let (status, body) = send(&app, "/bot/user/create", None, json!({"user_id": 1})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1);
}

#[tokio::test]
async fn garbage_token_is_code_2() {
    let app = app();
    let (status, body) = send(
        &app,
        "/bot/user/create",
        Some("not.a.token"),
        json!({"user_id": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn expired_token_is_code_3() {
    let app = app();
    let stale = mint_token(SECRET, BOT_SUBJECT, 1_000_000);
    let (status, body) = send(&app, "/bot/user/create", Some(&stale), json!({"user_id": 1})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 3);
}

#[tokio::test]
async fn foreign_subject_is_code_11() {
    let app = app();
    let other = mint_token(SECRET, "webapp", -1);
    let (status, body) = send(&app, "/bot/user/create", Some(&other), json!({"user_id": 1})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 11);
}

#[tokio::test]
async fn duplicate_registration_is_code_101() {
    let app = app();
    post_ok(&app, "/bot/user/create", json!({"user_id": 7})).await;
    let (status, body) = post_err(&app, "/bot/user/create", json!({"user_id": 7})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);
}

#[tokio::test]
async fn empty_room_name_is_422_detail() {
    let app = app();
    post_ok(&app, "/bot/user/create", json!({"user_id": 1})).await;
    let (status, body) = post_err(
        &app,
        "/bot/room/create",
        json!({"user_id": 1, "room": {"name": ""}}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert!(body.get("code").is_none());
}

#[tokio::test]
async fn zero_period_is_422() {
    let app = app();
    room_of_two(&app).await;
    let (status, _) = post_err(
        &app,
        "/bot/task/create",
        json!({
            "user_id": 1,
            "task": {
                "name": "dishes",
                "start_date": Utc::now().to_rfc3339(),
                "period": 0
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invitation_to_a_stranger_alias_is_allowed() {
    let app = app();
    post_ok(&app, "/bot/user/create", json!({"user_id": 1})).await;
    post_ok(
        &app,
        "/bot/room/create",
        json!({"user_id": 1, "room": {"name": "flat"}}),
    )
    .await;
    // nobody holds this alias yet; the invitation waits for them
    post_ok(
        &app,
        "/bot/invitation/create",
        json!({"user_id": 1, "addressee": {"alias": "future_flatmate"}}),
    )
    .await;
    let sent = post_ok(&app, "/bot/invitation/sent", json!({"user_id": 1})).await;
    assert_eq!(sent["invitations"][0]["addressee"], "future_flatmate");
}

#[tokio::test]
async fn accepting_someone_elses_invitation_is_code_112() {
    let app = app();
    post_ok(&app, "/bot/user/create", json!({"user_id": 1})).await;
    post_ok(&app, "/bot/user/save_alias", json!({"user_id": 1, "alias": "anna"})).await;
    post_ok(
        &app,
        "/bot/room/create",
        json!({"user_id": 1, "room": {"name": "flat"}}),
    )
    .await;
    post_ok(
        &app,
        "/bot/invitation/create",
        json!({"user_id": 1, "addressee": {"alias": "ben"}}),
    )
    .await;

    // a third, roomless user with a different alias tries to take it
    post_ok(&app, "/bot/user/create", json!({"user_id": 3})).await;
    post_ok(&app, "/bot/user/save_alias", json!({"user_id": 3, "alias": "carol"})).await;
    let sent = post_ok(&app, "/bot/invitation/sent", json!({"user_id": 1})).await;
    let invitation_id = sent["invitations"][0]["id"].clone();
    let (status, body) = post_err(
        &app,
        "/bot/invitation/accept",
        json!({"user_id": 3, "invitation": {"id": invitation_id}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 112);
}

#[tokio::test]
async fn only_the_sender_may_delete_an_invitation() {
    let app = app();
    post_ok(&app, "/bot/user/create", json!({"user_id": 1})).await;
    post_ok(
        &app,
        "/bot/room/create",
        json!({"user_id": 1, "room": {"name": "flat"}}),
    )
    .await;
    post_ok(&app, "/bot/user/create", json!({"user_id": 2})).await;
    post_ok(&app, "/bot/user/save_alias", json!({"user_id": 2, "alias": "ben"})).await;
    post_ok(
        &app,
        "/bot/invitation/create",
        json!({"user_id": 1, "addressee": {"alias": "ben"}}),
    )
    .await;

    let inbox = post_ok(&app, "/bot/invitation/inbox", json!({"user_id": 2})).await;
    let invitation_id = inbox["invitations"][0]["id"].clone();
    let (status, body) = post_err(
        &app,
        "/bot/invitation/delete",
        json!({"user_id": 2, "invitation": {"id": invitation_id.clone()}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 119);

    // the addressee may still reject it
    post_ok(
        &app,
        "/bot/invitation/reject",
        json!({"user_id": 2, "invitation": {"id": invitation_id}}),
    )
    .await;
}

#[tokio::test]
async fn room_info_lists_both_members() {
    let app = app();
    room_of_two(&app).await;
    let info = post_ok(&app, "/bot/room/info", json!({"user_id": 2})).await;
    assert_eq!(info["name"], "flat 5");
    assert_eq!(info["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn periodic_rotation_flow() {
    let app = app();
    room_of_two(&app).await;

    let order_id = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1, 2]}}),
    )
    .await;

    // started two days ago with a daily period: 2 % 2 = 0, user 1 on duty
    let start = (Utc::now() - Duration::days(2)).to_rfc3339();
    let task_id = post_ok(
        &app,
        "/bot/task/create",
        json!({
            "user_id": 1,
            "task": {
                "name": "dishes",
                "description": "kitchen sink",
                "start_date": start,
                "period": 1,
                "order_id": order_id
            }
        }),
    )
    .await;

    let daily = post_ok(&app, "/bot/room/daily_info", json!({"user_id": 2})).await;
    let periodic = daily["periodic_tasks"].as_array().unwrap();
    assert_eq!(periodic.len(), 1);
    assert_eq!(periodic[0]["id"], task_id);
    assert_eq!(periodic[0]["today_executor"], 1);
    assert!(daily["user_info"]["1"].is_object());

    let info = post_ok(
        &app,
        "/bot/task/info",
        json!({"user_id": 1, "task": {"id": task_id.clone()}}),
    )
    .await;
    assert_eq!(info["period"], 1);
    assert_eq!(info["inactive"], false);

    // unbinding the order makes the task inactive and drops it from the digest
    post_ok(
        &app,
        "/bot/task/remove_parameters",
        json!({"user_id": 1, "task": {"id": task_id.clone(), "order_id": true}}),
    )
    .await;
    let list = post_ok(&app, "/bot/task/list", json!({"user_id": 1})).await;
    assert_eq!(list["tasks"][0]["inactive"], true);
    let daily = post_ok(&app, "/bot/room/daily_info", json!({"user_id": 1})).await;
    assert!(daily["periodic_tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn manual_task_counter_flow() {
    let app = app();
    room_of_two(&app).await;
    let order_id = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1, 2]}}),
    )
    .await;
    let task_id = post_ok(
        &app,
        "/bot/manual_task/create",
        json!({
            "user_id": 1,
            "task": {"name": "trash", "order_id": order_id}
        }),
    )
    .await;

    let current = post_ok(
        &app,
        "/bot/manual_task/current_executor",
        json!({"user_id": 1, "task_id": task_id}),
    )
    .await;
    assert_eq!(current["number"], 0);
    assert_eq!(current["user"]["id"], 1);

    // performing advances the counter to the next slot
    let counter = post_ok(
        &app,
        "/bot/manual_task/do",
        json!({"user_id": 1, "task_id": task_id}),
    )
    .await;
    assert_eq!(counter, 1);
    let current = post_ok(
        &app,
        "/bot/manual_task/current_executor",
        json!({"user_id": 2, "task_id": task_id}),
    )
    .await;
    assert_eq!(current["user"]["id"], 2);

    // wraps back to the head of the order
    let counter = post_ok(
        &app,
        "/bot/manual_task/do",
        json!({"user_id": 2, "task_id": task_id}),
    )
    .await;
    assert_eq!(counter, 0);

    assert_eq!(
        post_ok(
            &app,
            "/bot/order/is_in_use",
            json!({"user_id": 1, "order_id": order_id})
        )
        .await,
        json!(true)
    );
}

#[tokio::test]
async fn performing_an_unbound_manual_task_is_code_121() {
    let app = app();
    room_of_two(&app).await;
    let task_id = post_ok(
        &app,
        "/bot/manual_task/create",
        json!({"user_id": 1, "task": {"name": "trash"}}),
    )
    .await;
    let (status, body) = post_err(
        &app,
        "/bot/manual_task/do",
        json!({"user_id": 1, "task_id": task_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 121);
}

#[tokio::test]
async fn deleting_an_order_unbinds_its_tasks() {
    let app = app();
    room_of_two(&app).await;
    let order_id = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1, 2]}}),
    )
    .await;
    let task_id = post_ok(
        &app,
        "/bot/manual_task/create",
        json!({"user_id": 1, "task": {"name": "plants", "order_id": order_id}}),
    )
    .await;

    post_ok(
        &app,
        "/bot/order/delete",
        json!({"user_id": 1, "order_id": order_id}),
    )
    .await;
    let info = post_ok(
        &app,
        "/bot/manual_task/info",
        json!({"user_id": 1, "task": {"id": task_id}}),
    )
    .await;
    assert_eq!(info["order_id"], Value::Null);
    let list = post_ok(&app, "/bot/manual_task/list", json!({"user_id": 1})).await;
    assert_eq!(list["tasks"][0]["inactive"], true);
}

#[tokio::test]
async fn orders_are_room_scoped() {
    let app = app();
    room_of_two(&app).await;
    let order_id = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1]}}),
    )
    .await;

    // a different room can neither read nor delete it
    post_ok(&app, "/bot/user/create", json!({"user_id": 9})).await;
    post_ok(
        &app,
        "/bot/room/create",
        json!({"user_id": 9, "room": {"name": "other flat"}}),
    )
    .await;
    let (status, body) = post_err(
        &app,
        "/bot/order/info",
        json!({"user_id": 9, "order": {"id": order_id}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 117);
}

#[tokio::test]
async fn order_with_a_stranger_is_rejected() {
    let app = app();
    room_of_two(&app).await;
    post_ok(&app, "/bot/user/create", json!({"user_id": 9})).await;
    let (status, body) = post_err(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1, 9]}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 115);
}

#[tokio::test]
async fn rules_crud() {
    let app = app();
    room_of_two(&app).await;
    let rule_id = post_ok(
        &app,
        "/bot/rule/create",
        json!({"user_id": 1, "rule": {"name": "quiet hours", "text": "after 22:00"}}),
    )
    .await;
    post_ok(
        &app,
        "/bot/rule/edit",
        json!({"user_id": 2, "rule": {"id": rule_id.clone(), "text": "after 23:00"}}),
    )
    .await;
    let rules = post_ok(&app, "/bot/rule/list", json!({"user_id": 1})).await;
    assert_eq!(rules[0]["name"], "quiet hours");
    assert_eq!(rules[0]["text"], "after 23:00");

    post_ok(
        &app,
        "/bot/rule/delete",
        json!({"user_id": 1, "rule_id": rule_id}),
    )
    .await;
    let rules = post_ok(&app, "/bot/rule/list", json!({"user_id": 1})).await;
    assert!(rules.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn leaving_dissolves_an_empty_room() {
    let app = app();
    room_of_two(&app).await;
    post_ok(&app, "/bot/room/leave", json!({"user_id": 2})).await;
    post_ok(&app, "/bot/room/leave", json!({"user_id": 1})).await;
    let (status, body) = post_err(&app, "/bot/room/info", json!({"user_id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 105);
}

#[tokio::test]
async fn list_of_orders_covers_every_order() {
    let app = app();
    room_of_two(&app).await;
    let first = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 1, "order": {"users": [1, 2]}}),
    )
    .await;
    let second = post_ok(
        &app,
        "/bot/order/create",
        json!({"user_id": 2, "order": {"users": [2]}}),
    )
    .await;

    let listing = post_ok(&app, "/bot/room/list_of_orders", json!({"user_id": 1})).await;
    let orders = listing["orders"].as_object().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[&first.to_string()], json!([1, 2]));
    assert_eq!(orders[&second.to_string()], json!([2]));
    assert_eq!(listing["users"].as_array().unwrap().len(), 2);
}
