// Verify wire format matches what the bot client sends and expects.
// These tests ensure API compatibility is never broken.

use chrono::{TimeZone, Utc};
use flatmate_protocol::error::ApiError;
use flatmate_protocol::input::{
    CreateOrderRequest, CreateTaskRequest, ModifyTaskBody, RemoveTaskParametersBody,
    SaveAliasRequest,
};
use flatmate_protocol::output::{
    DailyInfoResponse, ListOfOrdersResponse, TaskDailyInfo, TaskInfoResponse, UserInfo,
};

#[test]
fn create_order_envelope() {
    let json = r#"{"user_id":1,"order":{"users":[2,1,2]}}"#;
    let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.user_id, 1);
    assert_eq!(req.order.users, vec![2, 1, 2]);
}

#[test]
fn create_task_description_defaults_to_empty() {
    let json = r#"{"user_id":1,"task":{"name":"dishes","start_date":"2024-01-01T00:00:00Z","period":2}}"#;
    let req: CreateTaskRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.task.description.as_deref(), Some(""));
    assert_eq!(req.task.order_id, None);
    assert_eq!(req.task.period, 2);

    // explicit null means "no description", distinct from the default
    let json = r#"{"user_id":1,"task":{"name":"dishes","description":null,"start_date":"2024-01-01T00:00:00Z","period":2}}"#;
    let req: CreateTaskRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.task.description, None);
}

#[test]
fn modify_body_absent_fields_stay_none() {
    let json = r#"{"id":7,"period":3}"#;
    let body: ModifyTaskBody = serde_json::from_str(json).unwrap();
    assert_eq!(body.id, 7);
    assert_eq!(body.period, Some(3));
    assert!(body.name.is_none() && body.description.is_none());
    assert!(body.start_date.is_none() && body.order_id.is_none());
}

#[test]
fn remove_parameters_flags_default_false() {
    let json = r#"{"id":7,"order_id":true}"#;
    let body: RemoveTaskParametersBody = serde_json::from_str(json).unwrap();
    assert!(body.order_id);
    assert!(!body.description);
}

#[test]
fn save_alias_accepts_missing_alias() {
    let json = r#"{"user_id":9}"#;
    let req: SaveAliasRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.alias, None);
}

#[test]
fn user_info_serializes_explicit_nulls() {
    let info = UserInfo {
        id: 4,
        alias: None,
        fullname: None,
    };
    let json = serde_json::to_string(&info).unwrap();
    assert_eq!(json, r#"{"id":4,"alias":null,"fullname":null}"#);
}

#[test]
fn list_of_orders_uses_string_keys() {
    let mut resp = ListOfOrdersResponse {
        users: vec![],
        orders: Default::default(),
    };
    resp.orders.insert(1, vec![2, 1]);
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains(r#""orders":{"1":[2,1]}"#));
}

#[test]
fn daily_info_shape() {
    let mut resp = DailyInfoResponse {
        periodic_tasks: vec![TaskDailyInfo {
            id: 3,
            name: "trash".into(),
            today_executor: 42,
        }],
        manual_tasks: vec![],
        user_info: Default::default(),
    };
    resp.user_info.insert(
        42,
        UserInfo {
            id: 42,
            alias: Some("bob".into()),
            fullname: None,
        },
    );
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains(r#""periodic_tasks":[{"id":3,"name":"trash","today_executor":42}]"#));
    assert!(json.contains(r#""manual_tasks":[]"#));
    assert!(json.contains(r#""user_info":{"42":"#));
}

#[test]
fn task_info_keeps_null_order_id() {
    let resp = TaskInfoResponse {
        name: "task2".into(),
        description: Some("bla-bla".into()),
        start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        period: 1,
        order_id: None,
        inactive: true,
    };
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains(r#""order_id":null"#));
    assert!(json.contains(r#""inactive":true"#));
}

#[test]
fn error_body_shape() {
    let body = ApiError::NotYoursInvitation.body();
    let json = serde_json::to_string(&body).unwrap();
    assert_eq!(
        json,
        r#"{"code":112,"detail":"The invitation is not addressed to this user"}"#
    );
}

#[test]
fn error_codes_and_statuses() {
    assert_eq!(ApiError::NoToken.code(), 1);
    assert_eq!(ApiError::NoToken.status(), 401);
    assert_eq!(ApiError::BotAccess.status(), 403);
    assert_eq!(ApiError::UserHasRoom.code(), 106);
    assert_eq!(ApiError::TooManyOrders.code(), 113);
    assert_eq!(
        ApiError::SpecifiedUserNotInRoom { user_id: 3 }.to_string(),
        "The user 3 does not belong to the room"
    );
    assert_eq!(ApiError::WrongRoom { entity: "order" }.code(), 117);
    assert_eq!(ApiError::ManualTaskInactive.code(), 121);
    let internal = ApiError::Consistency {
        detail: "missing executor".into(),
    };
    assert_eq!(internal.status(), 500);
    assert!(internal.is_internal());
}
