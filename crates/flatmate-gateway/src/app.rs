use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use flatmate_protocol::methods;
use flatmate_rooms::{InvitationManager, RoomDirectory, RuleBook};
use flatmate_rota::{ManualTaskManager, OrderBook, TaskManager};

/// Central shared state — passed as `Arc<AppState>` to all handlers. The
/// managers share one SQLite connection; quotas were injected at
/// construction in `main`.
pub struct AppState {
    pub secret: String,
    pub directory: RoomDirectory,
    pub invitations: InvitationManager,
    pub rules: RuleBook,
    pub orders: OrderBook,
    pub tasks: TaskManager,
    pub manual: ManualTaskManager,
}

/// Assemble the full router: `/health` open, everything under `/bot`
/// guarded by the token middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let bot = Router::new()
        .route(methods::USER_CREATE, post(crate::http::user::create))
        .route(methods::USER_SAVE_ALIAS, post(crate::http::user::save_alias))
        .route(methods::USER_SAVE_FULLNAME, post(crate::http::user::save_fullname))
        .route(methods::ROOM_CREATE, post(crate::http::room::create))
        .route(methods::ROOM_INFO, post(crate::http::room::info))
        .route(methods::ROOM_DAILY_INFO, post(crate::http::room::daily_info))
        .route(methods::ROOM_LEAVE, post(crate::http::room::leave))
        .route(methods::ROOM_LIST_OF_ORDERS, post(crate::http::room::list_of_orders))
        .route(methods::INVITATION_CREATE, post(crate::http::invitation::create))
        .route(methods::INVITATION_INBOX, post(crate::http::invitation::inbox))
        .route(methods::INVITATION_SENT, post(crate::http::invitation::sent))
        .route(methods::INVITATION_ACCEPT, post(crate::http::invitation::accept))
        .route(methods::INVITATION_REJECT, post(crate::http::invitation::reject))
        .route(methods::INVITATION_DELETE, post(crate::http::invitation::delete))
        .route(methods::ORDER_CREATE, post(crate::http::order::create))
        .route(methods::ORDER_INFO, post(crate::http::order::info))
        .route(methods::ORDER_DELETE, post(crate::http::order::delete))
        .route(methods::ORDER_IS_IN_USE, post(crate::http::order::is_in_use))
        .route(methods::TASK_CREATE, post(crate::http::task::create))
        .route(methods::TASK_MODIFY, post(crate::http::task::modify))
        .route(methods::TASK_REMOVE_PARAMETERS, post(crate::http::task::remove_parameters))
        .route(methods::TASK_LIST, post(crate::http::task::list))
        .route(methods::TASK_INFO, post(crate::http::task::info))
        .route(methods::TASK_DELETE, post(crate::http::task::delete))
        .route(methods::MANUAL_TASK_CREATE, post(crate::http::manual_task::create))
        .route(methods::MANUAL_TASK_MODIFY, post(crate::http::manual_task::modify))
        .route(
            methods::MANUAL_TASK_REMOVE_PARAMETERS,
            post(crate::http::manual_task::remove_parameters),
        )
        .route(methods::MANUAL_TASK_LIST, post(crate::http::manual_task::list))
        .route(methods::MANUAL_TASK_INFO, post(crate::http::manual_task::info))
        .route(methods::MANUAL_TASK_DELETE, post(crate::http::manual_task::delete))
        .route(methods::MANUAL_TASK_DO, post(crate::http::manual_task::perform))
        .route(
            methods::MANUAL_TASK_CURRENT_EXECUTOR,
            post(crate::http::manual_task::current_executor),
        )
        .route(methods::RULE_CREATE, post(crate::http::rule::create))
        .route(methods::RULE_LIST, post(crate::http::rule::list))
        .route(methods::RULE_EDIT, post(crate::http::rule::edit))
        .route(methods::RULE_DELETE, post(crate::http::rule::delete))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            crate::auth::require_bot_token,
        ));

    Router::new()
        .route(methods::HEALTH, get(crate::http::health::health_handler))
        .merge(bot)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
