// Bot API route paths — must match what the bot client calls.

// user
pub const USER_CREATE: &str = "/bot/user/create";
pub const USER_SAVE_ALIAS: &str = "/bot/user/save_alias";
pub const USER_SAVE_FULLNAME: &str = "/bot/user/save_fullname";

// room
pub const ROOM_CREATE: &str = "/bot/room/create";
pub const ROOM_INFO: &str = "/bot/room/info";
pub const ROOM_DAILY_INFO: &str = "/bot/room/daily_info";
pub const ROOM_LEAVE: &str = "/bot/room/leave";
pub const ROOM_LIST_OF_ORDERS: &str = "/bot/room/list_of_orders";

// invitation
pub const INVITATION_CREATE: &str = "/bot/invitation/create";
pub const INVITATION_INBOX: &str = "/bot/invitation/inbox";
pub const INVITATION_SENT: &str = "/bot/invitation/sent";
pub const INVITATION_ACCEPT: &str = "/bot/invitation/accept";
pub const INVITATION_REJECT: &str = "/bot/invitation/reject";
pub const INVITATION_DELETE: &str = "/bot/invitation/delete";

// order
pub const ORDER_CREATE: &str = "/bot/order/create";
pub const ORDER_INFO: &str = "/bot/order/info";
pub const ORDER_DELETE: &str = "/bot/order/delete";
pub const ORDER_IS_IN_USE: &str = "/bot/order/is_in_use";

// periodic task
pub const TASK_CREATE: &str = "/bot/task/create";
pub const TASK_MODIFY: &str = "/bot/task/modify";
pub const TASK_REMOVE_PARAMETERS: &str = "/bot/task/remove_parameters";
pub const TASK_LIST: &str = "/bot/task/list";
pub const TASK_INFO: &str = "/bot/task/info";
pub const TASK_DELETE: &str = "/bot/task/delete";

// manual task
pub const MANUAL_TASK_CREATE: &str = "/bot/manual_task/create";
pub const MANUAL_TASK_MODIFY: &str = "/bot/manual_task/modify";
pub const MANUAL_TASK_REMOVE_PARAMETERS: &str = "/bot/manual_task/remove_parameters";
pub const MANUAL_TASK_LIST: &str = "/bot/manual_task/list";
pub const MANUAL_TASK_INFO: &str = "/bot/manual_task/info";
pub const MANUAL_TASK_DELETE: &str = "/bot/manual_task/delete";
pub const MANUAL_TASK_DO: &str = "/bot/manual_task/do";
pub const MANUAL_TASK_CURRENT_EXECUTOR: &str = "/bot/manual_task/current_executor";

// rule
pub const RULE_CREATE: &str = "/bot/rule/create";
pub const RULE_LIST: &str = "/bot/rule/list";
pub const RULE_EDIT: &str = "/bot/rule/edit";
pub const RULE_DELETE: &str = "/bot/rule/delete";

// ops
pub const HEALTH: &str = "/health";
