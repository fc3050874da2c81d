//! `flatmate-rota` — the duty-rotation core: orders, executors, and the two
//! rotation algorithms.
//!
//! # Model
//!
//! An **order** is an immutable, positionally-ordered list of users defining
//! one rotation sequence; one **executor** row binds a user to a position.
//! Positions are always the dense range `0..n-1`, which is what lets both
//! algorithms index by `position mod n`. To change membership a new order is
//! created and the task repointed — there is no in-place edit.
//!
//! # Algorithms
//!
//! | Task kind | Rotation state                                        |
//! |-----------|-------------------------------------------------------|
//! | periodic  | none — today's position is a pure function of elapsed days, period, and executor count |
//! | manual    | a persisted counter advanced by explicit "perform" calls, wrapped modulo executor count |
//!
//! The pure day math lives in [`rotation`]; [`orders`], [`tasks`], and
//! [`manual`] are the persistence-backed managers around it.

pub mod db;
pub mod error;
pub mod manual;
pub mod orders;
pub mod rotation;
pub mod tasks;
pub mod types;

pub use error::{Result, RotaError};
pub use manual::ManualTaskManager;
pub use orders::OrderBook;
pub use tasks::TaskManager;
pub use types::{DutyLine, ManualTask, ManualTaskPatch, Task, TaskBrief, TaskPatch, TodayDuty};
