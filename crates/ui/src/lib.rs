#![forbid(unsafe_code)]

mod context;
pub mod routes;
pub mod views;
pub mod vm;

pub use context::{AppContext, build_app_context};
pub use routes::{Access, GuardOutcome, Route, guard};
pub use views::ViewState;
