#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod sync;
pub mod time;

pub use error::Error;
pub use session::{SessionError, SessionPhase, SessionToken};
pub use sync::{EntrySync, ToggleError, ToggleTicket, ToggleTracker};
pub use time::Clock;
