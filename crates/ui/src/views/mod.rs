mod state;

pub use state::ViewState;
