//! App layer - central state management
//!
//! The App actor receives UI events and network responses, runs them
//! through the pure reducer, and emits network commands and render state.

pub mod state;
pub mod reducer;
pub mod actor;

pub use state::AppState;
pub use reducer::{reduce, AppEvent, Transition};
pub use actor::AppActor;
