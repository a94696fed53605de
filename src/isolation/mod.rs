//! Isolation manager.
//!
//! Decides whether installs go into a virtual environment. The decision
//! logic is the pure [`transition`] function over [`IsolationState`];
//! [`manage_isolation`] drives it with the menus and performs creation.

pub mod manager;
pub mod state;

pub use manager::{
    active_runtime, create_isolated_environment, is_isolated, manage_isolation,
    IsolationOutcome, INCOMPATIBLE_MENU, NOT_ISOLATED_MENU,
};
pub use state::{classify, transition, IsolationState, SessionChoice};
