//! Installation sequencer.
//!
//! [`build_steps`] turns a plan into an ordered list of pip commands and
//! [`run_sequence`] runs them one at a time, halting at the first failure.
//! There is no retry and no rollback.

pub mod hints;
pub mod plan;
pub mod sequencer;

pub use hints::{hint_for, interchange_constraint};
pub use plan::{build_steps, DependencySpec, InstallStep, Phase};
pub use sequencer::{run_sequence, run_step};
