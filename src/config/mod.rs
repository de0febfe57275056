//! Process configuration read from the environment.

mod settings;

pub use settings::*;
