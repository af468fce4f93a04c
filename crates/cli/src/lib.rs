//! Building blocks of the `reducer` binary

pub mod logging;
pub mod prompt;
pub mod settings;
