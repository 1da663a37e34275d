pub mod cli;
pub mod commands;
pub mod console;
pub mod error;
pub mod state;

pub use error::CommandError;
pub use state::AppState;
