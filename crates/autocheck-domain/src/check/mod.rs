mod context;
mod definition;
mod status_board;
mod value_objects;


pub use context::CheckContext;
pub use definition::{Check, CheckDefinition, FnCheck};
pub use status_board::StatusBoard;
pub use value_objects::{CheckOutcome, CheckStatus, OutcomeKind, Severity};
