// Application layer - dispatch, runner and scheduling services
// Presentation layer - CLI, console rendering and startup wiring

pub mod application;
pub mod presentation;
