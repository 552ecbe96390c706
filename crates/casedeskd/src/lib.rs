//! casedesk daemon library - exposes modules for testing.

pub mod publisher;
pub mod refresher;
pub mod routes;
pub mod server;
pub mod source;
