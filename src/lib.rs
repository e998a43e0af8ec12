// ABOUTME: Library root for storefleet - exposes the orchestrator and its collaborators.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod probe;
pub mod process;
pub mod repo;
pub mod types;
