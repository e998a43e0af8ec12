// ABOUTME: Command module aggregator for the storefleet CLI.
// ABOUTME: Re-exports the handlers for each subcommand.

mod connect;
mod create;
mod delete;
mod inspect;
mod ready;
mod render;

pub use connect::connect;
pub use create::{CreateArgs, create};
pub use delete::delete;
pub use inspect::{events, get, list};
pub use ready::{ready, reconcile};
