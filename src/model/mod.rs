// ABOUTME: Lifecycle records persisted by the lifecycle store.
// ABOUTME: Store, Job, and Event rows plus the patches that update them.

mod event;
mod job;
mod store;

pub use event::{Event, EventType};
pub use job::{Job, JobPatch, JobStatus, JobType};
pub use store::{NewStore, Store, StorePatch, StoreStatus};
