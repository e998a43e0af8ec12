// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod engine;
mod id;
mod store_name;

pub use engine::{EngineProfile, ParseKindError, StoreEngine, StorePlan};
pub use id::{EventId, Id, JobId, StoreId};
pub use store_name::{MAX_NAME_LEN, MIN_NAME_LEN, StoreName, StoreNameError};
