// Application Layer - Use Cases and Business Logic

pub mod binding;
pub mod sync;

// Re-exports
pub use binding::{AddRequest, BindingService, EditRequest};
pub use sync::{FailureStage, SyncEngine, SyncFailure, SyncReport};
