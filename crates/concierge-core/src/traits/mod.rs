mod cancellation;
mod session_store;
mod vector_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use session_store::ISessionStore;
pub use vector_store::IVectorStore;
