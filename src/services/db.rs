pub mod changes;
pub mod connect_db;
pub mod filter;
pub mod memory_store;
pub mod mongo_store;
pub mod store;

pub use changes::DocumentAdded;
pub use filter::Filter;
pub use store::{Database, Document, DocumentStore, StoreError};
