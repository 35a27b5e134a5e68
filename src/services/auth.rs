pub mod requester;
pub mod sessions;

pub use requester::Requester;
pub use sessions::{Identity, MemorySessions, SessionError, SessionResolver};
