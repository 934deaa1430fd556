//! In-memory storage.

mod store;

pub use store::InMemoryStore;
