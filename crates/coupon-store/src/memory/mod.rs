//! In-process coordination store.

pub mod store;

pub use store::MemoryStore;
