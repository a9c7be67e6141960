//! Session store implementations

mod file_store;
mod in_memory;

pub use file_store::FileSessionStore;
pub use in_memory::InMemorySessionStore;
