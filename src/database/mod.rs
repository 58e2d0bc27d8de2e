/// SQLite pool setup and migrations
pub mod connection;
/// In-process key-value store
pub mod memory;
/// Row types for the key-value table
pub mod models;
/// The key-value store contract and its SQLite adapter
pub mod store;

pub use memory::InMemoryKvStore;
pub use store::{KvStore, SqliteKvStore};
