// Database Module
// Store interface, its Postgres and in-memory implementations, and the
// connection pool

pub mod error;
pub mod memory_store;
pub mod pool;
pub mod postgres_store;
pub mod repositories;
pub mod store;

pub use error::DbError;
pub use memory_store::MemoryStore;
pub use pool::DbPool;
pub use postgres_store::PostgresStore;
pub use repositories::Repositories;
pub use store::{AllocationFilter, AllocationUpdate, LedgerStore};
