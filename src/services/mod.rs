// Service exports
pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PostgresClient, PostgresError, PgMatchRepository, PgProfileStore};
