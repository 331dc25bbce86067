pub mod user_inmemory;
pub mod user_postgres;

pub use user_inmemory::InMemoryUserRepository;
pub use user_postgres::PostgresUserRepository;
