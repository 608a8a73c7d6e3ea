pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{
    DbConnection, DbPool, DatabaseError, create_connection_pool, get_connection_from_pool,
    run_migrations,
};
