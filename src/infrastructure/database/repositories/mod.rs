pub mod postgres_page_repository;

pub use postgres_page_repository::PostgresPageRepository;
