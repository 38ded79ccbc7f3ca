//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement the port traits defined in `ports/`.

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbRepository;
pub use self::memory::InMemoryRepository;
