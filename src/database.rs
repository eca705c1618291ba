pub mod connection;
pub mod dto;
pub mod loader;
pub mod repository;

pub use connection::{close_connection, connect_and_migrate, establish_connection};
pub use loader::{GraphLoader, LoadError};
