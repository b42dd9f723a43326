pub mod memory;
pub mod mysql;

pub use bookmark_core::{ReadRepository, Repository, StorageError};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
