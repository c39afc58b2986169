//! Read-model adapters implementing [`stockwise_intel::InventoryDataSource`].

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInventorySource;
pub use postgres::PostgresInventorySource;
