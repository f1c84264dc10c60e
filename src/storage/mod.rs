pub mod collection;
pub mod memory;
pub mod postgres;

pub use collection::CarCollection;
pub use memory::InMemoryCarCollection;
pub use postgres::PostgresCarCollection;
