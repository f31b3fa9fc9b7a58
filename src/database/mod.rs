pub mod errors;
pub mod services;
pub mod stores;
pub mod types;

pub use errors::DatabaseError;
pub use services::DatabaseService;
pub use stores::{EnhancedTariffStore, StandardTariffStore};
