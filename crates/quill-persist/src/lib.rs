pub mod error;
pub mod locks;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod store;

pub use error::PersistError;
pub use memory::InMemoryThreadStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoThreadStore;
pub use store::{default_title, ThreadStore};
