//! Shared types of the topic name service: records, identifiers,
//! lookup filters and the storage adapter trait.

pub mod error;
pub mod record;
pub mod store;

pub use error::{ErrorKind, StoreError};
pub use record::{Filter, TopicId, TopicRecord};
pub use store::TopicStore;
