mod cache_store;

pub use cache_store::{SledCacheStore, SledStoreConfig};
