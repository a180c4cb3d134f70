// Service exports
pub mod cache;
pub mod ride_store;

pub use cache::RideSnapshotCache;
pub use ride_store::{parse_ride_documents, RideStoreClient, RideStoreConfig, RideStoreError};
