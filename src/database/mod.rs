pub mod db_utils;
pub mod memory_store;
pub mod models;
pub mod redis_store;
pub mod store;

pub use store::{DocumentStore, StoreError};
