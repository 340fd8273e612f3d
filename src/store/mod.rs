pub mod collections;
mod files;
pub mod models;

pub use files::{FileStore, StoreError};
