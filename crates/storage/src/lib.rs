#![forbid(unsafe_code)]

pub mod assets;
pub mod repository;

pub use assets::JsonAssetRepository;
pub use repository::{ConfigRepository, InMemoryRepository, Storage, StorageError};
