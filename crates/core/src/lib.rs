#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod scoring;
pub mod time;

pub use catalog::{Catalog, CatalogError};
pub use scoring::{TopicStats, score_topic};
pub use time::Clock;
