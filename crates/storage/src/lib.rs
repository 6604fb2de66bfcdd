#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{InMemoryProgressStore, ProgressRepository, StorageError};
