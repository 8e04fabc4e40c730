//! Persistence for finished and in-flight game sessions plus aggregate stats.

pub mod repository;
pub mod sqlite;
