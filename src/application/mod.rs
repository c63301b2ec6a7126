//! Application services orchestrating the domain and persistence layers.

pub mod error;
pub mod posts;
pub mod render;
pub mod repos;
