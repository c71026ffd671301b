//! Session records.

pub mod model;

pub use model::Session;
