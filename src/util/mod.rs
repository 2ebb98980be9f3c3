//! Small shared utilities

pub mod ids;

pub use ids::generate_id;
