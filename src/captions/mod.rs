pub mod classifier;
pub mod templates;
