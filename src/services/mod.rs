pub mod catalog;
pub mod catalog_loader;
pub mod combinations;
pub mod slot_classifier;
pub mod slot_pool;
pub mod spells;
