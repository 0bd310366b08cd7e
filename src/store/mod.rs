//! Catalog and economy service integration

pub mod catalog;
pub mod shop;

pub use catalog::Catalog;
pub use shop::{register_catalog, LocalShop};
