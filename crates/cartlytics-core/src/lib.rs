pub mod aggregate;
pub mod config;
pub mod currency;
pub mod error;
pub mod predicate;
pub mod row;
