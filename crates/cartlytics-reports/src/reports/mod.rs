pub mod behavior;
pub mod customers;
pub mod products;
pub mod sales;
pub mod seo;
