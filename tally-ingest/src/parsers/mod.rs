pub mod bbva_mx;

pub use bbva_mx::parse_bbva_mx_pages;
