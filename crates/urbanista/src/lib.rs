//! Property classifieds domain: the offer/property-type catalog and its rule
//! book, listing intake and search, and the HTTP surface that serves them.

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod listings;
pub mod telemetry;
