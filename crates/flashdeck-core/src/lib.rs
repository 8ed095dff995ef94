//! flashdeck-core - Data model, scheduler, and training service.
//!
//! This crate defines the deck and card model, the SM-2 style review
//! scheduler, deck statistics, and the storage trait that the rest of
//! flashdeck builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod scheduler;
pub mod statistics;
pub mod traits;
