//! flashdeck-store - Deck storage backends.
//!
//! Implements the `DeckStore` trait with an in-memory map and a directory of
//! JSON files, and loads the flashdeck configuration that selects between
//! them.

pub mod config;
pub mod json;
pub mod memory;

pub use config::{load_config, load_config_from, open_store, FlashdeckConfig, StoreKind};
pub use json::JsonStore;
pub use memory::MemoryStore;
