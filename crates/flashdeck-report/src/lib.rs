//! flashdeck-report - Deck statistics reports.
//!
//! Renders [`DeckStats`](flashdeck_core::statistics::DeckStats) as Markdown
//! or as a self-contained HTML page.

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::stats_to_markdown;
