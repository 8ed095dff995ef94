//! The `flashdeck stats` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use flashdeck_core::statistics::DeckStats;
use flashdeck_report::html::{generate_html, write_html_report};
use flashdeck_report::markdown::stats_to_markdown;

use super::{today_or, write_output, Session};

pub async fn execute(
    deck: String,
    date: Option<NaiveDate>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;
    let stats = session
        .service
        .deck_stats(&session.caller, &key, today_or(date))
        .await?;

    if format == "html" {
        match &output {
            Some(path) => write_html_report(&stats, path)?,
            None => println!("{}", generate_html(&stats)),
        }
    } else {
        let rendered = match format.as_str() {
            "json" => serde_json::to_string_pretty(&stats)?,
            "markdown" | "md" => stats_to_markdown(&stats),
            "text" => render_text(&stats),
            other => anyhow::bail!("unknown format: {other} (expected text, json, markdown, html)"),
        };
        match &output {
            Some(path) => write_output(path, &rendered)?,
            None => println!("{rendered}"),
        }
    }

    if let Some(path) = output {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn render_text(stats: &DeckStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Deck {} (as of {})\n", stats.deck, stats.as_of));
    out.push_str(&format!(
        "  Cards:    {} ({} new, {} learning, {} review)\n",
        stats.total_cards, stats.new_cards, stats.learning_cards, stats.review_cards
    ));
    out.push_str(&format!(
        "  Due:      {} ({} overdue), {} mature\n",
        stats.due_now, stats.overdue, stats.mature_cards
    ));
    out.push_str(&format!("  Ease:     {:.2} average\n", stats.average_ease));
    out.push_str(&format!(
        "  Reviews:  {} ({} passed, {} failed, {:.1}% success)\n",
        stats.reviews.total,
        stats.reviews.passes,
        stats.reviews.failures,
        stats.reviews.success_rate * 100.0
    ));
    let forecast: Vec<String> = stats
        .forecast
        .iter()
        .map(|d| format!("{} {}", d.date.format("%m-%d"), d.due))
        .collect();
    out.push_str(&format!("  Forecast: {}\n", forecast.join(", ")));

    if !stats.cards.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            "Id", "Question", "Phase", "Due", "Interval", "Ease", "Reviews", "Success",
        ]);
        for c in &stats.cards {
            table.add_row(vec![
                Cell::new(c.card_id),
                Cell::new(&c.question),
                Cell::new(c.phase),
                Cell::new(c.due),
                Cell::new(format!("{}d", c.interval_days)),
                Cell::new(format!("{:.2}", c.ease)),
                Cell::new(c.reviews.total),
                Cell::new(format!("{:.1}%", c.reviews.success_rate * 100.0)),
            ]);
        }
        out.push('\n');
        out.push_str(&table.to_string());
    }
    out
}
