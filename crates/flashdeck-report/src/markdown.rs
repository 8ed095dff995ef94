//! Markdown statistics report.

use flashdeck_core::statistics::DeckStats;

/// Make text safe inside a Markdown table cell.
fn md_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Format deck statistics as Markdown.
pub fn stats_to_markdown(stats: &DeckStats) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Deck `{}`\n\n", stats.deck));
    md.push_str(&format!(
        "**Summary:** {} cards, {} due, {} overdue, {} mature (as of {})\n\n",
        stats.total_cards, stats.due_now, stats.overdue, stats.mature_cards, stats.as_of
    ));

    md.push_str("| New | Learning | Review | Avg ease | Reviews | Success |\n");
    md.push_str("|-----|----------|--------|----------|---------|---------|\n");
    md.push_str(&format!(
        "| {} | {} | {} | {:.2} | {} | {:.1}% |\n\n",
        stats.new_cards,
        stats.learning_cards,
        stats.review_cards,
        stats.average_ease,
        stats.reviews.total,
        stats.reviews.success_rate * 100.0
    ));

    md.push_str("### Forecast\n\n");
    md.push_str("| Date | Due |\n");
    md.push_str("|------|-----|\n");
    for day in &stats.forecast {
        md.push_str(&format!("| {} | {} |\n", day.date, day.due));
    }
    md.push('\n');

    if !stats.cards.is_empty() {
        md.push_str("### Cards\n\n");
        md.push_str("| Id | Question | Phase | Due | Interval | Ease | Reviews | Success |\n");
        md.push_str("|----|----------|-------|-----|----------|------|---------|---------|\n");
        for c in &stats.cards {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {}d | {:.2} | {} | {:.1}% |\n",
                c.card_id,
                md_cell(&c.question),
                c.phase,
                c.due,
                c.interval_days,
                c.ease,
                c.reviews.total,
                c.reviews.success_rate * 100.0
            ));
        }
    }

    md
}
