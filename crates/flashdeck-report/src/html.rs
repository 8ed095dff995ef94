//! HTML statistics report.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use flashdeck_core::statistics::{DeckStats, ForecastDay};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from deck statistics.
pub fn generate_html(stats: &DeckStats) -> String {
    let mut html = String::new();
    let deck = html_escape(&stats.deck.to_string());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>flashdeck stats: {deck}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>flashdeck stats</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Deck: <strong>{}</strong> | {} cards | as of {}</p>\n",
        deck, stats.total_cards, stats.as_of
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>New</th><th>Learning</th><th>Review</th><th>Due</th><th>Overdue</th><th>Mature</th><th>Avg ease</th><th>Reviews</th><th>Success</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.1}%</td></tr></tbody>\n",
        stats.new_cards,
        stats.learning_cards,
        stats.review_cards,
        stats.due_now,
        stats.overdue,
        stats.mature_cards,
        stats.average_ease,
        stats.reviews.total,
        stats.reviews.success_rate * 100.0,
    ));
    html.push_str("</table>\n");

    html.push_str("<h2>Forecast</h2>\n");
    html.push_str(&generate_forecast_chart(&stats.forecast));
    html.push_str("</section>\n");

    html.push_str("<section class=\"cards\">\n");
    html.push_str("<h2>Cards</h2>\n");
    html.push_str("<table class=\"cards-table\" id=\"cards\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Id</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Phase</th><th onclick=\"sortTable(3)\">Due</th><th onclick=\"sortTable(4)\">Interval</th><th onclick=\"sortTable(5)\">Ease</th><th onclick=\"sortTable(6)\">Reviews</th><th onclick=\"sortTable(7)\">Success</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for c in &stats.cards {
        let row_class = if c.due <= stats.as_of { "due" } else { "later" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}d</td><td>{:.2}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            row_class,
            c.card_id,
            html_escape(&c.question),
            c.phase,
            c.due,
            c.interval_days,
            c.ease,
            c.reviews.total,
            c.reviews.success_rate * 100.0,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(stats).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(stats: &DeckStats, path: &Path) -> Result<()> {
    let html = generate_html(stats);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    Ok(())
}

fn generate_forecast_chart(forecast: &[ForecastDay]) -> String {
    let bar_width = 40;
    let max_height = 160;
    let padding = 12;
    let label_height = 40;

    let peak = forecast.iter().map(|d| d.due).max().unwrap_or(0).max(1);
    let total_width = forecast.len() * (bar_width + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        total_width,
        max_height + label_height
    );

    for (i, day) in forecast.iter().enumerate() {
        let x = i * (bar_width + padding) + padding;
        let height = day.due * max_height / peak;
        let y = max_height - height;
        let color = if i == 0 { "#ef4444" } else { "#3b82f6" };

        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            x, y, bar_width, height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            max_height + 14,
            day.due
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            max_height + 30,
            day.date.format("%m-%d")
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --due: #fde2e2; --later: transparent; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --due: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.due { background: var(--due); }
.later { background: var(--later); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('cards');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const cmp = va.localeCompare(vb, undefined, { numeric: true });
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flashdeck_core::model::{Card, Deck, SchedulingState};
    use flashdeck_core::statistics::compute_deck_stats;

    fn make_stats() -> DeckStats {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut deck = Deck::new("alice", "html<deck>");
        deck.cards.push(Card {
            id: 7,
            question: "<script>alert('x')</script>".into(),
            answer: "no".into(),
            schedule: SchedulingState::new(2.5, today),
        });
        compute_deck_stats(&deck, &[], today)
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_stats());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("alice/html&lt;deck&gt;"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<td>7</td>"));
    }

    #[test]
    fn html_report_escapes_card_content() {
        let html = generate_html(&make_stats());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.html");

        write_html_report(&make_stats(), &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
