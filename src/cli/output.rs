// Output formatting utilities

use crate::models::{Order, StageTable};
use crate::tracking::StageSnapshot;
use chrono::{Local, TimeZone};
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_CYAN: &str = "\x1b[36m";

/// Clears the screen and homes the cursor
pub const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const MAX_BAR_WIDTH: usize = 40;
const MIN_BAR_WIDTH: usize = 10;

/// Message shown when the store holds no orders
pub const EMPTY_STATE_MESSAGE: &str = "No orders to track.";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn paint(text: &str, code: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format a price with two decimals
pub fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a millisecond timestamp in local time
pub fn format_timestamp_ms(ts_ms: i64) -> String {
    match Local.timestamp_millis_opt(ts_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{}ms", ts_ms),
    }
}

/// Format a millisecond duration as seconds: "5s", "2.5s", "1m5s"
pub fn format_duration_ms(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let secs = ms / 1000;
    let millis = ms % 1000;

    if secs >= 60 {
        format!("{}{}m{}s", sign, secs / 60, secs % 60)
    } else if millis == 0 {
        format!("{}{}s", sign, secs)
    } else {
        format!("{}{}.{}s", sign, secs, millis / 100)
    }
}

/// Format the order list, newest first
pub fn format_order_list_table(orders: &[Order], is_tty: bool) -> String {
    if orders.is_empty() {
        return EMPTY_STATE_MESSAGE.to_string();
    }

    let rows: Vec<[String; 5]> = orders
        .iter()
        .rev()
        .map(|order| {
            [
                order.id.clone(),
                order.title(),
                format_price(order.total),
                if order.status.is_empty() { "Unknown".to_string() } else { order.status.clone() },
                format_timestamp_ms(order.timestamp),
            ]
        })
        .collect();

    let headers = ["ID", "Title", "Total", "Status", "Placed"];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(&paint(header_line.trim_end(), ANSI_BOLD, is_tty));
    output.push('\n');

    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
    output.push_str(&separator);
    output.push('\n');

    for row in &rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 2 {
                    format!("{:>width$}", cell, width = widths[i])
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.push_str(&format!("\n{} order(s)", orders.len()));
    output
}

/// Stage timeline: reached stages are marked active
pub fn format_timeline(stages: &StageTable, snapshot: &StageSnapshot, is_tty: bool) -> String {
    stages
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            if snapshot.is_active(i) {
                paint(&format!("  ● {}", stage.name), ANSI_FG_GREEN, is_tty)
            } else {
                paint(&format!("  ○ {}", stage.name), ANSI_DIM, is_tty)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Horizontal bar chart of per-stage progress, sized to `width` columns
pub fn format_progress_chart(
    stages: &StageTable,
    snapshot: &StageSnapshot,
    width: usize,
    is_tty: bool,
) -> String {
    let label_width = stages
        .stages()
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    // "  <label>  |<bar>| 100%  <window>"
    let bar_width = width
        .saturating_sub(label_width + 20)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);

    let mut lines = Vec::new();
    for (i, stage) in stages.stages().iter().enumerate() {
        let progress = snapshot.progress.get(i).copied().unwrap_or(0.0);
        let filled = ((progress / 100.0) * bar_width as f64).round() as usize;
        let filled = filled.min(bar_width);
        let bar: String = std::iter::repeat(BAR_FILLED)
            .take(filled)
            .chain(std::iter::repeat(BAR_EMPTY).take(bar_width - filled))
            .collect();

        let color = if progress >= 100.0 {
            ANSI_FG_GREEN
        } else if progress > 0.0 {
            ANSI_FG_CYAN
        } else {
            ANSI_DIM
        };

        let window = stages
            .window(i)
            .map(|(start, end)| format_duration_ms(end - start))
            .unwrap_or_default();

        lines.push(format!(
            "  {:<label_width$}  |{}| {:>3}%  {}",
            stage.name,
            paint(&bar, color, is_tty),
            progress.round() as i64,
            window,
            label_width = label_width,
        ));
    }
    lines.join("\n")
}

/// Detail view for one order: header, timeline and progress chart
pub fn format_order_detail(
    order: &Order,
    stages: &StageTable,
    snapshot: &StageSnapshot,
    width: usize,
    is_tty: bool,
) -> String {
    let mut output = String::new();
    output.push_str(&paint(&format!("Order Details: {}", order.title()), ANSI_BOLD, is_tty));
    output.push('\n');
    output.push_str(&format!("Order:    {}\n", order.id));
    output.push_str(&format!("Placed:   {}\n", format_timestamp_ms(order.timestamp)));
    output.push_str(&format!("Total:    {}\n", format_price(order.total)));
    output.push_str(&format!(
        "Status:   {} ({} elapsed)\n",
        snapshot.stage_name,
        format_duration_ms(snapshot.elapsed_ms)
    ));

    if order.products.len() > 1 {
        output.push_str("Items:\n");
        for product in &order.products {
            output.push_str(&format!("  - {} ({})\n", product.title, format_price(product.price)));
        }
    }

    output.push_str("\nTimeline:\n");
    output.push_str(&format_timeline(stages, snapshot, is_tty));
    output.push_str("\n\nProgress:\n");
    output.push_str(&format_progress_chart(stages, snapshot, width, is_tty));
    output
}

/// Stage table listing with thresholds and window lengths
pub fn format_stage_table(stages: &StageTable) -> String {
    let label_width = stages
        .stages()
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Stage".len());

    let mut lines = vec![format!("{:<3} {:<label_width$}  {:>9}  {:>8}", "#", "Stage", "Threshold", "Window", label_width = label_width)];
    for (i, stage) in stages.stages().iter().enumerate() {
        let window = stages
            .window(i)
            .map(|(start, end)| format_duration_ms(end - start))
            .unwrap_or_default();
        let window = if i + 1 == stages.len() {
            format!("{}+", window)
        } else {
            window
        };
        lines.push(format!(
            "{:<3} {:<label_width$}  {:>9}  {:>8}",
            i,
            stage.name,
            format_duration_ms(stage.duration_ms),
            window,
            label_width = label_width,
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewOrder, NewProduct};
    use crate::tracking::snapshot;

    fn order(id: &str, title: &str, ts: i64) -> Order {
        NewOrder::new(vec![NewProduct::new(title, 12.5)])
            .with_id(id)
            .into_order(ts, "In Warehouse")
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(19.999), "$20.00");
        assert_eq!(format_price(7.5), "$7.50");
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(0), "0s");
        assert_eq!(format_duration_ms(5_000), "5s");
        assert_eq!(format_duration_ms(2_500), "2.5s");
        assert_eq!(format_duration_ms(65_000), "1m5s");
        assert_eq!(format_duration_ms(-1_000), "-1s");
    }

    #[test]
    fn test_order_list_newest_first() {
        let orders = vec![order("o1", "Lamp", 1_000), order("o2", "Rug", 2_000)];
        let table = format_order_list_table(&orders, false);
        let lamp = table.find("Lamp").unwrap();
        let rug = table.find("Rug").unwrap();
        assert!(rug < lamp);
        assert!(table.contains("$12.50"));
        assert!(table.contains("In Warehouse"));
        assert!(table.ends_with("2 order(s)"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn test_order_list_empty() {
        assert_eq!(format_order_list_table(&[], false), EMPTY_STATE_MESSAGE);
    }

    #[test]
    fn test_progress_chart_bars() {
        let stages = StageTable::default();
        let snap = snapshot(&stages, 0, 4_000);
        let chart = format_progress_chart(&stages, &snap, 80, false);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("100%"));
        assert!(lines[1].contains(" 80%"));
        assert!(lines[1].contains("5s"));
        assert!(lines[2].contains("  0%"));
        assert!(!lines[2].contains(BAR_FILLED));
        assert!(!lines[0].contains(BAR_EMPTY));
    }

    #[test]
    fn test_timeline_marks_reached_stages() {
        let stages = StageTable::default();
        let snap = snapshot(&stages, 0, 4_000);
        let timeline = format_timeline(&stages, &snap, false);
        assert!(timeline.contains("● Shipped"));
        assert!(timeline.contains("○ Arrived in Country"));
    }

    #[test]
    fn test_order_detail() {
        let stages = StageTable::default();
        let o = order("o1", "Lamp", 0);
        let snap = snapshot(&stages, 0, 4_000);
        let detail = format_order_detail(&o, &stages, &snap, 80, false);
        assert!(detail.starts_with("Order Details: Lamp"));
        assert!(detail.contains("Status:   Shipped (4s elapsed)"));
        assert!(detail.contains("Timeline:"));
        assert!(detail.contains("Progress:"));
    }

    #[test]
    fn test_stage_table() {
        let table = format_stage_table(&StageTable::default());
        assert!(table.contains("In Warehouse"));
        assert!(table.contains("20s"));
        assert!(table.contains("5s+"));
    }
}
