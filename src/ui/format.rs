use crate::monitor::detector::DisplayEntry;
use num_format::{Locale, ToFormattedString};

/// Formats a price as dollars with thousands separators, e.g. `$63,456.78`.
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}${}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// One console line for a display entry, without colors.
pub fn format_entry(entry: &DisplayEntry) -> String {
    format!("{:<16}{:>14.2}", format!("{}:", entry.label()), entry.value)
}
