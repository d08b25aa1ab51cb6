//! Display helpers shared by templates, JSON views and the client.

use chrono::NaiveDate;

/// Formats an amount as Indian Rupees without fractional digits.
///
/// Uses Indian digit grouping: the last three digits form one group and the
/// remaining digits are grouped in pairs (`1,50,000`, `12,34,56,789`).
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹0".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    format!("{sign}₹{}", group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// `16 Oct 2026` style date used across the dashboards.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}
