use chrono::NaiveDateTime;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let cents = (val.abs() * 100.0).round() as i64;
    let (mut dollars, rem) = (cents / 100, cents % 100);

    let mut groups: Vec<String> = Vec::new();
    while dollars >= 1000 {
        groups.push(format!("{:03}", dollars % 1000));
        dollars /= 1000;
    }
    groups.push(dollars.to_string());
    groups.reverse();

    format!("{sign}${}.{rem:02}", groups.join(","))
}

/// Render just the calendar date of a stored timestamp.
pub fn short_date(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}
