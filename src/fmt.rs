fn with_commas(int_part: &str) -> String {
    let mut out = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    let sign = if negative { "-" } else { "" };
    format!("{sign}${}.{dec_part}", with_commas(int_part))
}

/// Dollar amount the way donation tables show it: cents only when present.
/// `5400.0` -> `$5,400`, `25.5` -> `$25.50`.
pub fn dollars(val: f64) -> String {
    let rounded = (val * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{sign}${}", with_commas(&format!("{:.0}", rounded.abs())))
    } else {
        money(rounded)
    }
}

/// Two-decimal percentage of `value` in `total`; zero total gives "0.00".
pub fn percent(value: f64, total: f64) -> String {
    if total == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", value / total * 100.0)
}

pub fn number(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{sign}{}", with_commas(&n.unsigned_abs().to_string()))
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
