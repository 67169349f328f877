use chrono::{DateTime, Utc};

/// Dollar amount with cents; `-` when unknown.
pub fn usd(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "-".to_string(),
    }
}

/// LLM costs are fractions of a cent, so they keep four decimals.
pub fn cost(value: f64) -> String {
    format!("${:.4}", value)
}

pub fn signed(value: i64) -> String {
    format!("{:+}", value)
}

pub fn signed_usd(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("-${:.2}", -v),
        Some(v) => format!("+${:.2}", v),
        None => "-".to_string(),
    }
}

pub fn millis(value: Option<f64>) -> String {
    match value {
        Some(ms) if ms >= 1000.0 => format!("{:.1}s", ms / 1000.0),
        Some(ms) => format!("{:.0}ms", ms),
        None => "unknown".to_string(),
    }
}

/// Token counts with thousands separators.
pub fn tokens(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

pub fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
