//! Display formatting shared by charts and templates.

use minijinja::Value;

/// `1234567` -> `1,234,567`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Template filter: numbers get separators, missing values render as `-`.
pub fn thousands_filter(value: Value) -> String {
    if value.is_none() || value.is_undefined() {
        return "-".to_string();
    }
    match f64::try_from(value.clone()) {
        Ok(n) if n.is_finite() => thousands(n.round() as i64),
        _ => value.to_string(),
    }
}

/// Template filter: serialized `NaiveDate` / `NaiveDateTime` to `YYYY-MM-DD`.
pub fn date_filter(value: Value) -> String {
    match value.as_str() {
        Some(s) => s.get(..10).unwrap_or(s).to_string(),
        None => "-".to_string(),
    }
}

/// Template filter: serialized `NaiveDateTime` to `YYYY-MM-DD HH:MM:SS`.
pub fn datetime_filter(value: Value) -> String {
    match value.as_str() {
        Some(s) => s.replacen('T', " ", 1).chars().take(19).collect(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-45000), "-45,000");
    }

    #[test]
    fn test_filters() {
        assert_eq!(thousands_filter(Value::from(12345)), "12,345");
        assert_eq!(thousands_filter(Value::from(1500.6)), "1,501");
        assert_eq!(thousands_filter(Value::from(())), "-");
        assert_eq!(date_filter(Value::from("2024-03-05T10:11:12")), "2024-03-05");
        assert_eq!(datetime_filter(Value::from("2024-03-05T10:11:12.5")), "2024-03-05 10:11:12");
        assert_eq!(date_filter(Value::from(())), "-");
    }

    #[test]
    fn test_date_filter_multibyte() {
        assert_eq!(date_filter(Value::from("2024年03月05日")), "2024年03月05日");
        assert_eq!(date_filter(Value::from("2024-03")), "2024-03");
    }
}
