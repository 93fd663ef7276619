// ---------------------------------------------------------------------------
// Number formatting for labels, tables and axes
// ---------------------------------------------------------------------------

/// Whole dollars with thousands separators: `$184,925,485`.
pub fn money(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

/// Short form for axes and cards: `$1.2B`, `$340.5M`, `$12.0K`, `$950`.
pub fn compact_money(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{sign}${:.1}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.1}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.1}K", abs / 1e3)
    } else {
        format!("{sign}${abs:.0}")
    }
}

/// [`money`] for nullable cells.
pub fn opt_money(value: Option<f64>) -> String {
    value.map(money).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(999.0), "$999");
        assert_eq!(money(1280.0), "$1,280");
        assert_eq!(money(184_925_485.4), "$184,925,485");
        assert_eq!(money(-1_000_000.0), "-$1,000,000");
    }

    #[test]
    fn compact_money_picks_a_unit() {
        assert_eq!(compact_money(950.0), "$950");
        assert_eq!(compact_money(12_000.0), "$12.0K");
        assert_eq!(compact_money(340_500_000.0), "$340.5M");
        assert_eq!(compact_money(1_200_000_000.0), "$1.2B");
    }

    #[test]
    fn missing_money_is_marked() {
        assert_eq!(opt_money(None), "n/a");
        assert_eq!(opt_money(Some(33.0)), "$33");
    }
}
