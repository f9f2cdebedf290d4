// Formatting and text helpers shared by the compiler stages.
//
// Everything that turns a number into report text, or report text back into
// a number, lives here so the parsing and aggregation code can work with
// plain `f64` values.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Sentinel shown when there is nothing to pay back.
pub const IMMEDIATE: &str = "Immediate";
/// Sentinel shown when a cost is never recovered (no annual savings).
pub const INFINITE: &str = "Infinite";

// Words that stay lower case inside a title.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "of", "on", "or",
    "per", "the", "to", "with",
];

// Abbreviations that are always written in capitals, whatever the input case.
static ACRONYMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AC", "AFR", "CO2", "HVAC", "LED", "PV", "RTU", "VFD", "VSD", "HID", "NJ", "DX",
    ]
    .into_iter()
    .collect()
});

/// Parse a number that may carry thousands separators, e.g. `12,345.6`.
///
/// Returns `None` for empty text or anything that is not a plain number.
pub fn parse_grouped_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Parse a currency cell such as `$12,345`, `-$50` or `$ 1,000.50`.
pub fn parse_currency(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let value = parse_grouped_number(rest)?;
    Some(if negative { -value } else { value })
}

/// Parse the leading number of a value with a unit, e.g. `12,000 kWh`.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    s.split_whitespace().next().and_then(parse_grouped_number)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimals with `num-format` grouping on the integer
    // part, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Grouped integer with the fraction dropped, the way energy quantities are
/// printed in the summary table (`2,999.9` becomes `2,999`).
pub fn format_truncated(n: f64) -> String {
    format_int(n.trunc() as i64)
}

/// Grouped integer rounded to the nearest unit.
pub fn format_rounded(n: f64) -> String {
    format_int(n.round() as i64)
}

/// US currency with a fixed number of decimals: `$1,234`, `$0.105`, `-$50`.
pub fn format_currency(n: f64, decimals: usize) -> String {
    let body = format_number(n.abs(), decimals);
    if n < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Round up to one decimal place.
pub fn ceil_tenth(value: f64) -> f64 {
    (value * 10.0).ceil() / 10.0
}

/// Payback period as report text, in months under a year and in years
/// otherwise.
///
/// - `Immediate` when nothing has to be spent.
/// - `Infinite` when there are no annual savings to recover the cost.
/// - A ratio up to 11/12 is rounded up to whole months.
/// - Anything longer is rounded up to a tenth of a year.
pub fn format_payback(annual_savings: f64, implementation_cost: f64) -> String {
    if implementation_cost == 0.0 {
        return IMMEDIATE.to_string();
    }
    if annual_savings == 0.0 {
        return INFINITE.to_string();
    }
    let ratio = implementation_cost / annual_savings;
    let (value, unit) = if ratio <= 11.0 / 12.0 {
        ((ratio * 12.0).ceil(), "month")
    } else {
        (ceil_tenth(ratio), "year")
    };
    format!("{} {}", trim_decimal(value), pluralize(unit, value))
}

/// One-decimal rendering without trailing zeros: `2.0` -> `2`, `1.5` -> `1.5`.
pub fn trim_decimal(value: f64) -> String {
    let s = format!("{:.1}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Append a plural `s` only when the amount is greater than one.
pub fn pluralize(word: &str, amount: f64) -> String {
    if amount > 1.0 {
        format!("{}s", word)
    } else {
        word.to_string()
    }
}

/// Title case for recommendation descriptions.
///
/// Each word (and each hyphenated part) starts with a capital and continues
/// in lower case. Connectives such as `and`/`of` stay lower case unless they
/// open the title, and known abbreviations stay in capitals.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                return lower;
            }
            word.split('-')
                .map(case_word)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn case_word(word: &str) -> String {
    let upper = word.to_uppercase();
    let bare: String = upper.chars().filter(|c| c.is_alphanumeric()).collect();
    if ACRONYMS.contains(bare.as_str()) {
        return upper;
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Join words as prose: `a`, `a and b`, `a, b and c`.
pub fn combine_words<S: AsRef<str>>(words: &[S]) -> String {
    let mut combined = String::new();
    for (i, word) in words.iter().enumerate() {
        combined.push_str(word.as_ref());
        if i + 2 < words.len() {
            combined.push_str(", ");
        } else if i + 2 == words.len() {
            combined.push_str(" and ");
        }
    }
    combined
}
