//! Price text parsing
//!
//! Shop pages write prices in many shapes: `1 250,50 ₼`, `$1,250.50`,
//! `1.250 AZN`, `25 man`. Digits are pulled out with a regex, separators are
//! disambiguated, and the currency is read from symbols or codes around them.

use std::str::FromStr;

use mart_core::entities::Currency;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static AMOUNT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\d[\d\s\u{00a0}.,']*").ok());

static MANAT_WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)\bman(at)?\b").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPrice {
    pub amount: Decimal,
    pub currency: Currency,
}

/// Parse the first amount in `text`. `None` when no digits are present.
pub fn parse_price(text: &str) -> Option<ParsedPrice> {
    let raw = AMOUNT.as_ref()?.find(text)?.as_str();
    let amount = normalize_amount(raw)?;
    Some(ParsedPrice {
        amount,
        currency: detect_currency(text),
    })
}

/// Currency named in `text`, AZN when nothing matches
pub fn detect_currency(text: &str) -> Currency {
    let upper = text.to_uppercase();
    if text.contains('₼')
        || upper.contains("AZN")
        || MANAT_WORD.as_ref().is_some_and(|re| re.is_match(text))
    {
        Currency::Azn
    } else if text.contains('$') || upper.contains("USD") {
        Currency::Usd
    } else if text.contains('€') || upper.contains("EUR") {
        Currency::Eur
    } else {
        Currency::Azn
    }
}

/// Turn `1 250,50` or `1,250.50` into a decimal.
///
/// When both `.` and `,` appear the last one is the decimal point. A single
/// kind of separator is a decimal point only if it occurs once and is
/// followed by one or two digits.
fn normalize_amount(raw: &str) -> Option<Decimal> {
    let compact: String = raw
        .trim_end_matches(['.', ',', ' ', '\u{00a0}', '\''])
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    let last_dot = compact.rfind('.');
    let last_comma = compact.rfind(',');

    let decimal_sep = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
        (Some(_), None) => single_separator_is_decimal(&compact, '.').then_some('.'),
        (None, Some(_)) => single_separator_is_decimal(&compact, ',').then_some(','),
        (None, None) => None,
    };

    let mut normalized = String::with_capacity(compact.len());
    let split_at = decimal_sep.and_then(|sep| compact.rfind(sep));
    for (i, c) in compact.char_indices() {
        if c.is_ascii_digit() {
            normalized.push(c);
        } else if Some(i) == split_at {
            normalized.push('.');
        }
    }

    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

fn single_separator_is_decimal(compact: &str, sep: char) -> bool {
    if compact.matches(sep).count() != 1 {
        return false;
    }
    compact
        .rsplit(sep)
        .next()
        .is_some_and(|tail| (1..=2).contains(&tail.len()))
}
