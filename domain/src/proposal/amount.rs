//! Monetary amount extraction from transcript text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<sym>[$€£])\s?(?P<n1>\d[\d,]*(?:\.\d+)?)
        | \b(?P<code1>(?i:usd|eur|gbp|jpy|chf|cad|aud))\s?(?P<n2>\d[\d,]*(?:\.\d+)?)
        | (?P<n3>\d[\d,]*(?:\.\d+)?)\s?(?P<code2>(?i:usd|eur|gbp|jpy|chf|cad|aud))\b
        ",
    )
    .expect("amount pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub value: f64,
    /// ISO 4217 code
    pub currency: String,
}

impl std::fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.value, self.currency)
    }
}

/// First currency amount in `text`: `$1,234.56`, `USD 500`, `500 EUR`, `€300`.
pub fn extract_amount(text: &str) -> Option<MonetaryAmount> {
    let caps = AMOUNT_PATTERN.captures(text)?;

    let number = caps
        .name("n1")
        .or_else(|| caps.name("n2"))
        .or_else(|| caps.name("n3"))?
        .as_str();
    let value = number.replace(',', "").parse::<f64>().ok()?;

    let currency = if let Some(sym) = caps.name("sym") {
        match sym.as_str() {
            "$" => "USD",
            "€" => "EUR",
            _ => "GBP",
        }
        .to_string()
    } else {
        caps.name("code1")
            .or_else(|| caps.name("code2"))?
            .as_str()
            .to_uppercase()
    };

    Some(MonetaryAmount { value, currency })
}
