use regex::Regex;
use std::sync::OnceLock;

/// Tokens banks splice into counterparty strings that carry no merchant
/// information: payment-rail noise and the metro suffixes POS terminals append.
const BOILERPLATE_TOKENS: &[&str] = &[
    // payment-rail noise
    "upi", "neft", "imps", "rtgs", "pos", "vpa", "ref", "txn",
    // city suffixes
    "mumbai", "delhi", "bangalore", "bengaluru", "pune", "chennai", "kolkata",
    "hyderabad", "ahmedabad", "gurgaon", "gurugram", "noida", "jaipur", "kochi",
];

fn re_boilerplate() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        let alternation = BOILERPLATE_TOKENS.join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("invalid regex")
    })
}

fn re_embedded_date() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").expect("invalid regex"))
}

/// Turn a raw counterparty span into a human-readable display name.
///
/// Drops the boilerplate vocabulary case-insensitively, strips embedded
/// numeric day-month-year dates, maps every other non-alphanumeric character
/// to a space, collapses whitespace, and Title Cases each remaining word.
/// The output alphabet is letters, digits and single spaces; empty input
/// yields empty output (the caller owns the generic-label fallback).
pub fn clean_merchant_name(raw: &str) -> String {
    let no_boilerplate = re_boilerplate().replace_all(raw, " ");
    let no_dates = re_embedded_date().replace_all(&no_boilerplate, " ");
    let mapped: String = no_dates
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    mapped
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
