use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;

use paisa_core::{
    Category, Channel, Direction, Money, SyncState, Transaction, MAX_COUNTERPARTY_LEN,
};

use crate::categorize::KeywordCategorizer;
use crate::hash;
use crate::normalize;

/// Counterparty for every ATM withdrawal; the matched location is discarded.
pub const CASH_WITHDRAWAL_LABEL: &str = "Cash Withdrawal";
/// Counterparty for credits that name no sender.
pub const CREDIT_FALLBACK_LABEL: &str = "Deposit/Transfer";
/// Counterparty for merchant spans that normalize to nothing.
pub const MERCHANT_FALLBACK_LABEL: &str = "Unknown Merchant";

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Cheap gate lifted from real bank traffic: a transactional message always
// names the currency somewhere.
re!(re_currency_marker, r"(?i)rs|inr|₹");

re!(re_upi_sent,
    r"(?i)\b(?:sent|paid)\s+(?:rs\.?|inr|₹)\s*([\d,]+(?:\.\d{1,2})?)\s+to\s+(.+?)(?:\s+via\b|\s+on\b|\s+ref\b|[.,]|$)");
re!(re_bank_debited,
    r"(?i)(?:rs\.?|inr|₹)\s*([\d,]+(?:\.\d{1,2})?)\s+(?:has\s+been\s+)?debited\b[^.]*?\b(?:to|towards)\s+(.+?)(?:\s+on\b|[.,]|$)");
re!(re_card_spent,
    r"(?i)\bspent\b[^.]*?(?:rs\.?|inr|₹)\s*([\d,]+(?:\.\d{1,2})?)\b[^.]*?\bat\s+(.+?)(?:\s+on\b|[.,]|$)");
re!(re_atm_withdrawn,
    r"(?i)(?:rs\.?|inr|₹)\s*([\d,]+(?:\.\d{1,2})?)\s+withdrawn\b");
re!(re_bank_credited,
    r"(?i)\bcredited\b(?:\s+with)?[^0-9₹]*?(?:rs\.?|inr|₹)\s*([\d,]+(?:\.\d{1,2})?)(?:[^.]*?\bfrom\s+(.+?)(?:\s+on\b|\s+to\b|[.,]|$))?");

re!(re_balance,
    r"(?i)\b(?:(?:avl|available|current)\s+)?(?:bal|balance)\b[^0-9]*?([\d,]+(?:\.\d{1,2})?)");

// ── Ordered pattern table ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum PatternKind {
    /// Group 1 = amount, group 2 = raw counterparty span.
    Merchant,
    /// Group 1 = amount; counterparty is the fixed withdrawal label.
    CashWithdrawal,
    /// Group 1 = amount, optional group 2 = sender span; category forced to Income.
    Credit,
}

struct MessagePattern {
    name: &'static str,
    direction: Direction,
    channel: Channel,
    kind: PatternKind,
    regex: fn() -> &'static Regex,
}

/// Priority order is fixed: overlapping phrasings resolve to the first entry
/// whose structural shape matches. Patterns are never combined or scored.
const PATTERNS: &[MessagePattern] = &[
    MessagePattern {
        name: "upi-sent",
        direction: Direction::Debit,
        channel: Channel::Upi,
        kind: PatternKind::Merchant,
        regex: re_upi_sent,
    },
    MessagePattern {
        name: "bank-debited",
        direction: Direction::Debit,
        channel: Channel::Bank,
        kind: PatternKind::Merchant,
        regex: re_bank_debited,
    },
    MessagePattern {
        name: "card-spent",
        direction: Direction::Debit,
        channel: Channel::Card,
        kind: PatternKind::Merchant,
        regex: re_card_spent,
    },
    MessagePattern {
        name: "atm-withdrawn",
        direction: Direction::Debit,
        channel: Channel::Atm,
        kind: PatternKind::CashWithdrawal,
        regex: re_atm_withdrawn,
    },
    MessagePattern {
        name: "bank-credited",
        direction: Direction::Credit,
        channel: Channel::Bank,
        kind: PatternKind::Credit,
        regex: re_bank_credited,
    },
];

// ── Extraction engine ────────────────────────────────────────────────────────

/// Turns one raw notification message into at most one candidate transaction.
///
/// Pure with respect to I/O: the ingestion timestamp is supplied by the
/// caller and the fingerprint is a function of the raw bytes alone.
pub struct MessageExtractor {
    categorizer: KeywordCategorizer,
}

impl MessageExtractor {
    pub fn new(categorizer: KeywordCategorizer) -> Self {
        Self { categorizer }
    }

    /// `None` is the normal outcome for text with no recognizable shape, and
    /// for a matched shape whose amount is unparseable or non-positive — the
    /// latter never falls through to a weaker pattern.
    pub fn extract(&self, raw_text: &str, received_at: DateTime<Utc>) -> Option<Transaction> {
        if !re_currency_marker().is_match(raw_text) {
            return None;
        }

        // Collapse whitespace runs so patterns stay robust to incidental
        // formatting; the fingerprint still hashes the original bytes.
        let text = collapse_whitespace(raw_text);

        let (pattern, caps) = PATTERNS
            .iter()
            .find_map(|p| (p.regex)().captures(&text).map(|c| (p, c)))?;

        let amount = parse_amount(caps.get(1)?.as_str())?;
        let raw_span = caps.get(2).map(|m| m.as_str());

        let counterparty = match pattern.kind {
            PatternKind::CashWithdrawal => CASH_WITHDRAWAL_LABEL.to_string(),
            PatternKind::Credit => display_name_or(raw_span, CREDIT_FALLBACK_LABEL),
            PatternKind::Merchant => display_name_or(raw_span, MERCHANT_FALLBACK_LABEL),
        };

        // Credits are Income no matter what the counterparty looks like; the
        // keyword table only runs for spends.
        let category = match pattern.kind {
            PatternKind::Credit => Category::Income,
            PatternKind::CashWithdrawal => self.categorizer.categorize(&counterparty, true),
            PatternKind::Merchant => self.categorizer.categorize(&counterparty, false),
        };

        Some(Transaction {
            id: None,
            amount,
            direction: pattern.direction,
            counterparty,
            channel: pattern.channel,
            occurred_at: received_at,
            balance_after: extract_balance(&text),
            fingerprint: hash::fingerprint(raw_text),
            category: Some(category),
            sync_state: SyncState::Pending,
        })
    }
}

impl Default for MessageExtractor {
    fn default() -> Self {
        Self::new(KeywordCategorizer::default())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort scan for a reported account balance, independent of which
/// primary pattern matched.
fn extract_balance(text: &str) -> Option<Money> {
    let caps = re_balance().captures(text)?;
    let dec = parse_decimal(caps.get(1)?.as_str())?;
    if dec < Decimal::ZERO {
        return None;
    }
    Some(Money::from_decimal(dec))
}

fn parse_amount(s: &str) -> Option<Money> {
    let dec = parse_decimal(s)?;
    if dec <= Decimal::ZERO {
        return None;
    }
    Some(Money::from_decimal(dec))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.replace(',', "")).ok()
}

/// Truncate the raw span, normalize it, and fall back when nothing survives.
fn display_name_or(raw_span: Option<&str>, fallback: &str) -> String {
    let truncated: String = raw_span
        .unwrap_or("")
        .chars()
        .take(MAX_COUNTERPARTY_LEN)
        .collect();
    let name = normalize::clean_merchant_name(&truncated);
    if name.is_empty() {
        fallback.to_string()
    } else {
        name
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
