use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Display names longer than this are truncated at extraction time.
pub const MAX_COUNTERPARTY_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Debit => write!(f, "DEBIT"),
            Direction::Credit => write!(f, "CREDIT"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBIT" => Ok(Direction::Debit),
            "CREDIT" => Ok(Direction::Credit),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// Provenance of the message shape that produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Upi,
    Bank,
    Card,
    Atm,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Upi => write!(f, "UPI"),
            Channel::Bank => write!(f, "BANK"),
            Channel::Card => write!(f, "CARD"),
            Channel::Atm => write!(f, "ATM"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPI" => Ok(Channel::Upi),
            "BANK" => Ok(Channel::Bank),
            "CARD" => Ok(Channel::Card),
            "ATM" => Ok(Channel::Atm),
            other => Err(format!("Unknown channel: '{other}'")),
        }
    }
}

/// Closed spending-category set. Anything a categorizer or the remote side
/// produces outside this set collapses to `General` via [`Category::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Income,
    Cash,
    General,
}

impl Category {
    /// Total mapping from an arbitrary label into the closed set.
    pub fn from_label(label: &str) -> Category {
        match label {
            "Food" => Category::Food,
            "Travel" => Category::Travel,
            "Shopping" => Category::Shopping,
            "Bills" => Category::Bills,
            "Entertainment" => Category::Entertainment,
            "Health" => Category::Health,
            "Income" => Category::Income,
            "Cash" => Category::Cash,
            _ => Category::General,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Food => write!(f, "Food"),
            Category::Travel => write!(f, "Travel"),
            Category::Shopping => write!(f, "Shopping"),
            Category::Bills => write!(f, "Bills"),
            Category::Entertainment => write!(f, "Entertainment"),
            Category::Health => write!(f, "Health"),
            Category::Income => write!(f, "Income"),
            Category::Cash => write!(f, "Cash"),
            Category::General => write!(f, "General"),
        }
    }
}

/// Local-only synchronization bookkeeping; not part of remote identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    Pending,
    Synced,
}

impl SyncState {
    pub fn as_flag(self) -> i64 {
        match self {
            SyncState::Pending => 0,
            SyncState::Synced => 1,
        }
    }

    pub fn from_flag(flag: i64) -> SyncState {
        if flag == 0 {
            SyncState::Pending
        } else {
            SyncState::Synced
        }
    }
}

/// One financial event extracted from a single raw notification message.
///
/// `fingerprint` is the sole deduplication key: the store holds at most one
/// row per distinct value, and the remote side dedupes on it as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Storage row id; `None` until inserted.
    pub id: Option<i64>,
    pub amount: Money,
    pub direction: Direction,
    pub counterparty: String,
    pub channel: Channel,
    /// Ingestion timestamp — source messages rarely carry a machine-parseable time.
    pub occurred_at: DateTime<Utc>,
    pub balance_after: Option<Money>,
    pub fingerprint: String,
    pub category: Option<Category>,
    pub sync_state: SyncState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trip() {
        assert_eq!(Direction::from_str(&Direction::Debit.to_string()).unwrap(), Direction::Debit);
        assert_eq!(Direction::from_str(&Direction::Credit.to_string()).unwrap(), Direction::Credit);
        assert!(Direction::from_str("debit").is_err());
    }

    #[test]
    fn channel_round_trip() {
        for c in [Channel::Upi, Channel::Bank, Channel::Card, Channel::Atm] {
            assert_eq!(Channel::from_str(&c.to_string()).unwrap(), c);
        }
    }

    #[test]
    fn category_from_label_known() {
        assert_eq!(Category::from_label("Food"), Category::Food);
        assert_eq!(Category::from_label("Cash"), Category::Cash);
    }

    #[test]
    fn category_from_label_unknown_collapses_to_general() {
        assert_eq!(Category::from_label("Crypto"), Category::General);
        assert_eq!(Category::from_label(""), Category::General);
        assert_eq!(Category::from_label("food"), Category::General); // labels are case-sensitive
    }

    #[test]
    fn sync_state_flags() {
        assert_eq!(SyncState::Pending.as_flag(), 0);
        assert_eq!(SyncState::Synced.as_flag(), 1);
        assert_eq!(SyncState::from_flag(0), SyncState::Pending);
        assert_eq!(SyncState::from_flag(1), SyncState::Synced);
    }
}
