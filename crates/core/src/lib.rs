pub mod money;
pub mod transaction;

pub use money::Money;
pub use transaction::{
    Category, Channel, Direction, SyncState, Transaction, MAX_COUNTERPARTY_LEN,
};
