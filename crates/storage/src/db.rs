use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

use paisa_core::{Category, Channel, Direction, Money, SyncState, Transaction};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT NOT NULL UNIQUE,
            amount_paise INTEGER NOT NULL,
            direction TEXT NOT NULL,
            counterparty TEXT NOT NULL,
            channel TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            balance_paise INTEGER,
            category TEXT,
            sync_state INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_sync_state ON transactions(sync_state)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a transaction unless its fingerprint is already known.
///
/// Returns `false` — not an error — for a duplicate. The UNIQUE constraint
/// makes the check-and-insert atomic under concurrent callers.
pub async fn insert_transaction(pool: &DbPool, tx: &Transaction) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO transactions
            (fingerprint, amount_paise, direction, counterparty, channel,
             occurred_at, balance_paise, category, sync_state)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tx.fingerprint)
    .bind(tx.amount.to_paise())
    .bind(tx.direction.to_string())
    .bind(&tx.counterparty)
    .bind(tx.channel.to_string())
    .bind(tx.occurred_at)
    .bind(tx.balance_after.map(Money::to_paise))
    .bind(tx.category.map(|c| c.to_string()))
    .bind(tx.sync_state.as_flag())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

const SELECT_COLUMNS: &str = "id, fingerprint, amount_paise, direction, counterparty, channel, \
                              occurred_at, balance_paise, category, sync_state";

type TransactionRow = (
    i64,
    String,
    i64,
    String,
    String,
    String,
    DateTime<Utc>,
    Option<i64>,
    Option<String>,
    i64,
);

fn row_to_transaction(row: TransactionRow) -> Transaction {
    let direction = match row.3.as_str() {
        "CREDIT" => Direction::Credit,
        _ => Direction::Debit,
    };
    let channel = Channel::from_str(&row.5).unwrap_or(Channel::Bank);
    Transaction {
        id: Some(row.0),
        fingerprint: row.1,
        amount: Money::from_paise(row.2),
        direction,
        counterparty: row.4,
        channel,
        occurred_at: row.6,
        balance_after: row.7.map(Money::from_paise),
        category: row.8.map(|c| Category::from_label(&c)),
        sync_state: SyncState::from_flag(row.9),
    }
}

/// All records still awaiting a successful push, in stable insertion order.
pub async fn list_unsynced(pool: &DbPool) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions WHERE sync_state = 0 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_transaction).collect())
}

/// Newest-first listing for downstream presentation.
pub async fn list_recent(pool: &DbPool, limit: i64) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY occurred_at DESC, id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_transaction).collect())
}

/// Transition the given records PENDING → SYNCED. Unknown or already-synced
/// ids are silently skipped.
pub async fn mark_synced(pool: &DbPool, ids: &[i64]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!("UPDATE transactions SET sync_state = 1 WHERE id IN ({placeholders})");

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    query.execute(pool).await?;

    Ok(())
}

/// Overwrite the category of the record with this fingerprint.
/// Returns whether a record was actually updated.
pub async fn update_category(
    pool: &DbPool,
    fingerprint: &str,
    category: Category,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE transactions SET category = ? WHERE fingerprint = ?")
        .bind(category.to_string())
        .bind(fingerprint)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Bulk SYNCED → PENDING, forcing the next reconciliation to re-push
/// everything. Used to repair suspected local/remote drift.
pub async fn reset_all_to_pending(pool: &DbPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE transactions SET sync_state = 0 WHERE sync_state = 1")
        .execute(pool)
        .await?;

    let reset = result.rows_affected();
    if reset > 0 {
        tracing::info!(reset, "reset synced records to pending for full resync");
    }
    Ok(reset)
}

/// Sum of all debit amounts at or after `since`. Feeds the external budget
/// collaborator; not used by the engine itself.
pub async fn total_debited_since(
    pool: &DbPool,
    since: DateTime<Utc>,
) -> Result<Money, sqlx::Error> {
    let paise: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount_paise), 0) FROM transactions \
         WHERE direction = 'DEBIT' AND occurred_at >= ?",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(Money::from_paise(paise))
}
