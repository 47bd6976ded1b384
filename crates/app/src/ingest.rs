use chrono::Utc;

use paisa_extract::MessageExtractor;
use paisa_storage::{insert_transaction, DbPool};

/// One raw notification as delivered by the message source. Senders are
/// advisory: an odd-looking one is logged, never a reason to skip parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub sender: Option<String>,
    pub body: String,
}

/// Parse one line of an intake file: either `SENDER<TAB>body` or a bare body.
/// Blank lines carry no message.
pub fn parse_intake_line(line: &str) -> Option<RawMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once('\t') {
        Some((sender, body)) if !sender.trim().is_empty() && !body.trim().is_empty() => {
            Some(RawMessage {
                sender: Some(sender.trim().to_string()),
                body: body.trim().to_string(),
            })
        }
        _ => Some(RawMessage {
            sender: None,
            body: line.to_string(),
        }),
    }
}

/// Indian bank sender ids are six characters with at least one letter.
fn is_bank_sender(sender: &str) -> bool {
    sender.len() == 6 && sender.chars().any(|c| c.is_alphabetic())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub extracted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub unmatched: usize,
}

/// Run one delivered batch through extraction and storage, sequentially.
///
/// Unmatched messages and duplicates are normal outcomes; only a storage
/// failure aborts the batch and propagates.
pub async fn ingest_batch(
    pool: &DbPool,
    extractor: &MessageExtractor,
    messages: &[RawMessage],
) -> Result<IngestSummary, sqlx::Error> {
    let mut summary = IngestSummary::default();

    for message in messages {
        if let Some(sender) = &message.sender {
            if !is_bank_sender(sender) {
                tracing::warn!(
                    sender = %sender,
                    "sender does not look like a bank id; parsing anyway"
                );
            }
        }

        match extractor.extract(&message.body, Utc::now()) {
            Some(tx) => {
                summary.extracted += 1;
                if insert_transaction(pool, &tx).await? {
                    tracing::info!(
                        counterparty = %tx.counterparty,
                        amount = %tx.amount,
                        channel = %tx.channel,
                        "stored transaction"
                    );
                    summary.inserted += 1;
                } else {
                    tracing::debug!(fingerprint = %tx.fingerprint, "duplicate message ignored");
                    summary.duplicates += 1;
                }
            }
            None => {
                summary.unmatched += 1;
                tracing::debug!("no transaction found in message");
            }
        }
    }

    Ok(summary)
}
