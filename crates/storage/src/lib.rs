pub mod db;

pub use db::{
    create_db, insert_transaction, list_recent, list_unsynced, mark_synced,
    reset_all_to_pending, total_debited_since, update_category, DbPool,
};
