pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use trait_def::{RecordStore, StoreError, StoreResult};

/// Mint a random 32-hex-char record/session id.
pub fn generate_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let hi: u64 = rng.gen_range(0..u64::MAX);
    let lo: u64 = rng.gen_range(0..u64::MAX);
    format!("{hi:016x}{lo:016x}")
}
