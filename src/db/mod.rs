pub mod students;
pub mod table;

pub use students::StudentsTable;
pub use table::{Table, TableError};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;

/// Open the single connection shared by every table. The caller owns the
/// handle and is responsible for closing it.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // One connection, kept for the whole lifetime of the handle, so that
    // `sqlite::memory:` databases are not lost between statements.
    SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}
