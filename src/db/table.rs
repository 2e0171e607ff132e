use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No row in '{table}' with key {key}")]
    NotFound { table: &'static str, key: String },

    #[error("A row in '{table}' already has key {key}")]
    AlreadyExists { table: &'static str, key: String },

    #[error("Row in '{table}' with key {key} could not be read: {source}")]
    Decode {
        table: &'static str,
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Operations every table adapter offers over its value type `Value`,
/// identified by a primary key of type `Key`.
#[async_trait]
pub trait Table: Send + Sync {
    type Value: Send + Sync;
    type Key: Send + Sync;

    fn table_name(&self) -> &'static str;

    /// Create the table. Fails if it already exists.
    async fn create_table(&self) -> Result<(), TableError>;

    /// `Ok(None)` means the query ran and matched nothing.
    async fn find_by_primary_key(&self, key: Self::Key) -> Result<Option<Self::Value>, TableError>;

    async fn find_all(&self) -> Result<Vec<Self::Value>, TableError>;

    async fn drop_table(&self) -> Result<(), TableError>;

    /// Insert a new row. Fails with `AlreadyExists` if the key is taken.
    async fn save(&self, value: &Self::Value) -> Result<(), TableError>;

    /// Fails with `NotFound` if there is no row with the key.
    async fn delete(&self, key: Self::Key) -> Result<(), TableError>;

    /// Overwrite the row sharing `value`'s key. Fails with `NotFound` if there is none.
    async fn update(&self, value: &Self::Value) -> Result<(), TableError>;
}
