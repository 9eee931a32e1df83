//! Pooled SQLite connection

use di::inject;
use di::injectable;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::Mutex;

/// When set, newly created `DatabaseConnection`s use this pool instead of
/// `DATABASE_URL`. The DI provider constructs `DatabaseConnection` itself, so
/// tests have no other way to hand it an in-memory database.
static TEST_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

pub struct DatabaseConnection {
    connection: SqlitePool,
}

#[injectable]
impl DatabaseConnection {
    #[inject]
    pub fn create() -> DatabaseConnection {
        if let Some(pool) = TEST_POOL.lock().unwrap().clone() {
            return DatabaseConnection { connection: pool };
        }

        dotenvy::dotenv().ok();
        let connection_string = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let options = SqliteConnectOptions::from_str(&connection_string)
            .expect("invalid DATABASE_URL")
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        DatabaseConnection { connection: pool }
    }
}

impl DatabaseConnection {
    pub fn set_test_pool(pool: SqlitePool) {
        *TEST_POOL.lock().unwrap() = Some(pool);
    }

    pub fn clear_test_pool() {
        *TEST_POOL.lock().unwrap() = None;
    }

    /// Adds the `read` column to `chats` when the database predates it.
    pub async fn ensure_read_column(&self) -> Result<(), sqlx::Error> {
        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('chats')")
                .fetch_all(&self.connection)
                .await?;

        if !columns.iter().any(|name| name == "read") {
            sqlx::query("ALTER TABLE chats ADD COLUMN read BOOLEAN DEFAULT FALSE")
                .execute(&self.connection)
                .await?;
            info!("Added read column to chats table");
        }

        Ok(())
    }
}

impl Deref for DatabaseConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}
