use std::env;

use course_payment_engine::{create_database_if_missing, SqliteDatabase};
use log::*;

/// Creates a fresh database at `url` and applies the schema migrations.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database_if_missing(url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to test database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete for {url}");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/cpg_test_store_{}.db", env::temp_dir().display(), rand::random::<u64>())
}
