use std::path::Path;

use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;

use crate::error::Result;

const NAMESPACE: &str = "todo";
const DATABASE: &str = "tasks";

/// Open (or create) the embedded database at the given path and make sure the
/// task table exists.
pub async fn bootstrap(path: impl AsRef<Path>) -> Result<Surreal<Db>> {
    let db = Surreal::new::<RocksDb>(path.as_ref()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    define_schema(&db).await?;
    Ok(db)
}

async fn define_schema(db: &Surreal<Db>) -> Result<()> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS task SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS title ON task TYPE string;
        DEFINE FIELD IF NOT EXISTS description ON task TYPE string;
        DEFINE FIELD IF NOT EXISTS completed ON task TYPE bool;
        "#,
    )
    .await?;
    Ok(())
}

/// In-memory database for tests.
#[cfg(test)]
pub async fn bootstrap_memory() -> Result<Surreal<Db>> {
    use surrealdb::engine::local::Mem;

    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    define_schema(&db).await?;
    Ok(db)
}
