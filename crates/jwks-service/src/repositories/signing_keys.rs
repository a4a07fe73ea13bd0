use crate::config::KeySelectionPolicy;
use crate::errors::JwksError;
use crate::models::KeyRecord;
use sqlx::SqlitePool;

const SELECT_VALID_BY_EXPIRY: &str = r#"
    SELECT kid, key, exp
    FROM keys
    WHERE exp > ?
    ORDER BY exp ASC, kid ASC
    LIMIT 1
"#;

const SELECT_EXPIRED_BY_EXPIRY: &str = r#"
    SELECT kid, key, exp
    FROM keys
    WHERE exp <= ?
    ORDER BY exp DESC, kid ASC
    LIMIT 1
"#;

const SELECT_FIRST_INSERTED: &str = r#"
    SELECT kid, key, exp
    FROM keys
    ORDER BY kid ASC
    LIMIT 1
"#;

const SELECT_VALID_BY_KID: &str = r#"
    SELECT kid, key, exp
    FROM keys
    WHERE kid = ?
    ORDER BY kid
    LIMIT 1
"#;

const SELECT_EXPIRED_BY_KID: &str = r#"
    SELECT kid, key, exp
    FROM keys
    WHERE kid < ?
    ORDER BY kid
    LIMIT 1
"#;

/// Recreate the `keys` table, discarding any previous contents.
///
/// Dropping the table also resets its AUTOINCREMENT sequence, so the first
/// key inserted afterwards is `kid = 1`.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), JwksError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JwksError::StoreWrite(format!("Failed to start transaction: {}", e)))?;

    sqlx::query("DROP TABLE IF EXISTS keys")
        .execute(&mut *tx)
        .await
        .map_err(|e| JwksError::StoreWrite(format!("Failed to drop keys table: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS keys (
            kid INTEGER PRIMARY KEY AUTOINCREMENT,
            key BLOB NOT NULL,
            exp INTEGER NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await
    .map_err(|e| JwksError::StoreWrite(format!("Failed to create keys table: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| JwksError::StoreWrite(format!("Failed to commit schema: {}", e)))?;

    Ok(())
}

/// Insert a new signing key, returning its assigned `kid`
pub async fn insert_key(pool: &SqlitePool, key_der: &[u8], exp: i64) -> Result<i64, JwksError> {
    let result = sqlx::query("INSERT INTO keys (key, exp) VALUES (?, ?)")
        .bind(key_der)
        .bind(exp)
        .execute(pool)
        .await
        .map_err(|e| JwksError::StoreWrite(format!("Failed to insert signing key: {}", e)))?;

    Ok(result.last_insert_rowid())
}

/// Select exactly one signing key, either valid or expired.
///
/// With [`KeySelectionPolicy::Expiry`] the valid key is the soonest-expiring
/// key with `exp > now` and the expired key is the most recently expired key
/// with `exp <= now`. Keys are never rotated while the process runs, so once
/// every key has passed its `exp` the valid selection falls back to the first
/// inserted key. From then on both selections resolve to that key and issued
/// tokens carry an `exp` in the past until the service is restarted.
///
/// With [`KeySelectionPolicy::KeyId`] selection follows the insertion order of
/// the two startup keys: the valid key is `kid = 1`, the expired key is the
/// first key with `kid < 2`. That predicate also resolves to `kid = 1`; it is
/// kept as is for parity with clients written against that behavior.
pub async fn select_key(
    pool: &SqlitePool,
    want_expired: bool,
    policy: KeySelectionPolicy,
    now: i64,
) -> Result<KeyRecord, JwksError> {
    let (sql, bound) = match (policy, want_expired) {
        (KeySelectionPolicy::Expiry, false) => (SELECT_VALID_BY_EXPIRY, now),
        (KeySelectionPolicy::Expiry, true) => (SELECT_EXPIRED_BY_EXPIRY, now),
        (KeySelectionPolicy::KeyId, false) => (SELECT_VALID_BY_KID, 1),
        (KeySelectionPolicy::KeyId, true) => (SELECT_EXPIRED_BY_KID, 2),
    };

    let mut record = fetch_one_key(pool, sql, Some(bound)).await?;

    if record.is_none() && policy == KeySelectionPolicy::Expiry && !want_expired {
        record = fetch_one_key(pool, SELECT_FIRST_INSERTED, None).await?;
        if let Some(fallback) = &record {
            tracing::warn!(
                kid = fallback.kid,
                exp = fallback.exp,
                "No unexpired signing key left, using the first inserted key"
            );
        }
    }

    record.ok_or(JwksError::KeyNotFound(if want_expired {
        "expired"
    } else {
        "valid"
    }))
}

async fn fetch_one_key(
    pool: &SqlitePool,
    sql: &str,
    bound: Option<i64>,
) -> Result<Option<KeyRecord>, JwksError> {
    let mut query = sqlx::query_as::<_, KeyRecord>(sql);
    if let Some(value) = bound {
        query = query.bind(value);
    }

    query
        .fetch_optional(pool)
        .await
        .map_err(|e| JwksError::StoreRead(format!("Failed to fetch signing key: {}", e)))
}
