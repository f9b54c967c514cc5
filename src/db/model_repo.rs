use sqlx::PgPool;

use crate::models::ModelVersion;

/// Get the currently active version for a model, if any.
pub async fn get_active_version(
    pool: &PgPool,
    model_name: &str,
) -> Result<Option<ModelVersion>, sqlx::Error> {
    sqlx::query_as::<_, ModelVersion>(
        "SELECT * FROM model_versions WHERE model_name = $1 AND is_active LIMIT 1",
    )
    .bind(model_name)
    .fetch_optional(pool)
    .await
}

/// Promote a freshly trained version to active, demoting the previous one.
///
/// Deactivate-then-insert runs in a single transaction so readers never see
/// zero or two active rows. The partial unique index on
/// `(model_name) WHERE is_active` backstops this at the schema level.
pub async fn promote_version(
    pool: &PgPool,
    model_name: &str,
    version: &str,
    accuracy: f64,
    artifact_path: &str,
) -> Result<ModelVersion, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE model_versions SET is_active = FALSE WHERE model_name = $1 AND is_active")
        .bind(model_name)
        .execute(&mut *tx)
        .await?;

    let promoted = sqlx::query_as::<_, ModelVersion>(
        r#"
        INSERT INTO model_versions (model_name, version, is_active, accuracy, artifact_path)
        VALUES ($1, $2, TRUE, $3, $4)
        RETURNING *
        "#,
    )
    .bind(model_name)
    .bind(version)
    .bind(accuracy)
    .bind(artifact_path)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(promoted)
}

/// List every recorded version for a model, newest first.
pub async fn list_versions(
    pool: &PgPool,
    model_name: &str,
) -> Result<Vec<ModelVersion>, sqlx::Error> {
    sqlx::query_as::<_, ModelVersion>(
        "SELECT * FROM model_versions WHERE model_name = $1 ORDER BY created_at DESC",
    )
    .bind(model_name)
    .fetch_all(pool)
    .await
}
