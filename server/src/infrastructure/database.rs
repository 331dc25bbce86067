use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// PostgreSQL 接続プールを作成し、マイグレーションを適用する。
pub async fn create_pool(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
