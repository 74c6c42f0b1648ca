//! Integration tests for the infrastructure components
//!
//! These need PostgreSQL (`DATABASE_URL`) and Redis (`REDIS_URL`) to be
//! running, so they are ignored by default:
//! `cargo test -p common -- --ignored`.

use common::{
    cache::{RedisConfig, RedisPool, session_key},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis instances"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Applying twice is a no-op
    run_migrations(&pool).await?;

    let tables: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::TEXT
        FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_name IN ('users', 'events', 'participation')
        ORDER BY table_name
        "#,
    )
    .fetch_all(&pool)
    .await?;
    assert_eq!(tables, vec!["events", "participation", "users"]);

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    assert!(redis_pool.health_check().await?, "Redis health check failed");

    let key = session_key(-1);
    redis_pool.set(&key, "integration", Some(10)).await?;
    assert_eq!(redis_pool.get(&key).await?, Some("integration".to_string()));
    redis_pool.delete(&key).await?;
    assert_eq!(redis_pool.get(&key).await?, None);

    Ok(())
}
