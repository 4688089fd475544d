use crate::error::ProvisionError;
use configuration::DatabaseSettings;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

/// DDL for the `items` table.
///
/// Timestamps carry microseconds so that an update issued right after the
/// insert still moves `updated_at` forward.
pub const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        updated_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6) ON UPDATE CURRENT_TIMESTAMP(6)
    )
"#;

/// Quotes a MySQL identifier with backticks, doubling any embedded backtick.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn server_options(settings: &DatabaseSettings) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
}

/// Ensures the configured database and the `items` table exist, then returns
/// a connection pool bound to that database.
///
/// Every step is idempotent, so running this against an already provisioned
/// server leaves existing rows untouched. Any failure is returned to the caller,
/// which decides whether the process can continue.
pub async fn provision(settings: &DatabaseSettings) -> Result<MySqlPool, ProvisionError> {
    let quoted = quote_identifier(&settings.name);

    // No database selected yet: this pool only exists to run the DDL below.
    let server_pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(settings.acquire_timeout())
        .connect_with(server_options(settings))
        .await
        .map_err(ProvisionError::Connect)?;

    let result = async {
        // Dropping the PoolConnection hands it back to the pool, on every path.
        let mut conn = server_pool.acquire().await.map_err(ProvisionError::Connect)?;
        tracing::info!(host = %settings.host, port = settings.port, "Connected to MySQL server.");

        sqlx::raw_sql(&format!("CREATE DATABASE IF NOT EXISTS {quoted}"))
            .execute(&mut *conn)
            .await
            .map_err(|source| ProvisionError::CreateDatabase {
                name: settings.name.clone(),
                source,
            })?;
        tracing::info!(database = %settings.name, "Database created or already exists.");

        sqlx::raw_sql(&format!("USE {quoted}"))
            .execute(&mut *conn)
            .await
            .map_err(|source| ProvisionError::UseDatabase {
                name: settings.name.clone(),
                source,
            })?;

        sqlx::raw_sql(CREATE_ITEMS_TABLE)
            .execute(&mut *conn)
            .await
            .map_err(ProvisionError::CreateTable)?;
        tracing::info!(database = %settings.name, "Table 'items' created or already exists.");

        Ok::<(), ProvisionError>(())
    }
    .await;

    server_pool.close().await;
    result?;

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect_with(server_options(settings).database(&settings.name))
        .await
        .map_err(|source| ProvisionError::ConnectDatabase {
            name: settings.name.clone(),
            source,
        })?;

    tracing::info!(
        database = %settings.name,
        max_connections = settings.max_connections,
        "Database pool created."
    );
    Ok(pool)
}
