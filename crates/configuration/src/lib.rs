use crate::error::ConfigError;
use config::{Environment, Map};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseSettings, ServerSettings, Settings};

/// Loads the application configuration from the process environment.
///
/// A `.env` file in the working directory is read first if one exists. Database
/// settings come from `DB_*` variables, server settings from `SERVER_*` variables.
/// A bare `PORT` overrides `SERVER_PORT`.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_settings_from(None)
}

/// Same as [`load_settings`], but reads variables from `vars` instead of the
/// process environment when given. Useful for tests.
pub fn load_settings_from(vars: Option<Map<String, String>>) -> Result<Settings, ConfigError> {
    let port = match &vars {
        Some(map) => map.get("PORT").cloned(),
        None => std::env::var("PORT").ok(),
    };

    let server = config::Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", 3000)?
        .set_default("public_dir", "public")?
        .add_source(Environment::with_prefix("SERVER").source(vars.clone()))
        .set_override_option("port", port)?
        .build()?
        .try_deserialize::<ServerSettings>()?;

    let database = config::Config::builder()
        .set_default("host", "localhost")?
        .set_default("port", 3306)?
        .set_default("user", "")?
        .set_default("password", "")?
        .set_default("name", "")?
        .set_default("max_connections", 10)?
        .set_default("acquire_timeout_secs", 30)?
        .add_source(Environment::with_prefix("DB").source(vars))
        .build()?
        .try_deserialize::<DatabaseSettings>()?;

    let settings = Settings { server, database };
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn applies_defaults() {
        let settings =
            load_settings_from(Some(vars(&[("DB_USER", "root"), ("DB_NAME", "crud_app")]))).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.public_dir.to_str(), Some("public"));
        assert_eq!(settings.database.host, "localhost");
        assert_eq!(settings.database.port, 3306);
        assert_eq!(settings.database.password, "");
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.database.acquire_timeout().as_secs(), 30);
    }

    #[test]
    fn reads_overrides() {
        let settings = load_settings_from(Some(vars(&[
            ("PORT", "8080"),
            ("SERVER_HOST", "127.0.0.1"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "12345"),
            ("DB_NAME", "inventory"),
            ("DB_MAX_CONNECTIONS", "4"),
        ])))
        .unwrap();

        assert_eq!(settings.server.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 3307);
        assert_eq!(settings.database.password, "12345");
        assert_eq!(settings.database.name, "inventory");
        assert_eq!(settings.database.max_connections, 4);
    }

    #[test]
    fn ignores_unprefixed_host() {
        let settings = load_settings_from(Some(vars(&[
            ("HOST", "localhost"),
            ("DB_USER", "root"),
            ("DB_NAME", "crud_app"),
        ])))
        .unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn resolves_host_names() {
        let settings = load_settings_from(Some(vars(&[
            ("SERVER_HOST", "localhost"),
            ("SERVER_PORT", "4000"),
            ("DB_USER", "root"),
            ("DB_NAME", "crud_app"),
        ])))
        .unwrap();
        let addr = settings.server.socket_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn bare_port_wins_over_server_port() {
        let settings = load_settings_from(Some(vars(&[
            ("PORT", "5000"),
            ("SERVER_PORT", "4000"),
            ("DB_USER", "root"),
            ("DB_NAME", "crud_app"),
        ])))
        .unwrap();
        assert_eq!(settings.server.port, 5000);
    }

    #[test]
    fn rejects_missing_database_name() {
        let err = load_settings_from(Some(vars(&[("DB_USER", "root")]))).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_backtick_in_database_name() {
        let err = load_settings_from(Some(vars(&[("DB_USER", "root"), ("DB_NAME", "bad`name")])))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_zero_pool_size() {
        let err = load_settings_from(Some(vars(&[
            ("DB_USER", "root"),
            ("DB_NAME", "crud_app"),
            ("DB_MAX_CONNECTIONS", "0"),
        ])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
