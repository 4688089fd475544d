use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("{0}")]
    Query(#[from] sqlx::Error),

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("Inserted id {0} does not fit the items.id column")]
    IdOutOfRange(u64),
}

/// Fatal failures of the startup sequence, one variant per step.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to connect to the database server: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to create database '{name}': {source}")]
    CreateDatabase {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to select database '{name}': {source}")]
    UseDatabase {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to create table 'items': {0}")]
    CreateTable(#[source] sqlx::Error),

    #[error("Failed to build the connection pool for database '{name}': {source}")]
    ConnectDatabase {
        name: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Driver-level fields worth logging when a statement fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverDiagnostics {
    /// SQLSTATE code, e.g. `42000`.
    pub code: Option<String>,
    /// MySQL error number, e.g. `1044` for access denied.
    pub errno: Option<u16>,
    /// The message as reported by the server.
    pub sql_message: Option<String>,
}

impl DriverDiagnostics {
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let errno = db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|e| e.number());
                Self {
                    code: db_err.code().map(|c| c.into_owned()),
                    errno,
                    sql_message: Some(db_err.message().to_string()),
                }
            }
            _ => Self::default(),
        }
    }
}

impl DbError {
    pub fn diagnostics(&self) -> DriverDiagnostics {
        match self {
            DbError::Query(e) => DriverDiagnostics::from_sqlx(e),
            DbError::NotFound | DbError::IdOutOfRange(_) => DriverDiagnostics::default(),
        }
    }
}

impl ProvisionError {
    pub fn diagnostics(&self) -> DriverDiagnostics {
        let source = match self {
            ProvisionError::Connect(e) | ProvisionError::CreateTable(e) => e,
            ProvisionError::CreateDatabase { source, .. }
            | ProvisionError::UseDatabase { source, .. }
            | ProvisionError::ConnectDatabase { source, .. } => source,
        };
        DriverDiagnostics::from_sqlx(source)
    }
}
