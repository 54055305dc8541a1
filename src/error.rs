use mongodb::error::Error as MongoError;
use std::result::Result as StdResult;
use thiserror::Error;

/// Errors raised while copying collections.
///
/// Stage errors wrap the underlying store error as their `source`.
#[derive(Error, Debug)]
pub enum SyncError {
    /// raw error from mongodb driver.
    #[error("Mongodb error: {0}")]
    MongoError(#[from] MongoError),
    /// source or target server can't be reached, or denies listing collections.
    #[error("Connect to {uri:?} failed")]
    ConnectionError {
        /// connection string with password hidden.
        uri: String,
        /// underlying error.
        #[source]
        source: Box<SyncError>,
    },
    /// collections of source database can't be listed.
    #[error("List collections of database {db:?} failed")]
    EnumerateError {
        /// source database name.
        db: String,
        /// underlying error.
        #[source]
        source: Box<SyncError>,
    },
    /// target collection can't be created.
    #[error("Create target collection {coll:?} failed")]
    ProvisionError {
        /// collection name.
        coll: String,
        /// underlying error.
        #[source]
        source: Box<SyncError>,
    },
    /// counting or reading documents from source collection failed.
    #[error("Read source collection {coll:?} failed")]
    ReadError {
        /// collection name.
        coll: String,
        /// underlying error.
        #[source]
        source: Box<SyncError>,
    },
    /// bulk insert into target collection failed.
    #[error("Write batch into collection {coll:?} failed, {written} documents were written before")]
    WriteError {
        /// collection name.
        coll: String,
        /// documents written into the collection before the failed batch.
        written: u64,
        /// underlying error.
        #[source]
        source: Box<SyncError>,
    },
    /// cancellation token was triggered.
    #[error("Sync cancelled before collection {coll:?} completes")]
    Cancelled {
        /// collection which was being copied.
        coll: String,
    },
    /// sync job can't run, like batch size is 0.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),
    /// configuration file is not valid toml, or misses required fields.
    #[error("Parse configuration file failed: {0}")]
    ConfigError(#[from] toml::de::Error),
    /// configuration file can't be read.
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn connection(uri: &str, e: SyncError) -> Self {
        SyncError::ConnectionError {
            uri: uri.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn enumerate(db: &str, e: SyncError) -> Self {
        SyncError::EnumerateError {
            db: db.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn provision(coll: &str, e: SyncError) -> Self {
        SyncError::ProvisionError {
            coll: coll.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn read(coll: &str, e: SyncError) -> Self {
        SyncError::ReadError {
            coll: coll.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn write(coll: &str, written: u64, e: SyncError) -> Self {
        SyncError::WriteError {
            coll: coll.to_string(),
            written,
            source: Box::new(e),
        }
    }
}

/// Result type used across the crate.
pub type Result<T> = StdResult<T, SyncError>;
