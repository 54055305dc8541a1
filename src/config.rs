//! mongo_clone basic configuration, express in toml.
//!
//! Basic configuration file example:
//! ```toml
//! [src]
//! url = "mongodb://localhost:27017"
//!
//! # extra connection options, override the ones in url.
//! [src.options]
//! app_name = "mongo_clone"
//! connect_timeout_ms = 10000
//!
//! [dst]
//! url = "mongodb://localhost:27018"
//!
//! [sync]
//! db = "app"
//! # optional, default to `db`.
//! dst_db = "app_copy"
//! # optional, default to all collections.
//! colls = ["users", "orders"]
//! batch_size = 1000
//! ```
use crate::error::{Result, SyncError};
use crate::DEFAULT_BATCH_SIZE;
use serde::Deserialize;
use mongodb::options::ClientOptions;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Global mongo clone configuration, loaded from toml file.
#[derive(Deserialize, Debug)]
pub struct SyncerConfig {
    src: ServerConf,
    dst: ServerConf,
    sync: DetailSyncConf,
}

impl SyncerConfig {
    /// read and parse configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<SyncerConfig> {
        let content = fs::read_to_string(path)?;
        SyncerConfig::from_toml(&content)
    }

    /// parse configuration from toml `content`.
    pub fn from_toml(content: &str) -> Result<SyncerConfig> {
        Ok(toml::from_str(content)?)
    }

    /// convert into a sync job.
    pub fn into_job(self) -> SyncJob {
        SyncJob {
            src: self.src,
            dst: self.dst,
            db: self.sync.db,
            dst_db: self.sync.dst_db,
            colls: self.sync.colls,
            batch_size: self.sync.batch_size,
            cursor_batch_size: self.sync.cursor_batch_size,
            no_cursor_timeout: self.sync.no_cursor_timeout,
        }
    }
}

/// Detail sync config, it indicates which database to sync, or which collection to sync.
#[derive(Deserialize, Debug)]
struct DetailSyncConf {
    db: String,
    #[serde(default)]
    dst_db: Option<String>,
    /// collections to sync, default it None, which means sync all collections.
    #[serde(default)]
    colls: Option<Vec<String>>,
    #[serde(default = "default_batch_size")]
    batch_size: usize,
    #[serde(default)]
    cursor_batch_size: Option<u32>,
    #[serde(default)]
    no_cursor_timeout: bool,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Connection configuration of one mongodb server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConf {
    /// mongodb url, begins with 'mongodb://' or 'mongodb+srv://'
    url: String,
    /// extra connection options, they override the same options given in `url`.
    #[serde(default)]
    options: ConnectOptions,
}

/// Connection options which can be given besides the connection string.
///
/// They are set on parsed client options directly, so values are never
/// interpreted as part of the connection string.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConnectOptions {
    /// application name recorded in server logs.
    pub app_name: Option<String>,
    /// timeout of establishing one connection, in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// how long to wait for a suitable server, in milliseconds.
    pub server_selection_timeout_ms: Option<u64>,
    /// maximum connections of the pool.
    pub max_pool_size: Option<u32>,
    /// connect to the given host only, rather than discovering the whole deployment.
    pub direct_connection: Option<bool>,
}

impl ConnectOptions {
    /// set configured options into `options`, leaving others untouched.
    pub fn apply(&self, options: &mut ClientOptions) {
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(ms) = self.connect_timeout_ms {
            options.connect_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = self.server_selection_timeout_ms {
            options.server_selection_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(size) = self.max_pool_size {
            options.max_pool_size = Some(size);
        }
        if let Some(direct) = self.direct_connection {
            options.direct_connection = Some(direct);
        }
    }
}

impl ServerConf {
    /// create a server configuration from connection string.
    pub fn new(url: impl Into<String>) -> Self {
        ServerConf {
            url: url.into(),
            options: ConnectOptions::default(),
        }
    }

    /// set extra connection options.
    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// parse `url` and apply extra connection options.
    ///
    /// `mongodb+srv://` urls are resolved through DNS here.
    pub fn client_options(&self) -> Result<ClientOptions> {
        let mut options = ClientOptions::parse(&self.url)?;
        self.options.apply(&mut options);
        Ok(options)
    }
}

/// One copy job: which database (and collections) to copy from source server to target server.
#[derive(Debug, Clone)]
pub struct SyncJob {
    src: ServerConf,
    dst: ServerConf,
    db: String,
    dst_db: Option<String>,
    colls: Option<Vec<String>>,
    batch_size: usize,
    cursor_batch_size: Option<u32>,
    no_cursor_timeout: bool,
}

impl SyncJob {
    /// create a job which copies every collection of `db`, with default batch size.
    pub fn new(src: ServerConf, dst: ServerConf, db: impl Into<String>) -> Self {
        SyncJob {
            src,
            dst,
            db: db.into(),
            dst_db: None,
            colls: None,
            batch_size: DEFAULT_BATCH_SIZE,
            cursor_batch_size: None,
            no_cursor_timeout: false,
        }
    }

    /// write into database `dst_db` rather than database with the same name.
    pub fn with_dst_db(mut self, dst_db: impl Into<String>) -> Self {
        self.dst_db = Some(dst_db.into());
        self
    }

    /// only copy the given collections.
    pub fn with_colls(mut self, colls: Vec<String>) -> Self {
        self.colls = Some(colls);
        self
    }

    /// set maximum documents of one bulk insert.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// set how many documents the source cursor fetches per round trip.
    pub fn with_cursor_batch_size(mut self, cursor_batch_size: u32) -> Self {
        self.cursor_batch_size = Some(cursor_batch_size);
        self
    }

    /// keep source cursors alive on server even when idle.
    pub fn with_no_cursor_timeout(mut self, no_cursor_timeout: bool) -> Self {
        self.no_cursor_timeout = no_cursor_timeout;
        self
    }

    /// get source server configuration.
    pub fn get_src(&self) -> &ServerConf {
        &self.src
    }

    /// get destination server configuration.
    pub fn get_dst(&self) -> &ServerConf {
        &self.dst
    }

    /// get source database name.
    pub fn get_db(&self) -> &str {
        &self.db
    }

    /// get destination database name, default to source database name.
    pub fn get_dst_db(&self) -> &str {
        self.dst_db.as_deref().unwrap_or(&self.db)
    }

    /// get collections to sync, None means all collections.
    pub fn get_colls(&self) -> Option<&[String]> {
        self.colls.as_deref()
    }

    /// get maximum documents of one bulk insert.
    pub fn get_batch_size(&self) -> usize {
        self.batch_size
    }

    /// get source cursor options.
    pub fn get_read_options(&self) -> ReadOptions {
        ReadOptions {
            cursor_batch_size: self.cursor_batch_size,
            no_cursor_timeout: self.no_cursor_timeout,
        }
    }

    /// check that the job can run.
    pub fn validate(&self) -> Result<()> {
        if self.db.is_empty() {
            return Err(SyncError::InvalidConfig(
                "source database name is empty".to_string(),
            ));
        }
        if self.get_dst_db().is_empty() {
            return Err(SyncError::InvalidConfig(
                "destination database name is empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch size must be greater than 0".to_string(),
            ));
        }
        if self.cursor_batch_size == Some(0) {
            return Err(SyncError::InvalidConfig(
                "cursor batch size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options used when reading documents from source collection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadOptions {
    /// documents fetched per cursor round trip, None lets server decide.
    pub cursor_batch_size: Option<u32>,
    /// prevent server from closing idle cursors.
    pub no_cursor_timeout: bool,
}
