//! Mongo clone lib, which provides an easily usage api to copy collections from one mongodb to another mongodb.
//!
//! Documents are streamed from source collection with a cursor, and written into target collection
//! by bulk inserts of at most `batch_size` documents, so memory usage doesn't grow with collection size.
//!
//! # MongoSyncer example:
//! ```no_run
//! use mongo_clone::{MongoSyncer, ServerConf, SyncJob};
//!
//! let job = SyncJob::new(
//!     ServerConf::new("mongodb://localhost:27017"),
//!     ServerConf::new("mongodb://localhost:27018"),
//!     "app",
//! )
//! .with_colls(vec!["users".to_string()]);
//! MongoSyncer::new(job).sync().unwrap();
//! ```
//!
//! # Load job from configuration file:
//! ```no_run
//! use mongo_clone::{MongoSyncer, SyncerConfig};
//!
//! let job = SyncerConfig::from_path("config.toml").unwrap().into_job();
//! MongoSyncer::new(job).sync().unwrap();
//! ```

#![warn(missing_docs)]

#[doc(hidden)]
pub mod blocking;
mod config;
mod error;

/// default maximum documents of one bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

pub use blocking::{
    Connection, Connector, LogReporter, MongoConnector, MongoDatabase, MongoSyncer,
    ProgressReporter, SourceDb, SyncEvent, TargetDb,
};
pub use config::{ConnectOptions, ReadOptions, ServerConf, SyncJob, SyncerConfig};
pub use error::{Result, SyncError};
