/// provide mongo clone blocking apis.
mod connection;
#[doc(hidden)]
pub mod mongo_syncer;

pub use connection::{Connection, Connector, MongoConnector};
pub use mongo_syncer::{
    LogReporter, MongoDatabase, MongoSyncer, ProgressReporter, SourceDb, SyncEvent, TargetDb,
};
