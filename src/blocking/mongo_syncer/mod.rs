#[doc(hidden)]
pub mod full;
#[doc(hidden)]
pub mod mongo_helper;
mod progress;
mod store;
mod syncer;

pub use progress::{LogReporter, ProgressCounter, ProgressReporter, SyncEvent};
pub use store::{MongoCursor, MongoDatabase, SourceDb, TargetDb};
pub use syncer::MongoSyncer;
