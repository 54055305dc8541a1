use std::fmt;
use tracing::info;

/// Remaining documents estimate of one collection.
///
/// It's computed from document count before copying, so it's only informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    remaining: u64,
    written: u64,
}

impl ProgressCounter {
    /// create a counter from initial document count.
    pub fn new(total: u64) -> Self {
        ProgressCounter {
            remaining: total,
            written: 0,
        }
    }

    /// record `count` documents written.
    pub fn consume(&mut self, count: u64) {
        self.remaining = self.remaining.saturating_sub(count);
        self.written += count;
    }

    /// documents not written yet.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// documents written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

/// Progress notices emitted while syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// both source and target are connected.
    Connected,
    /// no collection matches, nothing is copied.
    NothingToSync,
    /// begin to copy a collection.
    CollectionStarted {
        /// collection name.
        coll: String,
    },
    /// target collection doesn't exist and is created.
    CollectionCreated {
        /// collection name.
        coll: String,
    },
    /// documents count is known, or one batch is written.
    Remaining {
        /// collection name.
        coll: String,
        /// documents not written yet, estimated.
        remaining: u64,
    },
    /// all documents of a collection are copied.
    CollectionSynced {
        /// collection name.
        coll: String,
        /// documents written into target collection.
        written: u64,
    },
    /// all collections are copied.
    AllSynced {
        /// number of copied collections.
        collections: usize,
        /// number of copied documents.
        documents: u64,
    },
    /// source and target connections are released.
    ConnectionsClosed,
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::Connected => write!(f, "Connected to both mongodb servers"),
            SyncEvent::NothingToSync => write!(f, "No collections to sync"),
            SyncEvent::CollectionStarted { coll } => write!(f, "Syncing collection: [{}]", coll),
            SyncEvent::CollectionCreated { coll } => write!(f, "Created collection: [{}]", coll),
            SyncEvent::Remaining { coll, remaining } => {
                write!(f, "[{}] remaining : {}", coll, remaining)
            }
            SyncEvent::CollectionSynced { coll, written } => {
                write!(f, "Synced collection: [{}], {} documents", coll, written)
            }
            SyncEvent::AllSynced {
                collections,
                documents,
            } => write!(
                f,
                "All collections synced successfully, {} collections, {} documents",
                collections, documents
            ),
            SyncEvent::ConnectionsClosed => write!(f, "Connections closed"),
        }
    }
}

/// Receives [SyncEvent]s from syncer.
pub trait ProgressReporter {
    /// handle one event.
    fn report(&self, event: &SyncEvent);
}

impl<F: Fn(&SyncEvent)> ProgressReporter for F {
    fn report(&self, event: &SyncEvent) {
        self(event)
    }
}

/// Write events to `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, event: &SyncEvent) {
        match event {
            SyncEvent::CollectionStarted { coll } | SyncEvent::CollectionCreated { coll } => {
                info!(%coll, "{}", event)
            }
            SyncEvent::Remaining { coll, remaining } => info!(%coll, remaining, "{}", event),
            SyncEvent::CollectionSynced { coll, written } => info!(%coll, written, "{}", event),
            _ => info!("{}", event),
        }
    }
}
