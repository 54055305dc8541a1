//! Database capabilities used by the syncer, and their mongodb implementation.

use crate::error::{Result, SyncError};
use crate::ReadOptions;
use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::sync::{Client, Cursor, Database};

/// Database which documents are read from.
pub trait SourceDb {
    /// forward-only document cursor over one collection.
    type Cursor: Iterator<Item = Result<Document>>;

    /// database name.
    fn name(&self) -> &str;

    /// list all collection names, in server order.
    fn list_collection_names(&self) -> Result<Vec<String>>;

    /// count documents in collection `coll`.
    fn count_documents(&self, coll: &str) -> Result<u64>;

    /// open a cursor over every document of collection `coll`.
    fn find_all(&self, coll: &str, options: &ReadOptions) -> Result<Self::Cursor>;

    /// release the database, default to drop it.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Database which documents are written into.
pub trait TargetDb {
    /// check if collection named `coll` exists.
    fn collection_exists(&self, coll: &str) -> Result<bool>;

    /// create collection named `coll`.
    fn create_collection(&self, coll: &str) -> Result<()>;

    /// insert all `docs` into collection `coll` in one request, returns inserted count.
    fn insert_many(&self, coll: &str, docs: Vec<Document>) -> Result<u64>;

    /// release the database, default to drop it.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// A mongodb database, together with the client which owns it.
///
/// Closing it shuts the client down, so every database is connected by its own client.
#[derive(Clone, Debug)]
pub struct MongoDatabase {
    client: Client,
    db: Database,
}

impl MongoDatabase {
    /// create from `client` and one of its database.
    pub fn new(client: Client, db: Database) -> Self {
        MongoDatabase { client, db }
    }
}

/// Source collection cursor, wraps mongodb error into [SyncError].
pub struct MongoCursor {
    inner: Cursor<Document>,
}

impl Iterator for MongoCursor {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|doc| doc.map_err(SyncError::from))
    }
}

impl SourceDb for MongoDatabase {
    type Cursor = MongoCursor;

    fn name(&self) -> &str {
        self.db.name()
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.db.list_collection_names(None)?)
    }

    fn count_documents(&self, coll: &str) -> Result<u64> {
        Ok(self
            .db
            .collection::<Document>(coll)
            .count_documents(None, None)?)
    }

    fn find_all(&self, coll: &str, options: &ReadOptions) -> Result<MongoCursor> {
        let mut find_options = FindOptions::default();
        find_options.batch_size = options.cursor_batch_size;
        if options.no_cursor_timeout {
            find_options.no_cursor_timeout = Some(true);
        }
        let inner = self
            .db
            .collection::<Document>(coll)
            .find(None, find_options)?;
        Ok(MongoCursor { inner })
    }

    fn close(self) {
        self.client.shutdown();
    }
}

impl TargetDb for MongoDatabase {
    fn collection_exists(&self, coll: &str) -> Result<bool> {
        let names = self.db.list_collection_names(doc! {"name": coll})?;
        Ok(names.iter().any(|name| name == coll))
    }

    fn create_collection(&self, coll: &str) -> Result<()> {
        Ok(self.db.create_collection(coll, None)?)
    }

    fn insert_many(&self, coll: &str, docs: Vec<Document>) -> Result<u64> {
        let result = self.db.collection::<Document>(coll).insert_many(docs, None)?;
        Ok(result.inserted_ids.len() as u64)
    }

    fn close(self) {
        self.client.shutdown();
    }
}
