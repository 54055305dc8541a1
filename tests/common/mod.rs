// In-memory databases, used to test syncer without mongodb servers.
#![allow(dead_code)]

use bson::{doc, Bson, Document};
use mongo_clone::{
    Connection, Connector, ReadOptions, Result, ServerConf, SourceDb, SyncError, SyncJob, TargetDb,
};
use std::io;
use std::sync::{Arc, Mutex};

pub const SOURCE_URI: &str = "mongodb://source:27017";
pub const TARGET_URI: &str = "mongodb://target:27017";

#[derive(Default)]
struct DbState {
    colls: Vec<(String, Vec<Document>)>,
    create_calls: Vec<String>,
    insert_calls: Vec<(String, usize)>,
    close_calls: usize,
    fail_list: bool,
    fail_create: bool,
    fail_read: Option<(String, usize)>,
}

impl DbState {
    fn coll_mut(&mut self, name: &str) -> Option<&mut Vec<Document>> {
        self.colls
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, docs)| docs)
    }
}

fn store_error(msg: &str) -> SyncError {
    SyncError::Io(io::Error::new(io::ErrorKind::Other, msg.to_string()))
}

#[derive(Clone, Default)]
pub struct MemoryDb {
    state: Arc<Mutex<DbState>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        MemoryDb::default()
    }

    /// add collection `name` with `count` documents like {"_id": i, "name": "doc{i}"}.
    pub fn with_coll(self, name: &str, count: usize) -> Self {
        let docs = (0..count)
            .map(|i| doc! {"_id": i as i64, "name": format!("doc{}", i)})
            .collect();
        self.with_docs(name, docs)
    }

    pub fn with_docs(self, name: &str, docs: Vec<Document>) -> Self {
        self.state
            .lock()
            .unwrap()
            .colls
            .push((name.to_string(), docs));
        self
    }

    pub fn fail_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    pub fn fail_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    /// cursor over `coll` returns an error after `after` documents.
    pub fn fail_read(self, coll: &str, after: usize) -> Self {
        self.state.lock().unwrap().fail_read = Some((coll.to_string(), after));
        self
    }

    pub fn coll_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.colls.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn docs(&self, coll: &str) -> Vec<Document> {
        self.state
            .lock()
            .unwrap()
            .coll_mut(coll)
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().create_calls.clone()
    }

    pub fn insert_calls(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().insert_calls.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

impl SourceDb for MemoryDb {
    type Cursor = std::vec::IntoIter<Result<Document>>;

    fn name(&self) -> &str {
        "memory"
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        if self.state.lock().unwrap().fail_list {
            return Err(store_error("list collections denied"));
        }
        Ok(self.coll_names())
    }

    fn count_documents(&self, coll: &str) -> Result<u64> {
        Ok(self.docs(coll).len() as u64)
    }

    fn find_all(&self, coll: &str, _options: &ReadOptions) -> Result<Self::Cursor> {
        let fail_read = self.state.lock().unwrap().fail_read.clone();
        let mut docs: Vec<Result<Document>> = self.docs(coll).into_iter().map(Ok).collect();
        if let Some((fail_coll, after)) = fail_read {
            if fail_coll == coll {
                docs.truncate(after);
                docs.push(Err(store_error("cursor killed")));
            }
        }
        Ok(docs.into_iter())
    }

    fn close(self) {
        self.state.lock().unwrap().close_calls += 1;
    }
}

impl TargetDb for MemoryDb {
    fn collection_exists(&self, coll: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().coll_mut(coll).is_some())
    }

    fn create_collection(&self, coll: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.create_calls.push(coll.to_string());
        if state.fail_create {
            return Err(store_error("create collection denied"));
        }
        if state.coll_mut(coll).is_some() {
            return Err(store_error("collection already exists"));
        }
        state.colls.push((coll.to_string(), vec![]));
        Ok(())
    }

    // ordered insert with unique `_id`: documents before the duplicate one are kept.
    fn insert_many(&self, coll: &str, docs: Vec<Document>) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.insert_calls.push((coll.to_string(), docs.len()));
        let target = match state.coll_mut(coll) {
            Some(target) => target,
            None => return Err(store_error("collection not found")),
        };
        let mut inserted = 0;
        for doc in docs {
            let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
            if target.iter().any(|d| d.get("_id") == Some(&id)) {
                return Err(store_error("E11000 duplicate key error"));
            }
            target.push(doc);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn close(self) {
        self.state.lock().unwrap().close_calls += 1;
    }
}

pub struct MemoryConnector {
    pub source: MemoryDb,
    pub target: MemoryDb,
    pub refuse_source: bool,
    pub refuse_target: bool,
}

impl MemoryConnector {
    pub fn new(source: MemoryDb, target: MemoryDb) -> Self {
        MemoryConnector {
            source,
            target,
            refuse_source: false,
            refuse_target: false,
        }
    }
}

fn refused(uri: &str) -> SyncError {
    SyncError::ConnectionError {
        uri: uri.to_string(),
        source: Box::new(store_error("connection refused")),
    }
}

impl Connector for MemoryConnector {
    type Source = MemoryDb;
    type Target = MemoryDb;

    // same order as `MongoConnector`: source first, released when target fails.
    fn connect(&self, _job: &SyncJob) -> Result<Connection<MemoryDb, MemoryDb>> {
        if self.refuse_source {
            return Err(refused(SOURCE_URI));
        }
        let source = self.source.clone();
        if self.refuse_target {
            SourceDb::close(source);
            return Err(refused(TARGET_URI));
        }
        Ok(Connection::new(source, self.target.clone()))
    }
}

pub fn job() -> SyncJob {
    SyncJob::new(
        ServerConf::new(SOURCE_URI),
        ServerConf::new(TARGET_URI),
        "app",
    )
}
