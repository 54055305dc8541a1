use super::progress::ProgressCounter;
use super::store::{SourceDb, TargetDb};
use crate::error::{Result, SyncError};
use crate::ReadOptions;
use bson::Document;
use tokio_util::sync::CancellationToken;

/// Documents which are written into target collection in one bulk insert.
pub type Batch = Vec<Document>;

/// One collection to copy, from `source` database to `target` database.
pub struct CollectionTask<'a, S: SourceDb, T: TargetDb> {
    /// collection name, it's the same in both databases.
    pub name: String,
    /// database to read from.
    pub source: &'a S,
    /// database to write into.
    pub target: &'a T,
}

/// Split a document cursor into batches of `batch_size` documents.
///
/// Every batch is full except the last one, and no empty batch is yielded.  At most
/// `batch_size` documents are buffered at any time.
///
/// When the cursor returns an error, the error is yielded and the iteration ends, documents
/// buffered for the unfinished batch are dropped.
pub struct Batches<I> {
    cursor: I,
    batch_size: usize,
    done: bool,
}

impl<I> Batches<I>
where
    I: Iterator<Item = Result<Document>>,
{
    /// create batches over `cursor`.
    ///
    /// ## Panic
    /// Panics if `batch_size` is 0.
    pub fn new(cursor: I, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be greater than 0");
        Batches {
            cursor,
            batch_size,
            done: false,
        }
    }
}

impl<I> Iterator for Batches<I>
where
    I: Iterator<Item = Result<Document>>,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buffer = Vec::with_capacity(self.batch_size);
        while buffer.len() < self.batch_size {
            match self.cursor.next() {
                Some(Ok(doc)) => buffer.push(doc),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if buffer.is_empty() {
            None
        } else {
            Some(Ok(buffer))
        }
    }
}

/// Insert `batch` into collection `coll` of `target` in one request.
///
/// Empty batch is skipped without touching `target`.
pub fn write_batch<T: TargetDb>(target: &T, coll: &str, batch: Batch) -> Result<u64> {
    if batch.is_empty() {
        return Ok(0);
    }
    target.insert_many(coll, batch)
}

/// Copy all documents of one collection serially, batch by batch.
///
/// `cancel` is checked before each batch is written.  `progress` is updated after each
/// batch, then `on_flush` is called with it.
pub fn sync_one_serial<S, T, F>(
    task: CollectionTask<'_, S, T>,
    batch_size: usize,
    options: &ReadOptions,
    cancel: &CancellationToken,
    progress: &mut ProgressCounter,
    mut on_flush: F,
) -> Result<()>
where
    S: SourceDb,
    T: TargetDb,
    F: FnMut(&ProgressCounter),
{
    let coll = task.name.as_str();
    let cursor = task
        .source
        .find_all(coll, options)
        .map_err(|e| SyncError::read(coll, e))?;

    for batch in Batches::new(cursor, batch_size) {
        let batch = batch.map_err(|e| SyncError::read(coll, e))?;
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled {
                coll: coll.to_string(),
            });
        }
        let count = write_batch(task.target, coll, batch)
            .map_err(|e| SyncError::write(coll, progress.written(), e))?;
        progress.consume(count);
        on_flush(&*progress);
    }
    Ok(())
}
