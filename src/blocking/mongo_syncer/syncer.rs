use super::full::{self, CollectionTask};
use super::mongo_helper;
use super::progress::{LogReporter, ProgressCounter, ProgressReporter, SyncEvent};
use super::store::SourceDb;
use crate::blocking::connection::{Connector, MongoConnector};
use crate::error::{Result, SyncError};
use crate::SyncJob;
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Copy collections of one database into another database.
///
/// Collections are copied one by one, in source listing order, and documents of one collection
/// are written batch by batch in cursor order.  The first error aborts the whole job, collections
/// already copied (and batches already written) are left in target database.
pub struct MongoSyncer<C: Connector = MongoConnector, R: ProgressReporter = LogReporter> {
    job: SyncJob,
    connector: C,
    reporter: R,
    cancel: CancellationToken,
}

impl MongoSyncer {
    /// create a syncer which copies between mongodb servers, and reports progress to log.
    pub fn new(job: SyncJob) -> MongoSyncer {
        MongoSyncer::with_connector(job, MongoConnector, LogReporter)
    }
}

impl<C: Connector, R: ProgressReporter> MongoSyncer<C, R> {
    /// create a syncer with custom `connector` and `reporter`.
    pub fn with_connector(job: SyncJob, connector: C, reporter: R) -> Self {
        MongoSyncer {
            job,
            connector,
            reporter,
            cancel: CancellationToken::new(),
        }
    }

    /// stop syncing when `cancel` is triggered, it's checked between batches.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the job.
    ///
    /// Both connections are closed before return, whatever the job succeeds or not.
    pub fn sync(self) -> Result<()> {
        let span = info_span!("sync", run_id = %Uuid::new_v4(), db = self.job.get_db());
        let _enter = span.enter();

        self.job.validate()?;
        let start_time = Local::now();
        info!(
            %start_time,
            dst_db = self.job.get_dst_db(),
            "Begin to sync database."
        );
        let conn = self.connector.connect(&self.job)?;
        self.reporter.report(&SyncEvent::Connected);

        let result = self.sync_collections(conn.get_src_db(), conn.get_target_db());
        conn.close();
        self.reporter.report(&SyncEvent::ConnectionsClosed);

        match &result {
            Ok(()) => info!(%start_time, "Sync database complete."),
            Err(e) => error!(%start_time, ?e, "Sync database failed."),
        }
        result
    }

    fn sync_collections(&self, source: &C::Source, target: &C::Target) -> Result<()> {
        let coll_names = mongo_helper::list_collections(source, self.job.get_colls())
            .map_err(|e| SyncError::enumerate(source.name(), e))?;
        if coll_names.is_empty() {
            self.reporter.report(&SyncEvent::NothingToSync);
            return Ok(());
        }

        let mut documents = 0;
        for name in coll_names.iter() {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled { coll: name.clone() });
            }
            documents += self.sync_collection(CollectionTask {
                name: name.clone(),
                source,
                target,
            })?;
        }

        self.reporter.report(&SyncEvent::AllSynced {
            collections: coll_names.len(),
            documents,
        });
        Ok(())
    }

    fn sync_collection(&self, task: CollectionTask<'_, C::Source, C::Target>) -> Result<u64> {
        let coll = task.name.clone();
        self.reporter
            .report(&SyncEvent::CollectionStarted { coll: coll.clone() });
        if mongo_helper::ensure_collection(task.target, &coll)
            .map_err(|e| SyncError::provision(&coll, e))?
        {
            self.reporter
                .report(&SyncEvent::CollectionCreated { coll: coll.clone() });
        }

        let total = task
            .source
            .count_documents(&coll)
            .map_err(|e| SyncError::read(&coll, e))?;
        self.reporter.report(&SyncEvent::Remaining {
            coll: coll.clone(),
            remaining: total,
        });

        let mut progress = ProgressCounter::new(total);
        full::sync_one_serial(
            task,
            self.job.get_batch_size(),
            &self.job.get_read_options(),
            &self.cancel,
            &mut progress,
            |progress| {
                self.reporter.report(&SyncEvent::Remaining {
                    coll: coll.clone(),
                    remaining: progress.remaining(),
                });
            },
        )?;

        let written = progress.written();
        self.reporter
            .report(&SyncEvent::CollectionSynced { coll, written });
        Ok(written)
    }
}
