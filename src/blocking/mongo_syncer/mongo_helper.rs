use super::store::{SourceDb, TargetDb};
use crate::Result;
use tracing::debug;

/// get collection names to sync from given source database.
///
/// When given `colls` is not None and not empty, only collections listed in `colls` are returned.
/// Names in `colls` which don't exist in source database are skipped.
/// The result keeps source database listing order.
pub fn list_collections<S: SourceDb>(db: &S, colls: Option<&[String]>) -> Result<Vec<String>> {
    let names = db.list_collection_names()?;
    let allow_list = match colls {
        Some(colls) if !colls.is_empty() => colls,
        _ => return Ok(names),
    };

    for missing in allow_list.iter().filter(|c| !names.contains(*c)) {
        debug!(coll = %missing, db = db.name(), "Collection doesn't exist in source database, skip it");
    }
    Ok(names
        .into_iter()
        .filter(|name| allow_list.contains(name))
        .collect())
}

/// make sure collection `coll` exists in target database, create it if not.
///
/// Returns true if the collection is created by this call.
pub fn ensure_collection<T: TargetDb>(db: &T, coll: &str) -> Result<bool> {
    if db.collection_exists(coll)? {
        return Ok(false);
    }
    db.create_collection(coll)?;
    Ok(true)
}
