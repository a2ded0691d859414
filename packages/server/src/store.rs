//! Dataset persistence and the rolling retention policy.
//!
//! Creation order (the auto-increment id) defines recency; pruning is an
//! ordered offset query over it, run right after every successful create.

use common::storage::{BlobStore, ContentHash};
use sea_orm::*;
use tracing::{debug, warn};

use crate::entity::dataset;
use crate::error::AppError;

/// Number of most recent datasets kept by the retention policy.
pub const RETAINED_DATASETS: u64 = 5;

/// Insert a new dataset as the most recent record.
pub async fn create_dataset<C: ConnectionTrait>(
    db: &C,
    model: dataset::ActiveModel,
) -> Result<dataset::Model, AppError> {
    Ok(model.insert(db).await?)
}

/// Return datasets newest-first, optionally capped at `limit`.
pub async fn list_datasets<C: ConnectionTrait>(
    db: &C,
    limit: Option<u64>,
) -> Result<Vec<dataset::Model>, AppError> {
    let mut select = dataset::Entity::find().order_by_desc(dataset::Column::Id);
    if let Some(limit) = limit {
        select = select.limit(limit);
    }
    Ok(select.all(db).await?)
}

/// Fetch one dataset by id.
pub async fn get_dataset<C: ConnectionTrait>(db: &C, id: i32) -> Result<dataset::Model, AppError> {
    dataset::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dataset not found".into()))
}

/// Delete every dataset beyond the retention window, newest-first ordering.
///
/// Blob deletion is best-effort: failures are logged and never abort the
/// loop or the metadata delete. Returns the number of records pruned.
pub async fn prune_datasets<C: ConnectionTrait>(
    db: &C,
    blob_store: &dyn BlobStore,
) -> Result<u64, AppError> {
    let stale = dataset::Entity::find()
        .order_by_desc(dataset::Column::Id)
        .offset(RETAINED_DATASETS)
        .all(db)
        .await?;

    let mut pruned = 0u64;
    for old in stale {
        delete_backing_blob(db, blob_store, &old).await;
        dataset::Entity::delete_by_id(old.id).exec(db).await?;
        pruned += 1;
    }

    if pruned > 0 {
        debug!(pruned, "Retention prune removed old datasets");
    }
    Ok(pruned)
}

/// Best-effort delete of a pruned dataset's backing blob.
///
/// The store is content-addressed, so the blob stays if any other dataset row
/// still references the same hash (including older rows later in the same
/// prune pass; the last row referencing a hash takes the blob with it).
async fn delete_backing_blob<C: ConnectionTrait>(
    db: &C,
    blob_store: &dyn BlobStore,
    old: &dataset::Model,
) {
    let shared = dataset::Entity::find()
        .filter(dataset::Column::ContentHash.eq(&old.content_hash))
        .filter(dataset::Column::Id.ne(old.id))
        .count(db)
        .await;

    match shared {
        Ok(0) => {}
        Ok(_) => return,
        Err(e) => {
            warn!(
                dataset_id = old.id,
                "Failed to check blob references, keeping blob: {e}"
            );
            return;
        }
    }

    match ContentHash::from_hex(&old.content_hash) {
        Ok(hash) => {
            if let Err(e) = blob_store.delete(&hash).await {
                warn!(
                    dataset_id = old.id,
                    content_hash = %old.content_hash,
                    "Failed to delete blob for pruned dataset: {e}"
                );
            }
        }
        Err(e) => {
            warn!(dataset_id = old.id, "Stored content hash is invalid: {e}");
        }
    }
}
