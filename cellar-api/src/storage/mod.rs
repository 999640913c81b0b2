//! Photo object storage
//!
//! Uploaded images live in an object store addressed by key. Reads
//! never hand out a permanent URL for stored objects; they resolve a
//! time-limited signed URL at read time.

mod local;

pub use local::LocalPhotoStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::photos::Photo;

/// Signed URLs stay valid for one hour
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Object storage for wine photos
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store object bytes under a key
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove an object; missing objects are not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Time-limited signed URL for an object
    fn signed_url(&self, key: &str) -> Result<String>;

    /// Configured bucket name
    fn bucket(&self) -> &str;
}

/// Display URL for a photo.
///
/// Photos holding an object key get a signed URL; on signing failure
/// the stored raw `url` is returned unchanged, as it is for photos
/// without a key.
pub fn resolve_photo_url(store: &dyn PhotoStore, photo: &Photo) -> String {
    match &photo.object_key {
        Some(key) => match store.signed_url(key) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Signing failed for {}: {}", key, e);
                photo.url.clone()
            }
        },
        None => photo.url.clone(),
    }
}

/// Best-effort object deletion; failures are logged and swallowed
pub async fn delete_object_best_effort(store: &dyn PhotoStore, key: &str) {
    if let Err(e) = store.delete(key).await {
        tracing::warn!("Stored object cleanup failed for {}: {}", key, e);
    }
}
