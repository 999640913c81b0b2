//! Filesystem-backed photo store
//!
//! Objects are plain files under the configured storage root. Signed
//! URLs point at the `/media/{key}` route and carry an expiry plus an
//! HMAC-style SHA-256 signature over `secret|key|expires`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{PhotoStore, SIGNED_URL_TTL_SECS};

pub struct LocalPhotoStore {
    root: PathBuf,
    bucket: String,
    base_url: String,
    secret: String,
}

impl LocalPhotoStore {
    pub fn new(root: PathBuf, bucket: String, base_url: String, secret: String) -> Self {
        LocalPhotoStore {
            root,
            bucket,
            base_url,
            secret,
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        // Keys are server-generated, but reject traversal anyway
        if key.split('/').any(|part| part == "..") || key.starts_with('/') {
            bail!("invalid object key: {}", key);
        }
        Ok(self.root.join(key))
    }

    fn signature(&self, key: &str, expires: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(key.as_bytes());
        hasher.update(b"|");
        hasher.update(expires.to_string().as_bytes());
        hex_encode(&hasher.finalize())
    }

    /// Check a presented expiry and signature for a key
    pub fn verify(&self, key: &str, expires: u64, sig: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(u64::MAX);
        if expires < now {
            return false;
        }
        // Signatures are short; constant-time comparison isn't needed
        // for a single-user local store
        self.signature(key, expires) == sig
    }

    /// Absolute path of a stored object, if it exists
    pub fn existing_path(&self, key: &str) -> Result<Option<PathBuf>> {
        let path = self.object_path(key)?;
        Ok(path.is_file().then_some(path))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }

    fn signed_url(&self, key: &str) -> Result<String> {
        let expires = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before epoch")?
            .as_secs()
            + SIGNED_URL_TTL_SECS;
        let sig = self.signature(key, expires);
        Ok(format!(
            "{}/media/{}?expires={}&sig={}",
            self.base_url, key, expires, sig
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(root: &Path) -> LocalPhotoStore {
        LocalPhotoStore::new(
            root.to_path_buf(),
            "wine-cellar-photos".to_string(),
            "http://127.0.0.1:5850".to_string(),
            "test-secret".to_string(),
        )
    }

    #[tokio::test]
    async fn test_put_delete_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = test_store(dir.path());

        store.put("photos/a.jpg", b"jpeg bytes").await.expect("put");
        assert!(store.existing_path("photos/a.jpg").expect("path").is_some());

        store.delete("photos/a.jpg").await.expect("delete");
        assert!(store.existing_path("photos/a.jpg").expect("path").is_none());

        // Deleting again is not an error
        store.delete("photos/a.jpg").await.expect("redelete");
    }

    #[tokio::test]
    async fn test_signed_url_verifies_and_tampering_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = test_store(dir.path());

        let url = store.signed_url("photos/a.jpg").expect("sign");
        let query = url.split('?').nth(1).expect("query");
        let mut expires = 0u64;
        let mut sig = String::new();
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').expect("pair");
            match k {
                "expires" => expires = v.parse().expect("expires"),
                "sig" => sig = v.to_string(),
                _ => {}
            }
        }

        assert!(store.verify("photos/a.jpg", expires, &sig));
        assert!(!store.verify("photos/b.jpg", expires, &sig));
        assert!(!store.verify("photos/a.jpg", expires + 1, &sig));
        // Expired timestamp fails even with a matching signature
        let old = 1_000_000u64;
        let old_sig = store.signature("photos/a.jpg", old);
        assert!(!store.verify("photos/a.jpg", old, &old_sig));
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = test_store(dir.path());

        assert!(store.put("../escape.jpg", b"x").await.is_err());
        assert!(store.put("/absolute.jpg", b"x").await.is_err());
    }
}
