//! In-memory blob gateway

use super::traits::{join_url, BlobGateway};
use super::types::{ObjectDescriptor, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Object held by [`MemoryBlobGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    /// Payload
    pub data: Bytes,
    /// Content type recorded at upload
    pub content_type: String,
}

/// Blob gateway that keeps objects in process memory
///
/// Nothing survives a restart. Useful for tests, demos and running the
/// service without cloud credentials. Clones share the same objects.
#[derive(Debug, Clone)]
pub struct MemoryBlobGateway {
    base_url: String,
    objects: Arc<RwLock<BTreeMap<String, MemoryObject>>>,
}

impl MemoryBlobGateway {
    /// Creates an empty gateway whose public URLs start with `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Returns a copy of the object stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().get(key).cloned()
    }

    /// Number of stored objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if nothing has been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BlobGateway for MemoryBlobGateway {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.objects.write().insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ObjectDescriptor>> {
        Ok(self
            .objects
            .read()
            .keys()
            .map(ObjectDescriptor::new)
            .collect())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }
}
