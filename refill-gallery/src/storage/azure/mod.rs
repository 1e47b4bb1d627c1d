//! Azure Blob Storage gateway
//!
//! Built on the `object_store` Azure client:
//!
//! - `put` stores a block blob with the declared content type, replacing any
//!   existing blob with the same name.
//! - `list` streams every blob in the container. The client follows
//!   continuation markers itself, so callers always receive the full
//!   container.
//!
//! Requests are authorized with Shared Key (account key) or a SAS token,
//! whichever the connection string carries.
//!
//! # Examples
//!
//! ```rust,no_run
//! use refill_gallery::storage::{AzureBlobGateway, BlobGateway, ConnectionString};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection: ConnectionString = std::env::var("AZURE_STORAGE_CONNECTION_STRING")?.parse()?;
//! let public_base = connection.blob_endpoint.clone();
//! let gateway = AzureBlobGateway::new(&connection, "refill-images", &public_base)?;
//!
//! for object in gateway.list().await? {
//!     println!("{}", gateway.public_url(&object.key));
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;

use super::traits::{join_url, BlobGateway};
use super::types::{ObjectDescriptor, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::fmt;
use std::sync::Arc;

pub use connection::{ConnectionString, ConnectionStringError, Credential};

/// Gateway to one container of an Azure Storage account
#[derive(Clone)]
pub struct AzureBlobGateway {
    store: Arc<dyn ObjectStore>,
    public_base: String,
}

impl fmt::Debug for AzureBlobGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBlobGateway")
            .field("store", &self.store.to_string())
            .field("public_base", &self.public_base)
            .finish()
    }
}

impl AzureBlobGateway {
    /// Creates a gateway for `container`
    ///
    /// Requests go to the connection string's blob endpoint. Public URLs are
    /// `public_account_url/container/key`; pass the blob endpoint unless a
    /// CDN or custom domain fronts the account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectStore` if the client cannot be built from
    /// the connection settings.
    pub fn new(
        connection: &ConnectionString,
        container: &str,
        public_account_url: &str,
    ) -> StorageResult<Self> {
        let store = connection.builder(container).build()?;
        Ok(Self::with_store(
            Arc::new(store),
            &join_url(public_account_url, container),
        ))
    }

    /// Wraps an already configured store
    ///
    /// `public_base` is the container's public URL; keys are appended to it.
    #[must_use]
    pub fn with_store(store: Arc<dyn ObjectStore>, public_base: &str) -> Self {
        Self {
            store,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn location(key: &str) -> StorageResult<Path> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Path::parse(key).map_err(|_| StorageError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl BlobGateway for AzureBlobGateway {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let location = Self::location(key)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let size = data.len();
        self.store
            .put_opts(&location, PutPayload::from(data), PutOptions::from(attributes))
            .await?;

        tracing::debug!(key, size, "Put blob");
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ObjectDescriptor>> {
        let objects: Vec<ObjectDescriptor> = self
            .store
            .list(None)
            .map_ok(|meta| ObjectDescriptor::new(meta.location.to_string()))
            .try_collect()
            .await?;

        tracing::debug!(count = objects.len(), "Listed container");
        Ok(objects)
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PUBLIC: &str = "https://refill.blob.core.windows.net/refill-images";

    fn in_memory() -> (AzureBlobGateway, Arc<InMemory>) {
        let store = Arc::new(InMemory::new());
        (AzureBlobGateway::with_store(store.clone(), PUBLIC), store)
    }

    fn shared_key_gateway(server: &MockServer) -> AzureBlobGateway {
        let connection: ConnectionString = format!(
            "BlobEndpoint={}/refill;AccountName=refill;AccountKey=c2VjcmV0",
            server.uri()
        )
        .parse()
        .unwrap();
        AzureBlobGateway::new(&connection, "refill-images", "https://refill.blob.core.windows.net")
            .unwrap()
    }

    fn list_body(names: &[&str]) -> String {
        let blobs: String = names
            .iter()
            .map(|n| {
                format!(
                    "<Blob><Name>{n}</Name><Properties>\
                     <Last-Modified>Mon, 01 Jan 2024 00:00:00 GMT</Last-Modified>\
                     <Etag>0x8DC0000000000</Etag>\
                     <Content-Length>3</Content-Length>\
                     <Content-Type>image/png</Content-Type>\
                     </Properties></Blob>"
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <EnumerationResults><Blobs>{blobs}</Blobs></EnumerationResults>"
        )
    }

    #[tokio::test]
    async fn test_put_keeps_content_type() {
        let (gateway, store) = in_memory();

        gateway
            .put("20240101T000000-cat.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let stored = store
            .get(&Path::from("20240101T000000-cat.png"))
            .await
            .unwrap();
        let content_type: &str = stored
            .attributes
            .get(&Attribute::ContentType)
            .unwrap()
            .as_ref();
        assert_eq!(content_type, "image/png");
        assert_eq!(&stored.bytes().await.unwrap()[..], b"png");
    }

    #[tokio::test]
    async fn test_list_returns_every_key() {
        let (gateway, _) = in_memory();
        for key in ["20240101T000000-a.png", "20240102T000000-b.png"] {
            gateway
                .put(key, Bytes::from_static(b"img"), "image/png")
                .await
                .unwrap();
        }

        let mut keys: Vec<String> = gateway.list().await.unwrap().into_iter().map(|d| d.key).collect();
        keys.sort();
        assert_eq!(keys, vec!["20240101T000000-a.png", "20240102T000000-b.png"]);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let (gateway, _) = in_memory();
        let err = gateway.put("", Bytes::new(), "image/png").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn test_public_url_uses_public_base() {
        let connection: ConnectionString =
            "AccountName=refill;AccountKey=c2VjcmV0".parse().unwrap();
        let gateway =
            AzureBlobGateway::new(&connection, "refill-images", "https://cdn.example.com/").unwrap();

        assert_eq!(
            gateway.public_url("20240101T000000-cat.png"),
            "https://cdn.example.com/refill-images/20240101T000000-cat.png"
        );
    }

    #[tokio::test]
    async fn test_put_sends_signed_block_blob() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/refill/refill-images/20240101T000000-cat.png"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(b"png-bytes".to_vec()))
            .respond_with(ResponseTemplate::new(201).insert_header("ETag", "\"0x8DC0000000000\""))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = shared_key_gateway(&server);
        gateway
            .put("20240101T000000-cat.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let authorization = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
        assert!(authorization.starts_with("SharedKey refill:"));
    }

    #[tokio::test]
    async fn test_list_reads_enumeration_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/refill/refill-images"))
            .and(query_param("restype", "container"))
            .and(query_param("comp", "list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(list_body(&["20240101T000000-a.png", "20240102T000000-b.png"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = shared_key_gateway(&server);
        let keys: Vec<String> = gateway.list().await.unwrap().into_iter().map(|d| d.key).collect();

        assert_eq!(keys, vec!["20240101T000000-a.png", "20240102T000000-b.png"]);
    }

    #[tokio::test]
    async fn test_rejected_request_is_storage_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<?xml version=\"1.0\"?><Error><Code>AuthenticationFailed</Code></Error>",
            ))
            .mount(&server)
            .await;

        let gateway = shared_key_gateway(&server);
        let err = gateway.list().await.unwrap_err();

        assert!(matches!(err, StorageError::ObjectStore(_)));
    }
}
