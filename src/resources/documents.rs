//! Document operations.
//!
//! Uploads go to the document store host (no API version segment) under a
//! short-lived upload token; stored documents are then attached to orders
//! via `add_document`.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::clients::{Body, Call, FileAttachment, Method, Params, ROOT_FIELD};
use crate::config::{bind_identifier, Endpoint};
use crate::error::{ClientError, Error};
use crate::resources::{merge_fields, Client, Content};

/// Fields for [`Documents::add_document`].
#[derive(Clone, Debug, Serialize)]
pub struct AddDocument {
    /// Identifier the document store assigned at upload time.
    pub document_store_id: String,
    /// The upload token the document was stored under.
    pub document_token: String,
    /// Source locale of the document, in ISO 639 notation.
    pub locale_code: String,
    /// Locales to translate into.
    pub target_locale_codes: Vec<String>,
    /// Display name; defaults server-side to the uploaded file name.
    pub name: Option<String>,
}

/// Operations on documents and the document store.
#[async_trait]
pub trait Documents {
    /// Uploads a file to the document store under a previously created
    /// upload token.
    async fn upload_document(
        &self,
        token: &str,
        document: &Path,
        document_type: &str,
    ) -> Result<Value, Error>;

    /// Downloading through the document store is not supported by the
    /// upstream service; always fails with
    /// [`ClientError::NotImplemented`].
    async fn download_document(&self, token: &str, identifier: &str) -> Result<Value, Error>;

    /// Lists the documents attached to an order, in server order.
    async fn list_documents(&self, identifier: &str) -> Result<Content, Error>;

    /// Attaches an uploaded document to an order.
    async fn add_document(&self, identifier: &str, document: AddDocument)
        -> Result<Value, Error>;
}

#[async_trait]
impl Documents for Client {
    async fn upload_document(
        &self,
        token: &str,
        document: &Path,
        document_type: &str,
    ) -> Result<Value, Error> {
        let url = self.config().document_store_url(Endpoint::UploadDocument);

        let file_name = document
            .file_name()
            .map_or_else(|| "document".to_string(), |name| name.to_string_lossy().into_owned());
        let contents = tokio::fs::read(document)
            .await
            .map_err(|source| Error::DocumentUnreadable {
                path: document.to_path_buf(),
                source,
            })?;

        let mut data = Params::new();
        data.insert("token".to_string(), Value::String(token.to_string()));
        data.insert(
            "type".to_string(),
            Value::String(document_type.to_string()),
        );

        self.core()
            .request_json(
                &url,
                &Call::new()
                    .method(Method::Post)
                    .data(Body::Fields(data))
                    .file(FileAttachment {
                        field: "file".to_string(),
                        file_name,
                        contents,
                    }),
            )
            .await
    }

    async fn download_document(&self, _token: &str, _identifier: &str) -> Result<Value, Error> {
        Err(ClientError::NotImplemented {
            operation: "download_document",
        }
        .into())
    }

    async fn list_documents(&self, identifier: &str) -> Result<Content, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::ListDocuments), identifier);
        self.core()
            .get_content(
                &url,
                &Call::new().method(Method::Get).params(self.base_params()),
                ROOT_FIELD,
            )
            .await
    }

    async fn add_document(
        &self,
        identifier: &str,
        document: AddDocument,
    ) -> Result<Value, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::AddDocument), identifier);
        let mut data = self.base_params();
        data.insert(
            "identifier".to_string(),
            Value::String(identifier.to_string()),
        );
        merge_fields(&mut data, &document)?;
        self.core()
            .request_json(
                &url,
                &Call::new().method(Method::Post).data(Body::Fields(data)),
            )
            .await
    }
}
