//! HTTP client for the Quillboard API.

use std::marker::PhantomData;

use quillboard_core::pagination::Page;
use quillboard_models::OptionItem;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::cascade::{FetchError, FetchFuture, OptionFetcher};
use crate::crud::{CrudBackend, ListState, Row};
use crate::form::{PickedFile, SelectOption, Submission};
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidUrl(_) => None,
        }
    }

    /// Per-field messages from a validation rejection.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Status { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }
}

impl From<ApiError> for FetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Http(e) => Self::Http(e),
            ApiError::Status { status, .. } => Self::Status(status),
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    errors: FieldErrors,
}

#[derive(Debug, Deserialize)]
struct DeletedBody {
    deleted: u64,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let (message, errors) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.error, parsed.errors),
            Err(_) => (
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
                FieldErrors::new(),
            ),
        };
        debug!(status = status.as_u16(), %message, "API request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
            errors,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        Ok(Self::checked(builder).await?.json().await?)
    }

    /// `{id, name}` entries from a lookup endpoint, as select options.
    #[instrument(skip(self))]
    pub async fn options(&self, path: &str) -> Result<Vec<SelectOption>, ApiError> {
        let items: Vec<OptionItem> = Self::send(self.request(Method::GET, path)).await?;
        Ok(items
            .into_iter()
            .map(|item| SelectOption::new(item.id.to_string(), item.name))
            .collect())
    }

    pub fn resource<T>(&self, name: impl Into<String>) -> ResourceApi<T> {
        ResourceApi {
            client: self.clone(),
            resource: name.into(),
            _record: PhantomData,
        }
    }
}

impl OptionFetcher for ApiClient {
    fn fetch<'a>(&'a self, endpoint: &'a str) -> FetchFuture<'a> {
        Box::pin(async move { self.options(endpoint).await.map_err(FetchError::from) })
    }
}

/// CRUD calls for one resource collection, e.g. `blogs`.
#[derive(Debug, Clone)]
pub struct ResourceApi<T> {
    client: ApiClient,
    resource: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ResourceApi<T> {
    fn path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.resource.clone()
        } else {
            format!("{}/{}", self.resource, suffix)
        }
    }

    pub async fn list(&self, query: &[(String, String)]) -> Result<Page<T>, ApiError> {
        ApiClient::send(self.client.request(Method::GET, &self.path("")).query(query)).await
    }

    pub async fn get(&self, id: i64) -> Result<T, ApiError> {
        ApiClient::send(self.client.request(Method::GET, &self.path(&id.to_string()))).await
    }

    /// Sends `file` as the multipart part `field` to `{resource}/{id}/{field}`.
    #[instrument(skip(self, file), fields(size = file.size))]
    pub async fn upload(&self, id: i64, field: &str, file: &PickedFile) -> Result<T, ApiError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part(field.to_string(), part);
        ApiClient::send(
            self.client
                .request(Method::POST, &self.path(&format!("{id}/{field}")))
                .multipart(form),
        )
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        ApiClient::checked(self.client.request(Method::DELETE, &self.path(&id.to_string()))).await?;
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, ApiError> {
        let body: DeletedBody = ApiClient::send(
            self.client
                .request(Method::POST, &self.path("bulk-delete"))
                .json(&json!({ "ids": ids })),
        )
        .await?;
        Ok(body.deleted)
    }

    pub async fn reorder(&self, ordered_ids: &[i64]) -> Result<(), ApiError> {
        ApiClient::checked(
            self.client
                .request(Method::POST, &self.path("reorder"))
                .json(&json!({ "ordered_ids": ordered_ids })),
        )
        .await?;
        Ok(())
    }

    pub async fn move_by_index(&self, from_index: usize, to_index: usize) -> Result<(), ApiError> {
        ApiClient::checked(
            self.client
                .request(Method::POST, &self.path("reorder/move"))
                .json(&json!({ "from_index": from_index, "to_index": to_index })),
        )
        .await?;
        Ok(())
    }

    pub async fn reset_order(&self) -> Result<(), ApiError> {
        ApiClient::checked(self.client.request(Method::POST, &self.path("reorder/reset"))).await?;
        Ok(())
    }

    /// Export link carrying the current list state and `format`.
    pub fn export_url(&self, state: &ListState, format: &str) -> Result<Url, ApiError> {
        Url::parse_with_params(&self.client.url(&self.path("export")), state.export_pairs(format))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }
}

impl<T: Row + DeserializeOwned> ResourceApi<T> {
    /// Creates the record from the JSON values, then uploads each picked file.
    pub async fn create(&self, submission: &Submission) -> Result<T, ApiError> {
        let record = ApiClient::send(
            self.client
                .request(Method::POST, &self.path(""))
                .json(&submission.values),
        )
        .await?;
        self.attach_files(record, submission).await
    }

    pub async fn update(&self, id: i64, submission: &Submission) -> Result<T, ApiError> {
        let record = ApiClient::send(
            self.client
                .request(Method::PUT, &self.path(&id.to_string()))
                .json(&submission.values),
        )
        .await?;
        self.attach_files(record, submission).await
    }

    async fn attach_files(&self, mut record: T, submission: &Submission) -> Result<T, ApiError> {
        let id = record.row_id();
        for (field, file) in &submission.files {
            record = self.upload(id, field, file).await?;
            debug!(id, field = %field, "File uploaded");
        }
        Ok(record)
    }
}

impl<T> CrudBackend for ResourceApi<T>
where
    T: Row + DeserializeOwned + Send + 'static,
{
    type Record = T;
    type Error = ApiError;

    async fn list(&self, query: &[(String, String)]) -> Result<Page<T>, ApiError> {
        ResourceApi::list(self, query).await
    }

    async fn create(&self, submission: &Submission) -> Result<T, ApiError> {
        ResourceApi::create(self, submission).await
    }

    async fn update(&self, id: i64, submission: &Submission) -> Result<T, ApiError> {
        ResourceApi::update(self, id, submission).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        ResourceApi::delete(self, id).await
    }

    async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, ApiError> {
        ResourceApi::bulk_delete(self, ids).await
    }

    async fn reorder(&self, ordered_ids: &[i64]) -> Result<(), ApiError> {
        ResourceApi::reorder(self, ordered_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::ViewMode;
    use serde_json::Value;

    #[test]
    fn test_url_joins_cleanly() {
        let client = ApiClient::new("http://localhost:3000/api/");
        assert_eq!(client.url("/blogs"), "http://localhost:3000/api/blogs");
        assert_eq!(client.url("countries/1/states"), "http://localhost:3000/api/countries/1/states");
    }

    #[test]
    fn test_export_url_carries_filters() {
        let api = ApiClient::new("http://localhost:3000/api").resource::<Value>("blogs");
        let mut state = ListState::new(ViewMode::Table);
        state.set_search("launch week");
        state.set_filter("status", "published");

        let url = api.export_url(&state, "csv").unwrap();
        assert_eq!(url.path(), "/api/blogs/export");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("search".into(), "launch week".into())));
        assert!(pairs.contains(&("status".into(), "published".into())));
        assert!(pairs.contains(&("format".into(), "csv".into())));
    }

    #[test]
    fn test_field_errors_only_for_rejections_with_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), "Title is required".into());
        let error = ApiError::Status {
            status: 422,
            message: "Validation failed".into(),
            errors,
        };
        assert_eq!(error.status(), Some(422));
        assert_eq!(error.field_errors().map(|e| e.len()), Some(1));
        assert_eq!(error.to_string(), "Validation failed");

        let error = ApiError::Status {
            status: 403,
            message: "Access denied".into(),
            errors: FieldErrors::new(),
        };
        assert!(error.field_errors().is_none());
        assert!(matches!(FetchError::from(error), FetchError::Status(403)));
    }

    #[test]
    fn test_error_body_parses_without_fields() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"Blog not found"}"#).unwrap();
        assert_eq!(body.error, "Blog not found");
        assert!(body.errors.is_empty());
    }
}
