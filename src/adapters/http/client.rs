//! Blocking HTTP client for the PetFriends REST API.
//!
//! Every operation returns the status code and the decoded body exactly as
//! the service produced them. Nothing is retried and nothing is validated:
//! the scenarios exist to observe the service's real behaviour, error
//! responses included.

use crate::adapters::fs::reader::FilePhotoReader;
use crate::domain::error::ClientError;
use crate::domain::pet::{ApiKeyBody, AuthKey, Credentials, Pet, PetDraft, PetFilter, PetList};
use crate::domain::ports::{PetService, PhotoSource};
use crate::domain::response::{ApiResponse, ResponseBody};
use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::de::DeserializeOwned;
use std::error::Error as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const AUTH_KEY_HEADER: &str = "auth_key";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }
}

pub struct PetFriendsClient {
    http: Client,
    base_url: String,
    photos: Arc<dyn PhotoSource>,
}

impl PetFriendsClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("petfriends-harness/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::InvalidRequest {
                endpoint: "client",
                message: error_chain(&e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            photos: Arc::new(FilePhotoReader::new()),
        })
    }

    /// Replace the file system photo reader.
    pub fn with_photo_source(mut self, photos: Arc<dyn PhotoSource>) -> Self {
        self.photos = photos;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, endpoint: &'static str, request: RequestBuilder) -> Result<(u16, String), ClientError> {
        debug!(endpoint, "sending request");
        let response = request.send().map_err(|e| {
            let message = error_chain(&e);
            if e.is_builder() {
                ClientError::InvalidRequest { endpoint, message }
            } else {
                ClientError::Transport { endpoint, message }
            }
        })?;

        let status = response.status().as_u16();
        let raw = response.text().map_err(|e| ClientError::Transport {
            endpoint,
            message: error_chain(&e),
        })?;
        debug!(endpoint, status, bytes = raw.len(), "response received");
        Ok((status, raw))
    }

    fn call<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let (status, raw) = self.send(endpoint, request)?;
        let response = ApiResponse::decode(status, raw);
        if let ResponseBody::Unparsed { reason, .. } = &response.body {
            if response.is_ok() {
                warn!(endpoint, %reason, "successful response has an unexpected body");
            } else {
                debug!(endpoint, status, "error response body kept as raw text");
            }
        }
        Ok(response)
    }

    fn photo_part(&self, path: &Path) -> Result<multipart::Part, ClientError> {
        let photo_error = |message: String| ClientError::Photo {
            path: path.to_path_buf(),
            message,
        };
        let photo = self.photos.load(path).map_err(|e| photo_error(format!("{e:#}")))?;
        multipart::Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(photo.mime)
            .map_err(|e| photo_error(error_chain(&e)))
    }
}

impl PetService for PetFriendsClient {
    fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse<ApiKeyBody>, ClientError> {
        let request = self
            .http
            .get(self.url("api/key"))
            .header("email", credentials.email.as_str())
            .header("password", credentials.password.as_str());
        self.call("get_api_key", request)
    }

    fn get_list_of_pets(
        &self,
        key: &AuthKey,
        filter: PetFilter,
    ) -> Result<ApiResponse<PetList>, ClientError> {
        let request = self
            .http
            .get(self.url("api/pets"))
            .header(AUTH_KEY_HEADER, key.as_str())
            .query(&[("filter", filter.as_query())]);
        self.call("get_list_of_pets", request)
    }

    fn add_new_pet(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
        photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        let mut form = multipart::Form::new();
        for (name, value) in draft.form_fields() {
            form = form.text(name, value.to_string());
        }
        let form = form.part("pet_photo", self.photo_part(photo)?);

        let request = self
            .http
            .post(self.url("api/pets"))
            .header(AUTH_KEY_HEADER, key.as_str())
            .multipart(form);
        self.call("add_new_pet", request)
    }

    fn add_new_pet_without_photo(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        let request = self
            .http
            .post(self.url("api/create_pet_simple"))
            .header(AUTH_KEY_HEADER, key.as_str())
            .form(&draft.form_fields());
        self.call("add_new_pet_without_photo", request)
    }

    fn update_pet_info(
        &self,
        key: &AuthKey,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("api/pets/{pet_id}")))
            .header(AUTH_KEY_HEADER, key.as_str())
            .form(&draft.form_fields());
        self.call("update_pet_info", request)
    }

    fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<u16, ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("api/pets/{pet_id}")))
            .header(AUTH_KEY_HEADER, key.as_str());
        let (status, _) = self.send("delete_pet", request)?;
        Ok(status)
    }

    fn set_pet_photo(
        &self,
        key: &AuthKey,
        pet_id: &str,
        photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        let form = multipart::Form::new().part("pet_photo", self.photo_part(photo)?);
        let request = self
            .http
            .post(self.url(&format!("api/pets/set_photo/{pet_id}")))
            .header(AUTH_KEY_HEADER, key.as_str())
            .multipart(form);
        self.call("set_pet_photo", request)
    }
}

/// Display of an error and its sources, `: `-separated.
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
