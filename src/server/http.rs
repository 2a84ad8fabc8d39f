//! In-memory stand-in for the PetFriends service.
//!
//! Serves the same endpoints with the same quirks (no age validation, empty
//! fields accepted, idempotent delete) so the client and the scenario suite
//! can be exercised without network access or a real account.

use crate::domain::pet::{ApiKeyBody, AuthKey, Pet, PetDraft, PetList};
use anyhow::Result;
use axum::{
    Form, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use uuid::Uuid;

/// Shared state of the fake service; clones see the same accounts and pets.
#[derive(Clone, Default)]
pub struct FakePetService {
    inner: Arc<RwLock<Store>>,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    /// Newest first.
    pets: Vec<Pet>,
}

struct Account {
    email: String,
    password: String,
    user_id: String,
    key: String,
}

impl FakePetService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.register(email, password);
        self
    }

    /// Add an account; returns the key it will be issued.
    pub fn register(&self, email: &str, password: &str) -> AuthKey {
        let key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let key = key[..56].to_string();
        let mut store = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        store.accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user_id: Uuid::new_v4().simple().to_string(),
            key: key.clone(),
        });
        AuthKey::new(key)
    }

    pub fn pet_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pets
            .len()
    }

    /// Pets owned by the account with this email.
    pub fn pets_of(&self, email: &str) -> Vec<Pet> {
        let store = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(account) = store.accounts.iter().find(|a| a.email == email) else {
            return Vec::new();
        };
        store
            .pets
            .iter()
            .filter(|p| p.user_id.as_deref() == Some(account.user_id.as_str()))
            .cloned()
            .collect()
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<String, FakeError> {
        let key = header(headers, "auth_key")
            .ok_or_else(|| FakeError::forbidden("Please provide 'auth_key' Header"))?;
        let store = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        store
            .accounts
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.user_id.clone())
            .ok_or_else(|| FakeError::forbidden("Please provide 'auth_key' Header"))
    }

    fn insert(&self, user_id: String, draft: PetDraft, pet_photo: Option<String>) -> Pet {
        let pet = Pet {
            id: Uuid::new_v4().simple().to_string(),
            name: draft.name,
            animal_type: draft.animal_type,
            age: draft.age,
            pet_photo: Some(pet_photo.unwrap_or_default()),
            created_at: Some(timestamp()),
            user_id: Some(user_id),
        };
        let mut store = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        store.pets.insert(0, pet.clone());
        debug!(pet_id = %pet.id, "pet created");
        pet
    }

    /// Apply `change` to a pet owned by `user_id`.
    fn modify(
        &self,
        user_id: &str,
        pet_id: &str,
        change: impl FnOnce(&mut Pet),
    ) -> Result<Pet, FakeError> {
        let mut store = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let pet = store
            .pets
            .iter_mut()
            .find(|p| p.id == pet_id && p.user_id.as_deref() == Some(user_id))
            .ok_or_else(|| FakeError::bad_request(format!("Pet with id {pet_id} not found")))?;
        change(pet);
        Ok(pet.clone())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Debug)]
struct FakeError {
    status: StatusCode,
    message: String,
}

impl FakeError {
    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for FakeError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PetFields {
    name: Option<String>,
    animal_type: Option<String>,
    age: Option<String>,
}

impl PetFields {
    /// All three fields must be present; empty values are accepted.
    fn into_draft(self) -> Result<PetDraft, FakeError> {
        match (self.name, self.animal_type, self.age) {
            (Some(name), Some(animal_type), Some(age)) => Ok(PetDraft::new(name, animal_type, age)),
            _ => Err(FakeError::bad_request(
                "name, animal_type and age are required",
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListQuery {
    #[serde(default)]
    filter: String,
}

pub fn build_router(service: FakePetService) -> Router {
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/{pet_id}", put(update_pet).delete(delete_pet))
        .route("/api/pets/set_photo/{pet_id}", post(set_photo))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve(service: FakePetService, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "fake pet service listening");
    serve_listener(service, listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve_listener(
    service: FakePetService,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn get_api_key(State(service): State<FakePetService>, headers: HeaderMap) -> Response {
    let (Some(email), Some(password)) = (header(&headers, "email"), header(&headers, "password"))
    else {
        return FakeError::forbidden("email and password headers are required").into_response();
    };
    let store = service.inner.read().unwrap_or_else(PoisonError::into_inner);
    match store
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
    {
        Some(account) => Json(ApiKeyBody {
            key: AuthKey::new(account.key.clone()),
        })
        .into_response(),
        None => FakeError::forbidden("This user wasn't found in database").into_response(),
    }
}

async fn list_pets(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Json<PetList>, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let store = service.inner.read().unwrap_or_else(PoisonError::into_inner);
    let pets = match q.filter.as_str() {
        "" => store.pets.clone(),
        "my_pets" => store
            .pets
            .iter()
            .filter(|p| p.user_id.as_deref() == Some(user_id.as_str()))
            .cloned()
            .collect(),
        other => {
            return Err(FakeError::bad_request(format!(
                "Filter value is incorrect: {other}"
            )));
        }
    };
    Ok(Json(PetList { pets }))
}

async fn create_pet_simple(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let draft = fields.into_draft()?;
    Ok(Json(service.insert(user_id, draft, None)))
}

async fn create_pet(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let (fields, photo) = read_multipart(multipart).await?;
    let draft = fields.into_draft()?;
    let photo = photo.ok_or_else(|| FakeError::bad_request("pet_photo is required"))?;
    Ok(Json(service.insert(user_id, draft, Some(photo))))
}

async fn update_pet(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let pet = service.modify(&user_id, &pet_id, |pet| {
        if let Some(name) = fields.name {
            pet.name = name;
        }
        if let Some(animal_type) = fields.animal_type {
            pet.animal_type = animal_type;
        }
        if let Some(age) = fields.age {
            pet.age = age.into();
        }
    })?;
    Ok(Json(pet))
}

async fn delete_pet(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<StatusCode, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let mut store = service.inner.write().unwrap_or_else(PoisonError::into_inner);
    let before = store.pets.len();
    store
        .pets
        .retain(|p| !(p.id == pet_id && p.user_id.as_deref() == Some(user_id.as_str())));
    debug!(%pet_id, removed = before - store.pets.len(), "delete handled");
    Ok(StatusCode::OK)
}

async fn set_photo(
    State(service): State<FakePetService>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, FakeError> {
    let user_id = service.authenticate(&headers)?;
    let (_, photo) = read_multipart(multipart).await?;
    let photo = photo.ok_or_else(|| FakeError::bad_request("pet_photo is required"))?;
    let pet = service.modify(&user_id, &pet_id, |pet| pet.pet_photo = Some(photo))?;
    Ok(Json(pet))
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(PetFields, Option<String>), FakeError> {
    let mut fields = PetFields::default();
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FakeError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "pet_photo" {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| FakeError::bad_request(e.to_string()))?;
            photo = Some(encode_photo(content_type.as_deref(), &bytes)?);
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| FakeError::bad_request(e.to_string()))?;
        match name.as_str() {
            "name" => fields.name = Some(value),
            "animal_type" => fields.animal_type = Some(value),
            "age" => fields.age = Some(value),
            _ => {}
        }
    }
    Ok((fields, photo))
}

fn encode_photo(content_type: Option<&str>, bytes: &[u8]) -> Result<String, FakeError> {
    match content_type {
        Some(mime @ ("image/jpeg" | "image/png")) if !bytes.is_empty() => {
            Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
        }
        Some("image/jpeg" | "image/png") => Err(FakeError::bad_request("pet_photo is empty")),
        other => Err(FakeError::bad_request(format!(
            "pet_photo must be image/jpeg or image/png, got {}",
            other.unwrap_or("no content type")
        ))),
    }
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Seconds since the epoch with a fractional part, as the real service reports it.
fn timestamp() -> String {
    let micros = chrono::Utc::now().timestamp_micros();
    format!("{}.{:06}", micros / 1_000_000, micros % 1_000_000)
}
