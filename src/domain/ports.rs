use crate::domain::error::ClientError;
use crate::domain::pet::{ApiKeyBody, AuthKey, Credentials, Pet, PetDraft, PetFilter, PetList};
use crate::domain::response::ApiResponse;
use anyhow::Result;
use std::path::Path;

/// The pet service as seen by scenarios (implemented by the HTTP client)
pub trait PetService {
    fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse<ApiKeyBody>, ClientError>;

    fn get_list_of_pets(
        &self,
        key: &AuthKey,
        filter: PetFilter,
    ) -> Result<ApiResponse<PetList>, ClientError>;

    fn add_new_pet(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
        photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError>;

    fn add_new_pet_without_photo(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError>;

    fn update_pet_info(
        &self,
        key: &AuthKey,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError>;

    /// Returns the status code only.
    fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<u16, ClientError>;

    fn set_pet_photo(
        &self,
        key: &AuthKey,
        pet_id: &str,
        photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError>;
}

/// A photo ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Photo file reader port
pub trait PhotoSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<Photo>;
}
