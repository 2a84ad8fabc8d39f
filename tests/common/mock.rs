//! In-process PetService for exercising the suite without HTTP.
#![allow(dead_code)]

use super::fixtures;
use petfriends_harness::domain::error::ClientError;
use petfriends_harness::domain::pet::{
    ApiKeyBody, AuthKey, Credentials, Pet, PetDraft, PetFilter, PetList,
};
use petfriends_harness::domain::ports::PetService;
use petfriends_harness::domain::response::{ApiResponse, ResponseBody};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const MOCK_KEY: &str = "mock-key";
const MOCK_PHOTO: &str = "data:image/jpeg;base64,/9j/2Q==";

/// One account, pets kept in memory, deletes recorded.
///
/// The `with_*`/`*ing_*` constructors switch on one misbehaviour each.
pub struct MockPetService {
    credentials: Credentials,
    reachable: bool,
    delete_status: u16,
    corrupt_listings: bool,
    open_writes: bool,
    pets: Mutex<Vec<Pet>>,
    deleted: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl MockPetService {
    pub fn new() -> Self {
        Self {
            credentials: fixtures::credentials(),
            reachable: true,
            delete_status: 200,
            corrupt_listings: false,
            open_writes: false,
            pets: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Every call fails as if the network were down.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    /// Deletes are answered with `status` and remove nothing unless it is 200.
    pub fn with_delete_status(status: u16) -> Self {
        Self {
            delete_status: status,
            ..Self::new()
        }
    }

    /// Listings report a different type and age than were stored.
    pub fn corrupting_listings() -> Self {
        Self {
            corrupt_listings: true,
            ..Self::new()
        }
    }

    /// Creating pets and uploading photos succeed with any key.
    pub fn accepting_any_key_on_writes() -> Self {
        Self {
            open_writes: true,
            ..Self::new()
        }
    }

    pub fn pets(&self) -> Vec<Pet> {
        self.pets.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn connect(&self, endpoint: &'static str) -> Result<(), ClientError> {
        if self.reachable {
            Ok(())
        } else {
            Err(ClientError::Transport {
                endpoint,
                message: "connection refused".into(),
            })
        }
    }

    fn insert(&self, draft: &PetDraft, photo: &str) -> Pet {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let pet = Pet {
            id: format!("pet-{id}"),
            name: draft.name.clone(),
            animal_type: draft.animal_type.clone(),
            age: draft.age.clone(),
            pet_photo: Some(photo.to_string()),
            created_at: None,
            user_id: Some("mock-user".into()),
        };
        self.pets.lock().unwrap().insert(0, pet.clone());
        pet
    }

    fn may_write(&self, key: &AuthKey) -> bool {
        self.open_writes || authorized(key)
    }

    fn modify(&self, pet_id: &str, change: impl FnOnce(&mut Pet)) -> ApiResponse<Pet> {
        let mut pets = self.pets.lock().unwrap();
        match pets.iter_mut().find(|p| p.id == pet_id) {
            Some(pet) => {
                change(pet);
                ok(pet.clone())
            }
            None => rejected(400),
        }
    }
}

impl Default for MockPetService {
    fn default() -> Self {
        Self::new()
    }
}

fn ok<T>(value: T) -> ApiResponse<T> {
    ApiResponse {
        status: 200,
        body: ResponseBody::Parsed(value),
    }
}

fn rejected<T>(status: u16) -> ApiResponse<T> {
    ApiResponse {
        status,
        body: ResponseBody::Unparsed {
            raw: "<h1>Rejected</h1>".into(),
            reason: "expected value at line 1 column 1".into(),
        },
    }
}

fn authorized(key: &AuthKey) -> bool {
    key.as_str() == MOCK_KEY
}

impl PetService for MockPetService {
    fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse<ApiKeyBody>, ClientError> {
        self.connect("get_api_key")?;
        if *credentials == self.credentials {
            Ok(ok(ApiKeyBody {
                key: AuthKey::new(MOCK_KEY),
            }))
        } else {
            Ok(rejected(403))
        }
    }

    fn get_list_of_pets(
        &self,
        key: &AuthKey,
        _filter: PetFilter,
    ) -> Result<ApiResponse<PetList>, ClientError> {
        self.connect("get_list_of_pets")?;
        if !authorized(key) {
            return Ok(rejected(403));
        }
        let mut pets = self.pets();
        if self.corrupt_listings {
            for pet in &mut pets {
                pet.animal_type = "CORRUPTED".into();
                pet.age = "999".into();
            }
        }
        Ok(ok(PetList { pets }))
    }

    fn add_new_pet(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
        _photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        self.connect("add_new_pet")?;
        if !self.may_write(key) {
            return Ok(rejected(403));
        }
        Ok(ok(self.insert(draft, MOCK_PHOTO)))
    }

    fn add_new_pet_without_photo(
        &self,
        key: &AuthKey,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        self.connect("add_new_pet_without_photo")?;
        if !self.may_write(key) {
            return Ok(rejected(403));
        }
        Ok(ok(self.insert(draft, "")))
    }

    fn update_pet_info(
        &self,
        key: &AuthKey,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        self.connect("update_pet_info")?;
        if !authorized(key) {
            return Ok(rejected(403));
        }
        Ok(self.modify(pet_id, |pet| {
            pet.name = draft.name.clone();
            pet.animal_type = draft.animal_type.clone();
            pet.age = draft.age.clone();
        }))
    }

    fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<u16, ClientError> {
        self.connect("delete_pet")?;
        if !authorized(key) {
            return Ok(403);
        }
        if self.delete_status != 200 {
            return Ok(self.delete_status);
        }
        self.pets.lock().unwrap().retain(|p| p.id != pet_id);
        self.deleted.lock().unwrap().push(pet_id.to_string());
        Ok(200)
    }

    fn set_pet_photo(
        &self,
        key: &AuthKey,
        pet_id: &str,
        _photo: &Path,
    ) -> Result<ApiResponse<Pet>, ClientError> {
        self.connect("set_pet_photo")?;
        if !self.may_write(key) {
            return Ok(rejected(403));
        }
        Ok(self.modify(pet_id, |pet| pet.pet_photo = Some(MOCK_PHOTO.into())))
    }
}
