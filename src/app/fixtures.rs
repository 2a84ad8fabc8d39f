//! Per-scenario pets with explicit setup and teardown.
//!
//! Scenarios never rely on pets left behind by earlier runs: whatever a
//! scenario needs it creates here under a unique name, and the fixture deletes
//! it again on [`PetFixture::teardown`] (or, best effort, on drop).

use crate::app::assertions::{Check, ScenarioFailure};
use crate::domain::pet::{AuthKey, Pet, PetDraft};
use crate::domain::ports::PetService;
use crate::domain::response::ApiResponse;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// `base` plus a short random suffix, so lookups by name find exactly this run's pet.
pub fn unique_name(base: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{base}-{}", &suffix[..8])
}

pub struct PetFixture<'s> {
    service: &'s dyn PetService,
    key: AuthKey,
    pet: Pet,
    released: bool,
}

impl<'s> PetFixture<'s> {
    /// Create a pet without a photo.
    pub fn create(service: &'s dyn PetService, key: &AuthKey, draft: &PetDraft) -> Check<Self> {
        let response = service
            .add_new_pet_without_photo(key, draft)
            .map_err(|e| ScenarioFailure::precondition(format!("fixture pet not created: {e}")))?;
        Self::from_response(service, key, response)
    }

    /// Create a pet with a photo.
    pub fn create_with_photo(
        service: &'s dyn PetService,
        key: &AuthKey,
        draft: &PetDraft,
        photo: &Path,
    ) -> Check<Self> {
        let response = service
            .add_new_pet(key, draft, photo)
            .map_err(|e| ScenarioFailure::precondition(format!("fixture pet not created: {e}")))?;
        Self::from_response(service, key, response)
    }

    /// Take over cleanup of a pet the scenario created itself.
    pub fn adopt(service: &'s dyn PetService, key: &AuthKey, pet: Pet) -> Self {
        Self {
            service,
            key: key.clone(),
            pet,
            released: false,
        }
    }

    fn from_response(
        service: &'s dyn PetService,
        key: &AuthKey,
        response: ApiResponse<Pet>,
    ) -> Check<Self> {
        let status = response.status;
        match response.into_parsed() {
            Some(pet) if status == 200 => {
                debug!(pet_id = %pet.id, "fixture pet created");
                Ok(Self::adopt(service, key, pet))
            }
            _ => Err(ScenarioFailure::precondition(format!(
                "fixture pet not created: service answered {status}"
            ))),
        }
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn id(&self) -> &str {
        &self.pet.id
    }

    /// The scenario removed the pet itself; nothing left to clean up.
    pub fn forget(mut self) {
        self.released = true;
    }

    /// Delete the pet; a rejected delete fails the scenario.
    pub fn teardown(mut self) -> Check {
        self.released = true;
        let status = self.service.delete_pet(&self.key, &self.pet.id)?;
        if status == 200 {
            Ok(())
        } else {
            Err(ScenarioFailure::assertion(format!(
                "teardown of pet {} answered {status}",
                self.pet.id
            )))
        }
    }
}

impl Drop for PetFixture<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.service.delete_pet(&self.key, &self.pet.id) {
            Ok(200) => debug!(pet_id = %self.pet.id, "fixture pet removed"),
            Ok(status) => warn!(pet_id = %self.pet.id, status, "fixture pet not removed"),
            Err(e) => warn!(pet_id = %self.pet.id, error = %e, "fixture pet not removed"),
        }
    }
}
