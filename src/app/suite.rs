//! The scenario suite: a flat list of independent checks against the pet service.
//!
//! Every scenario obtains its own auth key, creates the pets it needs through
//! [`PetFixture`], performs one or two calls and asserts on status and body.
//! Scenarios share nothing but the remote account.

use crate::app::assertions::{
    Check, ScenarioFailure, expect_eq, expect_not_status, expect_ok, expect_status, expect_that,
};
use crate::app::fixtures::{PetFixture, unique_name};
use crate::domain::pet::{AuthKey, Credentials, PetDraft, PetFilter, PetList};
use crate::domain::ports::PetService;
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Suffix that turns a valid key or credential into an invalid one.
const INVALID_SUFFIX: &str = "123";

/// What scenarios need: the service, an account, and optionally a photo to upload.
pub struct SuiteContext<'s> {
    pub service: &'s dyn PetService,
    pub credentials: Credentials,
    pub photo: Option<PathBuf>,
}

impl<'s> SuiteContext<'s> {
    pub fn new(service: &'s dyn PetService, credentials: Credentials) -> Self {
        Self {
            service,
            credentials,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<PathBuf>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// A key for the configured account; failing to get one makes the scenario unrunnable.
    pub fn auth_key(&self) -> Check<AuthKey> {
        let response = self
            .service
            .get_api_key(&self.credentials)
            .map_err(|e| ScenarioFailure::precondition(format!("no auth key: {e}")))?;
        let status = response.status;
        match response.into_parsed() {
            Some(body) if status == 200 => Ok(body.key),
            _ => Err(ScenarioFailure::precondition(format!(
                "no auth key: service answered {status}"
            ))),
        }
    }

    pub fn photo(&self) -> Check<&Path> {
        self.photo
            .as_deref()
            .ok_or_else(|| ScenarioFailure::precondition("no photo configured"))
    }

    fn my_pets(&self, key: &AuthKey) -> Check<PetList> {
        let response = self.service.get_list_of_pets(key, PetFilter::MyPets)?;
        expect_ok("get_list_of_pets(my_pets)", &response).cloned()
    }
}

pub type ScenarioFn = fn(&SuiteContext<'_>) -> Check;

pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    pub const fn new(name: &'static str, description: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            description,
            run,
        }
    }

    pub fn run(&self, ctx: &SuiteContext<'_>) -> ScenarioResult {
        let started = Instant::now();
        let outcome = match (self.run)(ctx) {
            Ok(()) => Outcome::Passed,
            Err(ScenarioFailure::Precondition(message)) => Outcome::Unrunnable(message),
            Err(failure) => Outcome::Failed(failure.to_string()),
        };
        let elapsed = started.elapsed();
        match &outcome {
            Outcome::Passed => info!(scenario = self.name, ?elapsed, "passed"),
            Outcome::Failed(reason) => warn!(scenario = self.name, %reason, "failed"),
            Outcome::Unrunnable(reason) => warn!(scenario = self.name, %reason, "unrunnable"),
        }
        ScenarioResult {
            name: self.name,
            outcome,
            elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The service did not behave as asserted, or the client failed mid-scenario.
    Failed(String),
    /// A precondition was not met; the service was never really exercised.
    Unrunnable(String),
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn unrunnable(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Unrunnable(_)))
    }

    /// True when every scenario passed.
    pub fn is_success(&self) -> bool {
        self.passed() == self.results.len()
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.results.iter().find(|r| r.name == name).map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

pub struct Suite {
    scenarios: Vec<Scenario>,
}

impl Suite {
    pub fn standard() -> Self {
        Self {
            scenarios: vec![
                Scenario::new(
                    "api_key_for_valid_user",
                    "valid credentials yield status 200 and a key",
                    api_key_for_valid_user,
                ),
                Scenario::new(
                    "list_all_pets_with_valid_key",
                    "listing all pets with a valid key is 200 and non-empty",
                    list_all_pets_with_valid_key,
                ),
                Scenario::new(
                    "add_pet_with_valid_data",
                    "a pet with photo is created and listed under my_pets",
                    add_pet_with_valid_data,
                ),
                Scenario::new(
                    "add_pet_without_photo",
                    "a pet without photo is created with the submitted fields",
                    add_pet_without_photo,
                ),
                Scenario::new(
                    "add_pet_with_non_numeric_age",
                    "the service accepts a non-numeric age and returns it unchanged",
                    add_pet_with_non_numeric_age,
                ),
                Scenario::new(
                    "add_pet_with_photo_only",
                    "a pet with empty fields and a photo is created with that photo",
                    add_pet_with_photo_only,
                ),
                Scenario::new(
                    "delete_own_pet",
                    "a deleted pet disappears from my_pets",
                    delete_own_pet,
                ),
                Scenario::new(
                    "update_own_pet_info",
                    "an update changes the fields and keeps the id",
                    update_own_pet_info,
                ),
                Scenario::new(
                    "list_pets_with_invalid_key",
                    "listing pets with an altered key is rejected",
                    list_pets_with_invalid_key,
                ),
                Scenario::new(
                    "api_key_for_unknown_email",
                    "an altered email gets no key",
                    api_key_for_unknown_email,
                ),
                Scenario::new(
                    "api_key_for_wrong_password",
                    "an altered password gets no key",
                    api_key_for_wrong_password,
                ),
                Scenario::new(
                    "api_key_for_empty_credentials",
                    "empty email and password get no key",
                    api_key_for_empty_credentials,
                ),
                Scenario::new(
                    "update_pet_with_invalid_key",
                    "an update with an altered key is rejected and changes nothing",
                    update_pet_with_invalid_key,
                ),
                Scenario::new(
                    "update_nonexistent_pet",
                    "updating an unknown pet id is rejected",
                    update_nonexistent_pet,
                ),
                Scenario::new(
                    "delete_pet_with_invalid_key",
                    "a delete with an altered key is rejected and the pet stays",
                    delete_pet_with_invalid_key,
                ),
                Scenario::new(
                    "set_photo_for_own_pet",
                    "a photo can be added to a pet created without one",
                    set_photo_for_own_pet,
                ),
                Scenario::new(
                    "add_pet_with_invalid_key",
                    "creating a pet or uploading a photo with an altered key is rejected",
                    add_pet_with_invalid_key,
                ),
            ],
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Keep only the named scenarios, in suite order.
    pub fn only(self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        let unknown: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|n| !self.scenarios.iter().any(|s| s.name == *n))
            .collect();
        if !unknown.is_empty() {
            bail!("unknown scenario(s): {}", unknown.join(", "));
        }
        let scenarios = self
            .scenarios
            .into_iter()
            .filter(|s| names.iter().any(|n| n == s.name))
            .collect();
        Ok(Self { scenarios })
    }

    pub fn run(&self, ctx: &SuiteContext<'_>) -> SuiteReport {
        SuiteReport {
            results: self.scenarios.iter().map(|s| s.run(ctx)).collect(),
        }
    }
}

fn fixture_draft() -> PetDraft {
    PetDraft::new(unique_name("Суперкот"), "кот", "3")
}

fn api_key_for_valid_user(ctx: &SuiteContext<'_>) -> Check {
    let response = ctx.service.get_api_key(&ctx.credentials)?;
    let body = expect_ok("get_api_key", &response)?;
    expect_that(!body.key.as_str().is_empty(), "get_api_key: key is empty")
}

fn list_all_pets_with_valid_key(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;

    let response = ctx.service.get_list_of_pets(&key, PetFilter::All)?;
    let list = expect_ok("get_list_of_pets", &response)?;
    expect_that(!list.is_empty(), "get_list_of_pets: no pets listed")?;

    fixture.teardown()
}

fn add_pet_with_valid_data(ctx: &SuiteContext<'_>) -> Check {
    let photo = ctx.photo()?;
    let key = ctx.auth_key()?;
    let draft = PetDraft::new("Порри", "Гаттер", "1");

    let response = ctx.service.add_new_pet(&key, &draft, photo)?;
    let pet = expect_ok("add_new_pet", &response)?;
    let fixture = PetFixture::adopt(ctx.service, &key, pet.clone());
    expect_eq("name", &pet.name, &draft.name)?;

    let mine = ctx.my_pets(&key)?;
    let listed = mine
        .find_by_id(&pet.id)
        .ok_or_else(|| ScenarioFailure::assertion(format!("pet {} missing from my_pets", pet.id)))?;
    expect_that(
        listed.matches(&draft),
        format!("re-fetched pet does not match submitted fields: {listed:?}"),
    )?;
    expect_that(
        mine.find_by_name(&draft.name).is_some(),
        format!("no pet named {:?} in my_pets", draft.name),
    )?;

    fixture.teardown()
}

fn add_pet_without_photo(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let draft = PetDraft::new("Матроскин", "Котэ", "5");

    let response = ctx.service.add_new_pet_without_photo(&key, &draft)?;
    let pet = expect_ok("add_new_pet_without_photo", &response)?;
    let fixture = PetFixture::adopt(ctx.service, &key, pet.clone());
    expect_eq("name", &pet.name, &draft.name)?;
    expect_eq("animal_type", &pet.animal_type, &draft.animal_type)?;
    expect_eq("age", &pet.age, &draft.age)?;

    fixture.teardown()
}

// The service does not validate age; a non-numeric one is stored as given.
fn add_pet_with_non_numeric_age(ctx: &SuiteContext<'_>) -> Check {
    let photo = ctx.photo()?;
    let key = ctx.auth_key()?;
    let draft = PetDraft::new("Горец", "Бессмертный", "стопицот");

    let response = ctx.service.add_new_pet(&key, &draft, photo)?;
    let pet = expect_ok("add_new_pet", &response)?;
    let fixture = PetFixture::adopt(ctx.service, &key, pet.clone());
    expect_eq("age", &pet.age, &draft.age)?;

    fixture.teardown()
}

fn add_pet_with_photo_only(ctx: &SuiteContext<'_>) -> Check {
    let photo = ctx.photo()?;
    let key = ctx.auth_key()?;
    let draft = PetDraft::new("", "", "");

    let response = ctx.service.add_new_pet(&key, &draft, photo)?;
    let pet = expect_ok("add_new_pet", &response)?;
    let fixture = PetFixture::adopt(ctx.service, &key, pet.clone());
    expect_that(pet.has_photo(), "add_new_pet: pet_photo is empty")?;

    fixture.teardown()
}

fn delete_own_pet(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;
    let pet_id = fixture.id().to_string();

    let status = ctx.service.delete_pet(&key, &pet_id)?;
    expect_status("delete_pet", status, 200)?;

    let mine = ctx.my_pets(&key)?;
    expect_that(
        !mine.contains_id(&pet_id),
        format!("pet {pet_id} still listed after delete"),
    )?;

    fixture.forget();
    Ok(())
}

fn update_own_pet_info(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;
    let draft = PetDraft::new("Расти", "Собакен", 17u32);

    let response = ctx.service.update_pet_info(&key, fixture.id(), &draft)?;
    let pet = expect_ok("update_pet_info", &response)?;
    expect_eq("name", &pet.name, &draft.name)?;
    expect_eq("id", pet.id.as_str(), fixture.id())?;

    let mine = ctx.my_pets(&key)?;
    let listed = mine
        .find_by_id(fixture.id())
        .ok_or_else(|| ScenarioFailure::assertion("updated pet missing from my_pets"))?;
    expect_that(
        listed.matches(&draft),
        format!("re-fetched pet does not match update: {listed:?}"),
    )?;

    fixture.teardown()
}

fn list_pets_with_invalid_key(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?.invalidated(INVALID_SUFFIX);
    let response = ctx.service.get_list_of_pets(&key, PetFilter::All)?;
    expect_not_status("get_list_of_pets", response.status, 200)
}

fn api_key_for_unknown_email(ctx: &SuiteContext<'_>) -> Check {
    let credentials = ctx.credentials.with_email_suffix(INVALID_SUFFIX);
    let response = ctx.service.get_api_key(&credentials)?;
    expect_not_status("get_api_key", response.status, 200)
}

fn api_key_for_wrong_password(ctx: &SuiteContext<'_>) -> Check {
    let credentials = ctx.credentials.with_password_suffix(INVALID_SUFFIX);
    let response = ctx.service.get_api_key(&credentials)?;
    expect_not_status("get_api_key", response.status, 200)
}

fn api_key_for_empty_credentials(ctx: &SuiteContext<'_>) -> Check {
    let response = ctx.service.get_api_key(&Credentials::empty())?;
    expect_not_status("get_api_key", response.status, 200)
}

fn update_pet_with_invalid_key(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;

    let bad_key = key.invalidated(INVALID_SUFFIX);
    let draft = PetDraft::new("Басти", "Котяра", 3u32);
    let response = ctx.service.update_pet_info(&bad_key, fixture.id(), &draft)?;
    expect_not_status("update_pet_info", response.status, 200)?;

    let mine = ctx.my_pets(&key)?;
    let listed = mine
        .find_by_id(fixture.id())
        .ok_or_else(|| ScenarioFailure::assertion("pet missing after rejected update"))?;
    expect_eq("name after rejected update", &listed.name, &fixture.pet().name)?;

    fixture.teardown()
}

fn update_nonexistent_pet(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;

    let missing_id = format!("{}{}", fixture.id(), INVALID_SUFFIX);
    let draft = PetDraft::new("Тестис", "Собака", 13u32);
    let response = ctx.service.update_pet_info(&key, &missing_id, &draft)?;
    expect_not_status("update_pet_info", response.status, 200)?;

    fixture.teardown()
}

fn delete_pet_with_invalid_key(ctx: &SuiteContext<'_>) -> Check {
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;

    let status = ctx
        .service
        .delete_pet(&key.invalidated(INVALID_SUFFIX), fixture.id())?;
    expect_not_status("delete_pet", status, 200)?;

    let mine = ctx.my_pets(&key)?;
    expect_that(
        mine.contains_id(fixture.id()),
        "pet disappeared after rejected delete",
    )?;

    fixture.teardown()
}

fn set_photo_for_own_pet(ctx: &SuiteContext<'_>) -> Check {
    let photo = ctx.photo()?;
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;

    let response = ctx.service.set_pet_photo(&key, fixture.id(), photo)?;
    let pet = expect_ok("set_pet_photo", &response)?;
    expect_eq("id", pet.id.as_str(), fixture.id())?;
    expect_that(pet.has_photo(), "set_pet_photo: pet_photo is empty")?;

    fixture.teardown()
}

fn add_pet_with_invalid_key(ctx: &SuiteContext<'_>) -> Check {
    let photo = ctx.photo()?;
    let key = ctx.auth_key()?;
    let fixture = PetFixture::create(ctx.service, &key, &fixture_draft())?;
    let bad_key = key.invalidated(INVALID_SUFFIX);
    let draft = PetDraft::new(unique_name("Нелегал"), "кот", "2");

    let response = ctx.service.add_new_pet(&bad_key, &draft, photo)?;
    expect_not_status("add_new_pet", response.status, 200)?;
    let response = ctx.service.add_new_pet_without_photo(&bad_key, &draft)?;
    expect_not_status("add_new_pet_without_photo", response.status, 200)?;
    let response = ctx.service.set_pet_photo(&bad_key, fixture.id(), photo)?;
    expect_not_status("set_pet_photo", response.status, 200)?;

    let mine = ctx.my_pets(&key)?;
    expect_that(
        mine.find_by_name(&draft.name).is_none(),
        format!("pet {:?} created with an altered key", draft.name),
    )?;
    let listed = mine
        .find_by_id(fixture.id())
        .ok_or_else(|| ScenarioFailure::assertion("pet missing after rejected photo upload"))?;
    expect_that(!listed.has_photo(), "photo set with an altered key")?;

    fixture.teardown()
}
