//! Pet records and the values the PetFriends API exchanges around them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Account credentials used to obtain an [`AuthKey`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Empty email and password.
    pub fn empty() -> Self {
        Self::new("", "")
    }

    /// Same password, `suffix` appended to the email.
    pub fn with_email_suffix(&self, suffix: &str) -> Self {
        Self::new(format!("{}{}", self.email, suffix), self.password.clone())
    }

    /// Same email, `suffix` appended to the password.
    pub fn with_password_suffix(&self, suffix: &str) -> Self {
        Self::new(self.email.clone(), format!("{}{}", self.password, suffix))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque token issued by the service for a credential pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A copy of this key with `suffix` appended, which the service no longer accepts.
    pub fn invalidated(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthKey(<{} chars>)", self.0.chars().count())
    }
}

/// Body of a successful `GET /api/key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyBody {
    pub key: AuthKey,
}

/// Which pets `GET /api/pets` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetFilter {
    #[default]
    All,
    MyPets,
}

impl PetFilter {
    /// Value of the `filter` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

/// Age as the service stores it: free text.
///
/// The service accepts any string here (including non-numeric ones), and
/// some responses carry the age as a JSON number, so both are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PetAge(String);

impl PetAge {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PetAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PetAge {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PetAge {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for PetAge {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for PetAge {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TextOrNumber {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match TextOrNumber::deserialize(deserializer)? {
            TextOrNumber::Text(text) => PetAge(text),
            TextOrNumber::Number(number) => PetAge(number.to_string()),
        })
    }
}

/// Fields submitted when creating or updating a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetDraft {
    pub name: String,
    pub animal_type: String,
    pub age: PetAge,
}

impl PetDraft {
    pub fn new(
        name: impl Into<String>,
        animal_type: impl Into<String>,
        age: impl Into<PetAge>,
    ) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }

    /// Form fields in the order the service documents them.
    pub fn form_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("animal_type", self.animal_type.as_str()),
            ("age", self.age.as_str()),
        ]
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    #[serde(default)]
    pub age: PetAge,
    /// `data:<mime>;base64,...` when a photo was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Pet {
    pub fn has_photo(&self) -> bool {
        self.pet_photo.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// True when name, type and age equal the draft's.
    pub fn matches(&self, draft: &PetDraft) -> bool {
        self.name == draft.name && self.animal_type == draft.animal_type && self.age == draft.age
    }
}

/// Body of `GET /api/pets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pets.len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.id == id)
    }

    /// First pet with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.name == name)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }
}
