use super::{scalar_field, Game};
use crate::domain::validation::{FieldRuleSet, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::OnceLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Platform {
    pub platform_id: Option<i64>,
    pub name: String,
    pub manufacturer: Option<String>,
}

impl Platform {
    pub fn rules() -> &'static FieldRuleSet {
        static RULES: OnceLock<FieldRuleSet> = OnceLock::new();
        RULES.get_or_init(|| {
            FieldRuleSet::new()
                .field("name", "required|notempty|max:255")
                .field("manufacturer", "max:255")
        })
    }

    pub fn new(name: &str, manufacturer: Option<&str>) -> Self {
        Self {
            platform_id: None,
            name: name.to_string(),
            manufacturer: manufacturer.map(str::to_string),
        }
    }

    pub fn assign(&mut self, draft: &PlatformDraft) {
        self.name = draft.name.clone();
        self.manufacturer = draft.manufacturer.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDraft {
    pub name: String,
    pub manufacturer: Option<String>,
}

impl PlatformDraft {
    pub fn from_record(record: &Map<String, JsonValue>) -> Result<Self, ValidationErrors> {
        let mut errors = Validator::new(Platform::rules()).validate(record);
        if errors.fails() {
            return Err(errors);
        }
        let name = scalar_field(record, "name", &mut errors);
        let manufacturer = scalar_field(record, "manufacturer", &mut errors);
        match name {
            Some(name) if errors.passes() => Ok(Self { name, manufacturer }),
            _ => Err(errors),
        }
    }
}

/// One `(game, platform)` association. A pair is stored at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GamePlatform {
    pub game_id: i64,
    pub platform_id: i64,
}

/// A platform with the games released on it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlatformDetail {
    #[serde(flatten)]
    pub platform: Platform,
    pub games: Vec<Game>,
}
