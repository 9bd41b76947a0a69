use super::{scalar_field, Game};
use crate::domain::validation::{FieldRuleSet, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::OnceLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    pub genre_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl Genre {
    pub fn rules() -> &'static FieldRuleSet {
        static RULES: OnceLock<FieldRuleSet> = OnceLock::new();
        RULES.get_or_init(|| {
            FieldRuleSet::new()
                .field("name", "required|notempty|max:255")
                .field("description", "max:5000")
        })
    }

    pub fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            genre_id: None,
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub fn assign(&mut self, draft: &GenreDraft) {
        self.name = draft.name.clone();
        self.description = draft.description.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreDraft {
    pub name: String,
    pub description: Option<String>,
}

impl GenreDraft {
    pub fn from_record(record: &Map<String, JsonValue>) -> Result<Self, ValidationErrors> {
        let mut errors = Validator::new(Genre::rules()).validate(record);
        if errors.fails() {
            return Err(errors);
        }
        let name = scalar_field(record, "name", &mut errors);
        let description = scalar_field(record, "description", &mut errors);
        match name {
            Some(name) if errors.passes() => Ok(Self { name, description }),
            _ => Err(errors),
        }
    }
}

/// A genre with the games filed under it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetail {
    #[serde(flatten)]
    pub genre: Genre,
    pub games: Vec<Game>,
}
