use super::{id_from_json, id_list_field, scalar_field, text_field, Genre, Platform};
use crate::domain::validation::{FieldRuleSet, ValidationErrors, Validator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::OnceLock;
use utoipa::ToSchema;

/// A game row. `game_id` is `None` until the first successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub game_id: Option<i64>,
    pub title: String,
    #[schema(value_type = String, format = Date, example = "2007-10-10")]
    pub release_date: NaiveDate,
    pub genre_id: i64,
    pub description: Option<String>,
}

impl Game {
    pub fn rules() -> &'static FieldRuleSet {
        static RULES: OnceLock<FieldRuleSet> = OnceLock::new();
        RULES.get_or_init(|| {
            FieldRuleSet::new()
                .field("title", "required|notempty|min:1|max:255")
                .field("release_date", r"required|notempty|regex:/^\d{4}-\d{2}-\d{2}$/")
                .field("genre_id", "required|integer")
                .field("description", "required|notempty|min:10|max:5000")
                .field("platform_ids", "required|array|min:1|max:10|integer")
        })
    }

    pub fn from_draft(draft: &GameDraft) -> Self {
        let mut game = Self {
            game_id: None,
            title: String::new(),
            release_date: draft.release_date,
            genre_id: draft.genre_id,
            description: None,
        };
        game.assign(draft);
        game
    }

    /// Copies every editable field from `draft`; identity is left alone.
    pub fn assign(&mut self, draft: &GameDraft) {
        self.set_title(&draft.title);
        self.set_release_date(draft.release_date);
        self.set_genre_id(draft.genre_id);
        self.set_description(draft.description.as_deref());
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_release_date(&mut self, release_date: NaiveDate) {
        self.release_date = release_date;
    }

    pub fn set_genre_id(&mut self, genre_id: i64) {
        self.genre_id = genre_id;
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = description.map(str::to_string);
    }

    pub fn is_persisted(&self) -> bool {
        self.game_id.is_some()
    }
}

/// Validated create/update input for a game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDraft {
    pub title: String,
    pub release_date: NaiveDate,
    pub genre_id: i64,
    pub description: Option<String>,
    pub platform_ids: Vec<i64>,
}

impl GameDraft {
    /// Runs [`Game::rules`] over `record` and reads the typed fields out of it.
    pub fn from_record(record: &Map<String, JsonValue>) -> Result<Self, ValidationErrors> {
        let mut errors = Validator::new(Game::rules()).validate(record);

        let release_date = text_field(record, "release_date")
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
        if errors.get("release_date").is_none() && release_date.is_none() {
            errors.add("release_date", "The release_date must be a valid date.");
        }
        if errors.fails() {
            return Err(errors);
        }

        let title = scalar_field(record, "title", &mut errors);
        let genre_id = record.get("genre_id").and_then(id_from_json);
        if genre_id.is_none() {
            errors.add("genre_id", "The genre_id must be an integer.");
        }
        let description = scalar_field(record, "description", &mut errors);

        match (title, release_date, genre_id) {
            (Some(title), Some(release_date), Some(genre_id)) if errors.passes() => Ok(Self {
                title,
                release_date,
                genre_id,
                description,
                platform_ids: id_list_field(record, "platform_ids"),
            }),
            _ => Err(errors),
        }
    }
}

/// A game with its genre and platforms resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub genre: Option<Genre>,
    pub platforms: Vec<Platform>,
}
