use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// Minimum character count for every text attribute of a card.
pub const MIN_TEXT_LEN: usize = 1;

// --- Stored Record ---

/// Card
///
/// A row of the `cards` table. `id` is assigned by the store on insert and never changes.
/// Cost, level and usage rate are opaque text, exactly as clients submitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Card {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,

    // `type` is a reserved keyword in Rust; JSON and SQL both keep the original name.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub card_type: String,

    pub elixir: String,
    pub default_level: String,
    pub use_rate: String,
}

// --- Request Payloads ---

/// CardPayload
///
/// Body of `POST /cards` and `PUT /cards/{card_id}`. A client-supplied `id` is accepted
/// for compatibility and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[schema(example = json!({
    "name": "undying hunter",
    "type": "epic",
    "elixir": "4",
    "default_level": "9",
    "use_rate": "68%"
}))]
pub struct CardPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub elixir: String,
    pub default_level: String,
    pub use_rate: String,
}

impl CardPayload {
    /// The five text attributes paired with their wire names, in declaration order.
    fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", &self.name),
            ("type", &self.card_type),
            ("elixir", &self.elixir),
            ("default_level", &self.default_level),
            ("use_rate", &self.use_rate),
        ]
    }

    /// validate
    ///
    /// Checks the minimum length of every text attribute and reports all violations at once.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .text_fields()
            .into_iter()
            .filter(|(_, value)| value.chars().count() < MIN_TEXT_LEN)
            .map(|(field, value)| FieldError::string_too_short(field, value))
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Overwrites every mutable attribute of `card`. The id is left alone.
    pub fn apply_to(&self, card: &mut Card) {
        card.name.clone_from(&self.name);
        card.card_type.clone_from(&self.card_type);
        card.elixir.clone_from(&self.elixir);
        card.default_level.clone_from(&self.default_level);
        card.use_rate.clone_from(&self.use_rate);
    }

    /// Builds the stored record for a freshly assigned id.
    pub fn into_card(self, id: i64) -> Card {
        Card {
            id,
            name: self.name,
            card_type: self.card_type,
            elixir: self.elixir,
            default_level: self.default_level,
            use_rate: self.use_rate,
        }
    }
}

// --- Error Schemas (Output) ---

/// FieldError
///
/// One entry of a 422 `detail` list: what failed (`type`), where (`loc`), and why (`msg`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldError {
    pub fn string_too_short(field: &str, input: &str) -> Self {
        Self {
            kind: "string_too_short".to_string(),
            loc: vec!["body".to_string(), field.to_string()],
            msg: format!("String should have at least {MIN_TEXT_LEN} character"),
            input: Value::String(input.to_string()),
            ctx: Some(json!({ "min_length": MIN_TEXT_LEN })),
        }
    }

    /// The body could not be decoded into a `CardPayload` at all.
    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self {
            kind: "json_invalid".to_string(),
            loc: vec!["body".to_string()],
            msg: msg.into(),
            input: Value::Null,
            ctx: None,
        }
    }

    /// A path segment that should have been an integer.
    pub fn int_parsing(param: &str, input: &str) -> Self {
        Self {
            kind: "int_parsing".to_string(),
            loc: vec!["path".to_string(), param.to_string()],
            msg: "Input should be a valid integer, unable to parse string as an integer"
                .to_string(),
            input: Value::String(input.to_string()),
            ctx: None,
        }
    }
}

/// ErrorBody
///
/// Shape of every error response. `detail` is a message string for 401/404/500 and a list
/// of `FieldError` for 422.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(value_type = Object)]
    pub detail: Value,
}
