use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Custom part fields, stored as a JSON object.
///
/// Each value is either a plain string or an object of the form
/// `{"value": ..., "visible": ...}`. Key order is preserved as read; JSONB
/// itself normalises it on write.
pub type CustomFields = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_REFERENCE: &str = "R?";

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: None,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Part
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub sequence_number: i32,
    pub name: String,
    pub category_id: i32,
    pub value: String,
    pub reference: String,
    pub footprint: String,
    pub symbol_id: String,
    pub description: Option<String>,
    pub datasheet: Option<String>,
    pub keywords: Option<String>,
    pub fields: CustomFields,
    pub exclude_from_bom: bool,
    pub exclude_from_board: bool,
    pub exclude_from_sim: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a part. Storage assigns the sequence number and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPart {
    pub name: String,
    pub category_id: i32,
    pub value: String,
    #[serde(default = "default_reference")]
    pub reference: String,
    pub footprint: String,
    pub symbol_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub datasheet: Option<String>,
    #[serde(default = "default_keywords")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub fields: CustomFields,
    #[serde(default)]
    pub exclude_from_bom: bool,
    #[serde(default)]
    pub exclude_from_board: bool,
    #[serde(default)]
    pub exclude_from_sim: bool,
}

fn default_reference() -> String {
    DEFAULT_REFERENCE.to_string()
}

fn default_keywords() -> Option<String> {
    Some(String::new())
}

impl Default for NewPart {
    fn default() -> Self {
        Self {
            name: String::new(),
            category_id: 0,
            value: String::new(),
            reference: default_reference(),
            footprint: String::new(),
            symbol_id: String::new(),
            description: None,
            datasheet: None,
            keywords: default_keywords(),
            fields: CustomFields::new(),
            exclude_from_bom: false,
            exclude_from_board: false,
            exclude_from_sim: false,
        }
    }
}

/// Patch for an existing part. `None` leaves the column untouched.
///
/// The nullable columns take `Some(None)` to clear them; in JSON an explicit
/// `null` clears and an absent key leaves the column alone.
///
/// `name` may only be supplied if it equals the stored name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub datasheet: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub keywords: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<CustomFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_bom: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_board: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_sim: Option<bool>,
}

/// Present-but-null deserializes to `Some(None)`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PartUpdate {
    /// Apply the patch to an in-memory part. Does not touch `updated_at`.
    pub fn apply_to(self, part: &mut Part) {
        if let Some(v) = self.name {
            part.name = v;
        }
        if let Some(v) = self.category_id {
            part.category_id = v;
        }
        if let Some(v) = self.value {
            part.value = v;
        }
        if let Some(v) = self.reference {
            part.reference = v;
        }
        if let Some(v) = self.footprint {
            part.footprint = v;
        }
        if let Some(v) = self.symbol_id {
            part.symbol_id = v;
        }
        if let Some(v) = self.description {
            part.description = v;
        }
        if let Some(v) = self.datasheet {
            part.datasheet = v;
        }
        if let Some(v) = self.keywords {
            part.keywords = v;
        }
        if let Some(v) = self.fields {
            part.fields = v;
        }
        if let Some(v) = self.exclude_from_bom {
            part.exclude_from_bom = v;
        }
        if let Some(v) = self.exclude_from_board {
            part.exclude_from_board = v;
        }
        if let Some(v) = self.exclude_from_sim {
            part.exclude_from_sim = v;
        }
    }
}

/// Row returned when listing the parts of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartListing {
    pub sequence_number: i32,
    pub name: String,
    pub description: Option<String>,
}
