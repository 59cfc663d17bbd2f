//! Wire format of the KiCad HTTP library API (v1).
//!
//! KiCad expects every scalar as a string, booleans spelled `"True"` /
//! `"False"`, and part fields as `{"value": ..., "visible": ...}` objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Category, Part, PartListing};

// ---------------------------------------------------------------------------
// Fixed fields
// ---------------------------------------------------------------------------

/// A field KiCad always wants, backed by a dedicated part column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedField {
    pub name: &'static str,
    pub visible: bool,
}

/// Column-backed fields, in emission order. Custom fields with these names
/// (case-insensitive) are ignored.
pub const FIXED_FIELDS: &[FixedField] = &[
    FixedField {
        name: "footprint",
        visible: false,
    },
    FixedField {
        name: "datasheet",
        visible: false,
    },
    FixedField {
        name: "value",
        visible: true,
    },
    FixedField {
        name: "reference",
        visible: true,
    },
    FixedField {
        name: "description",
        visible: false,
    },
    FixedField {
        name: "keywords",
        visible: false,
    },
];

pub fn is_fixed_field(name: &str) -> bool {
    FIXED_FIELDS.iter().any(|f| f.name.eq_ignore_ascii_case(name))
}

fn fixed_value<'a>(part: &'a Part, name: &str) -> Option<&'a str> {
    match name {
        "footprint" => Some(part.footprint.as_str()),
        "datasheet" => part.datasheet.as_deref(),
        "value" => Some(part.value.as_str()),
        "reference" => Some(part.reference.as_str()),
        "description" => part.description.as_deref(),
        "keywords" => part.keywords.as_deref(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Booleans and values
// ---------------------------------------------------------------------------

pub fn bool_str(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

/// Coerce a loosely-typed JSON flag into KiCad's `"True"` / `"False"`.
pub fn kicad_bool(v: &Value) -> &'static str {
    match v {
        Value::Bool(b) => bool_str(*b),
        Value::String(s) => {
            let s = s.to_ascii_lowercase();
            bool_str(matches!(s.as_str(), "1" | "true" | "yes" | "y"))
        }
        Value::Number(n) => bool_str(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => "False",
    }
}

/// Stringify a custom field value. `null` becomes the empty string.
pub fn value_str(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => bool_str(*b).to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// `GET /`: KiCad only validates the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoot {
    pub categories: String,
    pub parts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
}

impl From<&Category> for CategorySummary {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&PartListing> for PartSummary {
    fn from(p: &PartListing) -> Self {
        let id = p.sequence_number.to_string();
        let name = if p.name.is_empty() {
            id.clone()
        } else {
            p.name.clone()
        };
        Self {
            id,
            name,
            description: p.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: String,
    pub visible: String,
}

impl FieldValue {
    pub fn new(value: impl Into<String>, visible: bool) -> Self {
        Self {
            value: value.into(),
            visible: bool_str(visible).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetail {
    pub id: String,
    pub name: String,
    #[serde(rename = "symbolIdStr")]
    pub symbol_id_str: String,
    pub exclude_from_bom: String,
    pub exclude_from_board: String,
    pub exclude_from_sim: String,
    /// Fixed fields first, in [`FIXED_FIELDS`] order, then custom fields in
    /// stored order.
    pub fields: IndexMap<String, FieldValue>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Convert a stored part to the detail object KiCad expects.
pub fn render_part(part: &Part) -> PartDetail {
    let mut fields = IndexMap::new();

    for f in FIXED_FIELDS {
        let value = fixed_value(part, f.name).unwrap_or_default();
        fields.insert(f.name.to_string(), FieldValue::new(value, f.visible));
    }

    for (key, raw) in &part.fields {
        if is_fixed_field(key) {
            continue;
        }
        match raw {
            Value::String(s) => {
                fields.insert(key.clone(), FieldValue::new(s.clone(), false));
            }
            Value::Object(obj) if obj.contains_key("value") => {
                let value = obj.get("value").map(value_str).unwrap_or_default();
                let visible = obj.get("visible").map(kicad_bool).unwrap_or("False");
                fields.insert(
                    key.clone(),
                    FieldValue {
                        value,
                        visible: visible.to_string(),
                    },
                );
            }
            _ => {}
        }
    }

    let id = part.sequence_number.to_string();
    let name = if part.name.is_empty() {
        id.clone()
    } else {
        part.name.clone()
    };

    PartDetail {
        id,
        name,
        symbol_id_str: part.symbol_id.clone(),
        exclude_from_bom: bool_str(part.exclude_from_bom).to_string(),
        exclude_from_board: bool_str(part.exclude_from_board).to_string(),
        exclude_from_sim: bool_str(part.exclude_from_sim).to_string(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomFields;
    use chrono::Utc;
    use serde_json::json;

    fn test_part() -> Part {
        let now = Utc::now();
        Part {
            sequence_number: 1,
            name: "10uF_X5R_16V-00001".into(),
            category_id: 1,
            value: "10uF".into(),
            reference: "C?".into(),
            footprint: "Capacitor_SMD:C_0805_2012Metric".into(),
            symbol_id: "Device:C".into(),
            description: Some("10uF 16V X5R 0805".into()),
            datasheet: Some(
                "https://search.murata.co.jp/Ceramy/image/img/A01X/G101/ENG/GRM21BR61C106KE15-01.pdf"
                    .into(),
            ),
            keywords: Some("capacitor 10uF X5R 16V".into()),
            fields: CustomFields::new(),
            exclude_from_bom: false,
            exclude_from_board: false,
            exclude_from_sim: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn with_fields(v: Value) -> Part {
        let mut p = test_part();
        p.fields = v.as_object().cloned().unwrap();
        p
    }

    #[test]
    fn minimal_part_renders_fixed_fields() {
        let detail = render_part(&test_part());
        let got = serde_json::to_value(&detail).unwrap();
        let want = json!({
            "id": "1",
            "name": "10uF_X5R_16V-00001",
            "symbolIdStr": "Device:C",
            "exclude_from_bom": "False",
            "exclude_from_board": "False",
            "exclude_from_sim": "False",
            "fields": {
                "datasheet": {
                    "value": "https://search.murata.co.jp/Ceramy/image/img/A01X/G101/ENG/GRM21BR61C106KE15-01.pdf",
                    "visible": "False"
                },
                "description": {"value": "10uF 16V X5R 0805", "visible": "False"},
                "footprint": {"value": "Capacitor_SMD:C_0805_2012Metric", "visible": "False"},
                "keywords": {"value": "capacitor 10uF X5R 16V", "visible": "False"},
                "reference": {"value": "C?", "visible": "True"},
                "value": {"value": "10uF", "visible": "True"}
            }
        });
        assert_eq!(got, want);
    }

    #[test]
    fn fields_keep_fixed_then_stored_order() {
        let detail = render_part(&with_fields(json!({
            "Zeta": "last letter",
            "Alpha": {"value": "first letter", "visible": true},
        })));
        let json = serde_json::to_value(&detail).unwrap();
        let keys: Vec<&str> = json["fields"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            [
                "footprint",
                "datasheet",
                "value",
                "reference",
                "description",
                "keywords",
                "Zeta",
                "Alpha"
            ]
        );

        let text = serde_json::to_string(&detail).unwrap();
        let footprint = text.find("\"footprint\"").unwrap();
        let zeta = text.find("\"Zeta\"").unwrap();
        let alpha = text.find("\"Alpha\"").unwrap();
        assert!(footprint < zeta && zeta < alpha);
    }

    #[test]
    fn plain_string_custom_field_is_hidden() {
        let detail = render_part(&with_fields(json!({"Manufacturer": "Murata"})));
        assert_eq!(
            detail.fields["Manufacturer"],
            FieldValue::new("Murata", false)
        );
    }

    #[test]
    fn object_custom_field_keeps_visibility() {
        let detail = render_part(&with_fields(json!({
            "Manufacturer": "Murata",
            "Voltage": {"value": "16V", "visible": true},
        })));
        assert_eq!(detail.fields["Voltage"], FieldValue::new("16V", true));
        assert_eq!(
            detail.fields["Manufacturer"],
            FieldValue::new("Murata", false)
        );
    }

    #[test]
    fn object_custom_field_hidden() {
        let detail = render_part(&with_fields(json!({
            "Voltage": {"value": "16V", "visible": false},
        })));
        assert_eq!(detail.fields["Voltage"], FieldValue::new("16V", false));
    }

    #[test]
    fn custom_fields_never_override_fixed_fields() {
        let detail = render_part(&with_fields(json!({
            "Footprint": {"value": "Other:Footprint", "visible": "True"},
            "value": "999uF",
            "Extra": "kept",
        })));
        assert_eq!(
            detail.fields["footprint"],
            FieldValue::new("Capacitor_SMD:C_0805_2012Metric", false)
        );
        assert_eq!(detail.fields["value"], FieldValue::new("10uF", true));
        assert!(!detail.fields.contains_key("Footprint"));
        assert_eq!(detail.fields["Extra"], FieldValue::new("kept", false));
    }

    #[test]
    fn unsupported_custom_values_are_dropped() {
        let detail = render_part(&with_fields(json!({
            "Pins": 8,
            "NoValue": {"visible": true},
            "List": ["a", "b"],
        })));
        assert!(!detail.fields.contains_key("Pins"));
        assert!(!detail.fields.contains_key("NoValue"));
        assert!(!detail.fields.contains_key("List"));
        assert_eq!(detail.fields.len(), FIXED_FIELDS.len());
    }

    #[test]
    fn object_values_are_stringified() {
        let detail = render_part(&with_fields(json!({
            "Pins": {"value": 8, "visible": "yes"},
            "Missing": {"value": null},
            "Rohs": {"value": true, "visible": 0},
        })));
        assert_eq!(detail.fields["Pins"], FieldValue::new("8", true));
        assert_eq!(detail.fields["Missing"], FieldValue::new("", false));
        assert_eq!(detail.fields["Rohs"], FieldValue::new("True", false));
    }

    #[test]
    fn absent_optional_columns_render_empty() {
        let mut p = test_part();
        p.description = None;
        p.datasheet = None;
        p.keywords = None;
        let detail = render_part(&p);
        assert_eq!(detail.fields["description"].value, "");
        assert_eq!(detail.fields["datasheet"].value, "");
        assert_eq!(detail.fields["keywords"].value, "");
    }

    #[test]
    fn empty_name_falls_back_to_id() {
        let mut p = test_part();
        p.name = String::new();
        p.sequence_number = 42;
        assert_eq!(render_part(&p).name, "42");
    }

    #[test]
    fn exclude_flags_render_as_strings() {
        let mut p = test_part();
        p.exclude_from_bom = true;
        p.exclude_from_sim = true;
        let d = render_part(&p);
        assert_eq!(d.exclude_from_bom, "True");
        assert_eq!(d.exclude_from_board, "False");
        assert_eq!(d.exclude_from_sim, "True");
    }

    #[test]
    fn kicad_bool_coercions() {
        assert_eq!(kicad_bool(&json!("TRUE")), "True");
        assert_eq!(kicad_bool(&json!("y")), "True");
        assert_eq!(kicad_bool(&json!("1")), "True");
        assert_eq!(kicad_bool(&json!("no")), "False");
        assert_eq!(kicad_bool(&json!(1)), "True");
        assert_eq!(kicad_bool(&json!(0)), "False");
        assert_eq!(kicad_bool(&json!(false)), "False");
        assert_eq!(kicad_bool(&Value::Null), "False");
    }

    #[test]
    fn part_summary_falls_back_on_empty_values() {
        let s = PartSummary::from(&PartListing {
            sequence_number: 3,
            name: String::new(),
            description: None,
        });
        assert_eq!(s.id, "3");
        assert_eq!(s.name, "3");
        assert_eq!(s.description, "");
    }

    #[test]
    fn api_root_keys() {
        let v = serde_json::to_value(ApiRoot::default()).unwrap();
        assert_eq!(v, json!({"categories": "", "parts": ""}));
    }
}
