//! Sample data for a freshly bootstrapped database.

use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::store::PartStore;
use crate::types::{CustomFields, NewCategory, NewPart};

pub const SAMPLE_CATEGORY: &str = "Capacitors (0805)";
pub const SAMPLE_PART: &str = "10uF_X5R_16V-00001";

/// What a seed run created. Ids are those of the rows used, new or existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub category_id: i32,
    pub category_created: bool,
    pub part_id: i32,
    pub part_created: bool,
}

fn sample_fields() -> CustomFields {
    let v = json!({
        "Manufacturer": "Murata",
        "MPN": "GRM21BR61C106KE15L",
        "LCSC": "C15850",
        "Voltage": {"value": "16V", "visible": true},
        "Dielectric": {"value": "X5R", "visible": true},
        "Tolerance": "±10%",
        "ESR": {"value": "—", "visible": false},
    });
    match v {
        serde_json::Value::Object(map) => map,
        _ => CustomFields::new(),
    }
}

pub fn sample_part(category_id: i32) -> NewPart {
    NewPart {
        name: SAMPLE_PART.to_string(),
        category_id,
        value: "10uF".to_string(),
        footprint: "Capacitor_SMD:C_0805_2012Metric".to_string(),
        symbol_id: "Device:C".to_string(),
        description: Some("10uF 16V X5R 0805".to_string()),
        datasheet: Some(
            "https://search.murata.co.jp/Ceramy/image/img/A01X/G101/ENG/GRM21BR61C106KE15-01.pdf"
                .to_string(),
        ),
        fields: sample_fields(),
        ..Default::default()
    }
}

/// Insert the sample category and part unless the tables already hold rows.
/// Safe to run on every container start.
pub async fn seed(store: &dyn PartStore) -> Result<SeedReport> {
    let (category, category_created) = match store.first_category().await? {
        Some(c) => (c, false),
        None => (
            store.insert_category(NewCategory::new(SAMPLE_CATEGORY)).await?,
            true,
        ),
    };

    let (part, part_created) = match store.first_part().await? {
        Some(p) => (p, false),
        None => (store.insert_part(sample_part(category.id)).await?, true),
    };

    tracing::info!(
        category_id = category.id,
        category_created,
        part_id = part.sequence_number,
        part_created,
        "seed complete"
    );

    Ok(SeedReport {
        category_id: category.id,
        category_created,
        part_id: part.sequence_number,
        part_created,
    })
}
