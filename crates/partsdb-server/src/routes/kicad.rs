use axum::extract::{Path, State};
use axum::Json;
use partsdb_core::kicad::{self, ApiRoot, CategorySummary, PartDetail, PartSummary};

use crate::error::AppError;
use crate::state::AppState;

/// Parse a `{id}.json` path segment.
fn parse_json_id(segment: &str) -> Result<i32, AppError> {
    segment
        .strip_suffix(".json")
        .and_then(|id| id.parse::<i32>().ok())
        .ok_or_else(|| AppError::bad_request(segment))
}

/// GET /kicad-api/v1/ : KiCad only validates the keys here.
pub async fn index() -> Json<ApiRoot> {
    Json(ApiRoot::default())
}

/// GET /kicad-api/v1/categories.json
pub async fn list_categories(
    State(app): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let categories = app.store.list_categories(false).await?;
    Ok(Json(categories.iter().map(CategorySummary::from).collect()))
}

/// GET /kicad-api/v1/parts/category/{cid}.json
pub async fn parts_for_category(
    State(app): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Vec<PartSummary>>, AppError> {
    let category_id = parse_json_id(&segment)?;
    let parts = app.store.parts_in_category(category_id).await?;
    tracing::debug!(category_id, count = parts.len(), "listed parts");
    Ok(Json(parts.iter().map(PartSummary::from).collect()))
}

/// GET /kicad-api/v1/parts/{pid}.json
pub async fn part_detail(
    State(app): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<PartDetail>, AppError> {
    let id = parse_json_id(&segment)?;
    let part = app.store.get_part(id).await?;
    Ok(Json(kicad::render_part(&part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsdb_core::store::{MemoryStore, PartStore};
    use partsdb_core::types::NewCategory;
    use std::sync::Arc;

    #[test]
    fn parses_json_suffixed_ids() {
        assert_eq!(parse_json_id("12.json").unwrap(), 12);
        assert!(parse_json_id("12").is_err());
        assert!(parse_json_id("abc.json").is_err());
        assert!(parse_json_id(".json").is_err());
    }

    #[tokio::test]
    async fn list_categories_hides_inactive() {
        let store = Arc::new(MemoryStore::new());
        store.insert_category(NewCategory::new("B")).await.unwrap();
        let a = store.insert_category(NewCategory::new("A")).await.unwrap();
        store.set_category_active(a.id, false).await.unwrap();

        let app = AppState::new(store);
        let Json(list) = list_categories(State(app)).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "B");
    }

    #[tokio::test]
    async fn part_detail_unknown_is_err() {
        let app = AppState::new(Arc::new(MemoryStore::new()));
        let result = part_detail(State(app), Path("5.json".to_string())).await;
        assert!(result.is_err());
    }
}
