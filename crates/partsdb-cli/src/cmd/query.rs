use super::{block_on, connect, Context};
use crate::output::{print_json, print_table};
use anyhow::Result;
use partsdb_core::kicad::{self, CategorySummary, PartSummary};
use partsdb_core::store::PartStore;

pub fn categories(ctx: &Context, include_inactive: bool) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        let list = store.list_categories(include_inactive).await?;
        if ctx.json {
            let summaries: Vec<CategorySummary> = list.iter().map(CategorySummary::from).collect();
            return print_json(&summaries);
        }
        if list.is_empty() {
            println!("No categories.");
            return Ok(());
        }
        let rows = list
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.display_name.clone(),
                    if c.is_active { "yes" } else { "no" }.to_string(),
                    c.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["ID", "NAME", "ACTIVE", "DESCRIPTION"], rows);
        Ok(())
    })
}

pub fn parts(ctx: &Context, category_id: i32) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        // Surface a typo'd category id instead of printing an empty table.
        store.get_category(category_id).await?;
        let list = store.parts_in_category(category_id).await?;
        let summaries: Vec<PartSummary> = list.iter().map(PartSummary::from).collect();
        if ctx.json {
            return print_json(&summaries);
        }
        if summaries.is_empty() {
            println!("No active parts in category {category_id}.");
            return Ok(());
        }
        let rows = summaries
            .into_iter()
            .map(|p| vec![p.id, p.name, p.description])
            .collect();
        print_table(&["ID", "NAME", "DESCRIPTION"], rows);
        Ok(())
    })
}

/// Always JSON: this is exactly what KiCad receives.
pub fn show(ctx: &Context, part_id: i32) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        let part = store.get_part(part_id).await?;
        if !part.is_active {
            tracing::warn!(part_id, "part is inactive and hidden from category listings");
        }
        print_json(&kicad::render_part(&part))
    })
}
