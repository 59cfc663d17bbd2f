use super::{block_on, connect, Context};
use crate::output::print_json;
use anyhow::Result;
use clap::Subcommand;
use partsdb_core::store::PartStore;
use partsdb_core::types::{Category, NewCategory};

#[derive(Subcommand)]
pub enum CategorySubcommand {
    /// Create a category
    Add {
        /// Display name shown in KiCad's library browser
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Hide a category from KiCad (its parts stay resolvable by id)
    Retire { id: i32 },

    /// Make a retired category visible again
    Restore { id: i32 },
}

pub fn run(ctx: &Context, subcmd: CategorySubcommand) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        let category = apply(&store, subcmd).await?;
        if ctx.json {
            print_json(&category)
        } else {
            println!(
                "Category {} '{}' ({})",
                category.id,
                category.display_name,
                if category.is_active { "active" } else { "retired" }
            );
            Ok(())
        }
    })
}

async fn apply(store: &dyn PartStore, subcmd: CategorySubcommand) -> Result<Category> {
    let category = match subcmd {
        CategorySubcommand::Add { name, description } => {
            store
                .insert_category(NewCategory {
                    display_name: name,
                    description,
                })
                .await?
        }
        CategorySubcommand::Retire { id } => store.set_category_active(id, false).await?,
        CategorySubcommand::Restore { id } => store.set_category_active(id, true).await?,
    };
    Ok(category)
}
