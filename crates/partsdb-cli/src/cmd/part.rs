use super::{block_on, connect, Context};
use crate::output::print_json;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use partsdb_core::store::PartStore;
use partsdb_core::types::{CustomFields, NewPart, Part, PartUpdate, DEFAULT_REFERENCE};

#[derive(Subcommand)]
pub enum PartSubcommand {
    /// Create a part
    Add(AddArgs),

    /// Change columns of an existing part (the name is fixed once assigned)
    Set(SetArgs),

    /// Hide a part from category listings; it still resolves by id
    Retire { id: i32 },

    /// Return a retired part to its category listing
    Restore { id: i32 },
}

#[derive(Args)]
pub struct AddArgs {
    /// Category the part belongs to
    #[arg(long)]
    pub category: i32,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub value: String,
    /// Footprint, e.g. Resistor_SMD:R_0805_2012Metric
    #[arg(long)]
    pub footprint: String,
    /// Symbol, e.g. Device:R
    #[arg(long)]
    pub symbol: String,
    #[arg(long, default_value = DEFAULT_REFERENCE)]
    pub reference: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub datasheet: Option<String>,
    #[arg(long, default_value = "")]
    pub keywords: String,
    /// Hidden custom field, repeatable
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
    #[arg(long)]
    pub exclude_from_bom: bool,
    #[arg(long)]
    pub exclude_from_board: bool,
    #[arg(long)]
    pub exclude_from_sim: bool,
}

#[derive(Args)]
pub struct SetArgs {
    pub id: i32,
    /// Move the part to another category
    #[arg(long)]
    pub category: Option<i32>,
    #[arg(long)]
    pub value: Option<String>,
    #[arg(long)]
    pub reference: Option<String>,
    #[arg(long)]
    pub footprint: Option<String>,
    #[arg(long)]
    pub symbol: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long, conflicts_with = "clear_datasheet")]
    pub datasheet: Option<String>,
    #[arg(long)]
    pub clear_datasheet: bool,
    #[arg(long, conflicts_with = "clear_keywords")]
    pub keywords: Option<String>,
    #[arg(long)]
    pub clear_keywords: bool,
    /// Replace all custom fields with this JSON object
    #[arg(long, value_name = "JSON")]
    pub fields: Option<String>,
    #[arg(long)]
    pub exclude_from_bom: Option<bool>,
    #[arg(long)]
    pub exclude_from_board: Option<bool>,
    #[arg(long)]
    pub exclude_from_sim: Option<bool>,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// `Some(None)` clears, `Some(Some(v))` sets, `None` leaves alone.
fn nullable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

impl AddArgs {
    fn into_new_part(self) -> NewPart {
        let mut fields = CustomFields::new();
        for (k, v) in self.fields {
            fields.insert(k, serde_json::Value::String(v));
        }
        NewPart {
            name: self.name,
            category_id: self.category,
            value: self.value,
            reference: self.reference,
            footprint: self.footprint,
            symbol_id: self.symbol,
            description: self.description,
            datasheet: self.datasheet,
            keywords: Some(self.keywords),
            fields,
            exclude_from_bom: self.exclude_from_bom,
            exclude_from_board: self.exclude_from_board,
            exclude_from_sim: self.exclude_from_sim,
        }
    }
}

impl SetArgs {
    fn into_update(self) -> Result<PartUpdate> {
        let fields = match self.fields {
            Some(raw) => {
                let value: serde_json::Value =
                    serde_json::from_str(&raw).context("--fields is not valid JSON")?;
                match value {
                    serde_json::Value::Object(map) => Some(map),
                    _ => anyhow::bail!("--fields must be a JSON object"),
                }
            }
            None => None,
        };
        Ok(PartUpdate {
            name: None,
            category_id: self.category,
            value: self.value,
            reference: self.reference,
            footprint: self.footprint,
            symbol_id: self.symbol,
            description: nullable(self.description, self.clear_description),
            datasheet: nullable(self.datasheet, self.clear_datasheet),
            keywords: nullable(self.keywords, self.clear_keywords),
            fields,
            exclude_from_bom: self.exclude_from_bom,
            exclude_from_board: self.exclude_from_board,
            exclude_from_sim: self.exclude_from_sim,
        })
    }
}

pub fn run(ctx: &Context, subcmd: PartSubcommand) -> Result<()> {
    block_on(async {
        let store = connect(&ctx.config).await?;
        let part = apply(&store, subcmd).await?;
        if ctx.json {
            print_json(&part)
        } else {
            println!(
                "Part {} '{}' in category {} ({})",
                part.sequence_number,
                part.name,
                part.category_id,
                if part.is_active { "active" } else { "retired" }
            );
            Ok(())
        }
    })
}

async fn apply(store: &dyn PartStore, subcmd: PartSubcommand) -> Result<Part> {
    let part = match subcmd {
        PartSubcommand::Add(args) => store.insert_part(args.into_new_part()).await?,
        PartSubcommand::Set(args) => {
            let id = args.id;
            store.update_part(id, args.into_update()?).await?
        }
        PartSubcommand::Retire { id } => store.set_part_active(id, false).await?,
        PartSubcommand::Restore { id } => store.set_part_active(id, true).await?,
    };
    Ok(part)
}
