//! Per-library part tables for KiCad *database libraries* (`.kicad_dbl`).
//!
//! Each library is one SQL table. Columns are declared as KiCad fields,
//! KiCad properties or plain SQL columns; the declarations drive both the
//! DDL and the `.kicad_dbl` document KiCad reads over ODBC.
//!
//! See <https://docs.kicad.org/master/en/eeschema/eeschema_advanced.html#database-libraries>.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PartsError, Result};

// ---------------------------------------------------------------------------
// Column declarations
// ---------------------------------------------------------------------------

/// Symbol properties KiCad can take from a database column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    Value,
    Description,
    Datasheet,
    Keywords,
    FootprintFilters,
    ExcludeFromBom,
    ExcludeFromBoard,
    ExcludeFromSim,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Value => "value",
            PropertyKind::Description => "description",
            PropertyKind::Datasheet => "datasheet",
            PropertyKind::Keywords => "keywords",
            PropertyKind::FootprintFilters => "footprint_filters",
            PropertyKind::ExcludeFromBom => "exclude_from_bom",
            PropertyKind::ExcludeFromBoard => "exclude_from_board",
            PropertyKind::ExcludeFromSim => "exclude_from_sim",
        }
    }

    /// Exclusion flags are stored as booleans, everything else as text.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            PropertyKind::ExcludeFromBom
                | PropertyKind::ExcludeFromBoard
                | PropertyKind::ExcludeFromSim
        )
    }

    /// Value and datasheet are symbol fields in the `.kicad_dbl` format, not
    /// entries of the `properties` map.
    fn dbl_field_name(self) -> Option<&'static str> {
        match self {
            PropertyKind::Value => Some("Value"),
            PropertyKind::Datasheet => Some("Datasheet"),
            _ => None,
        }
    }
}

/// A KiCad symbol field backed by a text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub visible_on_add: bool,
    pub visible_in_chooser: bool,
    pub show_name: bool,
    pub inherit_properties: bool,
    /// SQL expression template; `{prefix}` is replaced by the quoted prefix.
    pub computed: Option<&'static str>,
}

impl FieldSpec {
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            visible_on_add: false,
            visible_in_chooser: false,
            show_name: false,
            inherit_properties: false,
            computed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Field(FieldSpec),
    Property(PropertyKind),
    Plain {
        sql_type: &'static str,
        default: Option<&'static str>,
        primary_key: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub description: &'static str,
}

impl Column {
    fn field(name: &'static str, spec: FieldSpec, description: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Field(spec),
            description,
        }
    }

    fn property(name: &'static str, which: PropertyKind, description: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Property(which),
            description,
        }
    }

    fn plain(
        name: &'static str,
        sql_type: &'static str,
        default: Option<&'static str>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ColumnKind::Plain {
                sql_type,
                default,
                primary_key: false,
            },
            description,
        }
    }

    /// Column definition line for `CREATE TABLE`.
    fn sql_definition(&self, prefix: &str) -> String {
        match &self.kind {
            ColumnKind::Plain {
                sql_type,
                default,
                primary_key,
            } => {
                let mut def = format!("{} {}", self.name, sql_type);
                if *primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                if let Some(d) = default {
                    def.push_str(" DEFAULT ");
                    def.push_str(d);
                }
                def
            }
            ColumnKind::Field(spec) => match spec.computed {
                Some(template) => {
                    let expr = template.replace("{prefix}", &quote_literal(prefix));
                    format!("{} TEXT GENERATED ALWAYS AS ({expr}) STORED", self.name)
                }
                None => format!("{} TEXT DEFAULT ''", self.name),
            },
            ColumnKind::Property(which) if which.is_flag() => {
                format!("{} BOOLEAN NOT NULL DEFAULT FALSE", self.name)
            }
            ColumnKind::Property(_) => format!("{} TEXT DEFAULT ''", self.name),
        }
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Library definitions
// ---------------------------------------------------------------------------

pub const KEY_COLUMN: &str = "part_number";
pub const SYMBOLS_COLUMN: &str = "symbol";
pub const FOOTPRINTS_COLUMN: &str = "footprint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Name shown in KiCad's symbol chooser.
    pub name: &'static str,
    pub table: &'static str,
    /// Part number prefix, e.g. `RES` in `RES-00042`.
    pub prefix: &'static str,
    pub columns: Vec<Column>,
}

const PART_NUMBER_EXPR: &str = "{prefix} || '-' || LPAD(sequence_number::TEXT, 5, '0')";

/// Columns shared by every library table.
pub fn base_columns() -> Vec<Column> {
    vec![
        Column {
            name: "sequence_number",
            kind: ColumnKind::Plain {
                sql_type: "SERIAL",
                default: None,
                primary_key: true,
            },
            description: "Sequence number of the component",
        },
        Column::field(
            KEY_COLUMN,
            FieldSpec {
                visible_in_chooser: true,
                computed: Some(PART_NUMBER_EXPR),
                ..FieldSpec::named("Part Number")
            },
            "Part number of the component",
        ),
        Column::plain(SYMBOLS_COLUMN, "TEXT", None, "Symbol of the component"),
        Column::plain(
            FOOTPRINTS_COLUMN,
            "TEXT",
            Some("'TBD'"),
            "Footprint of the component",
        ),
        Column::property("value", PropertyKind::Value, "Value of the component"),
        Column::property(
            "description",
            PropertyKind::Description,
            "Description of the component",
        ),
        Column::property(
            "datasheet",
            PropertyKind::Datasheet,
            "URL to the datasheet of the component",
        ),
        Column::property(
            "keywords",
            PropertyKind::Keywords,
            "Type of the component. Formatted as a path, like typeA/typeB",
        ),
        Column::property(
            "exclude_from_bom",
            PropertyKind::ExcludeFromBom,
            "Exclude from BOM",
        ),
        Column::field(
            "step_model",
            FieldSpec::named("Step Model"),
            "Step model for the component",
        ),
        Column::field(
            "package_type",
            FieldSpec {
                visible_in_chooser: true,
                inherit_properties: true,
                ..FieldSpec::named("Package Type")
            },
            "Human readable package type for the component, like QFNnn, TQFPnn, etc.",
        ),
        Column::plain(
            "number_of_pins",
            "INTEGER",
            None,
            "Number of pins for the component",
        ),
        Column::plain("series", "TEXT", Some("''"), "Series of the component"),
        Column::plain("manufacturer_name", "TEXT", None, "Manufacturer name"),
        Column::plain(
            "manufacturer_part_number",
            "TEXT",
            None,
            "Manufacturer's part number of the component",
        ),
    ]
}

fn library(
    name: &'static str,
    table: &'static str,
    prefix: &'static str,
    fields: &[(&'static str, &'static str, &'static str)],
) -> Library {
    let mut columns = base_columns();
    columns.extend(
        fields
            .iter()
            .map(|&(column, field, description)| {
                Column::field(column, FieldSpec::named(field), description)
            }),
    );
    Library {
        name,
        table,
        prefix,
        columns,
    }
}

/// All libraries, ordered by display name.
pub fn libraries() -> Vec<Library> {
    vec![
        library(
            "Capacitors",
            "capacitors",
            "CAP",
            &[
                ("voltage_rating", "Voltage", "Voltage rating of the capacitor"),
                ("tolerance", "Tolerance", "Tolerance of the capacitor"),
                ("dielectric", "Dielectric", "Dielectric of the capacitor"),
            ],
        ),
        library(
            "Connectors",
            "connectors",
            "CON",
            &[
                ("connector_type", "Type", "Type of connector"),
                ("pitch", "Pitch", "Pitch of the connector"),
            ],
        ),
        library(
            "Crystals and Oscillators",
            "crystals_oscillators",
            "XTL",
            &[
                ("accuracy", "Accuracy", "Accuracy of the crystal or oscillator"),
                (
                    "load_capacitance",
                    "Load Capacitance",
                    "Load capacitance of the crystal or oscillator",
                ),
            ],
        ),
        library(
            "Diodes",
            "diodes",
            "DIO",
            &[
                ("diode_type", "Type", "Type of diode"),
                ("reverse_voltage", "Reverse Voltage", "Reverse voltage of the diode"),
                ("forward_current", "Forward Current", "Forward current of the diode"),
            ],
        ),
        library(
            "ICs",
            "ics",
            "IC",
            &[("ic_type", "IC Type", "Type of IC")],
        ),
        library(
            "Inductors",
            "inductors",
            "IND",
            &[
                ("current_rating", "Current Rating", "Current rating of the inductor"),
                ("dc_resistance", "DC Resistance", "DC resistance of the inductor"),
            ],
        ),
        library(
            "Mechanical",
            "mechanical",
            "MECH",
            &[("mechanical_type", "Type", "Type of mechanical part")],
        ),
        library(
            "Misc",
            "misc",
            "MIS",
            &[("misc_type", "Type", "Type of misc part")],
        ),
        library(
            "Relays",
            "relays",
            "RLY",
            &[
                ("relay_type", "Type", "Type of relay"),
                ("coil_voltage", "Voltage", "Coil voltage of the relay"),
                ("contact_rating", "Current", "Contact rating of the relay"),
            ],
        ),
        library(
            "Resistors",
            "resistors",
            "RES",
            &[
                ("power_rating", "Power", "Power rating of the resistor in watts"),
                ("tolerance", "Tolerance", "Tolerance of the resistor"),
            ],
        ),
        library(
            "Switches",
            "switches",
            "SW",
            &[
                ("switch_type", "Type", "Type of switch"),
                ("current_rating", "Current", "Current rating of the switch"),
                ("voltage_rating", "Voltage", "Voltage rating of the switch"),
            ],
        ),
        library(
            "Transformers",
            "transformers",
            "XFR",
            &[
                ("transformer_type", "Type", "Type of transformer"),
                ("power_rating", "Power", "Power rating of the transformer"),
            ],
        ),
        library(
            "Transistors",
            "transistors",
            "XTR",
            &[
                ("transistor_type", "Type", "Type of transistor"),
                (
                    "current",
                    "Current",
                    "Collector current or drain current of the transistor",
                ),
                (
                    "voltage",
                    "Voltage",
                    "Collector emitter or drain source voltage of the transistor",
                ),
            ],
        ),
    ]
}

/// Find a library by table name, prefix or display name (case-insensitive).
pub fn find_library(key: &str) -> Result<Library> {
    libraries()
        .into_iter()
        .find(|l| {
            l.table.eq_ignore_ascii_case(key)
                || l.prefix.eq_ignore_ascii_case(key)
                || l.name.eq_ignore_ascii_case(key)
        })
        .ok_or_else(|| PartsError::UnknownLibrary(key.to_string()))
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap())
}

pub fn validate_identifier(ident: &str) -> Result<()> {
    if ident.len() > 63 || !ident_re().is_match(ident) {
        return Err(PartsError::InvalidIdentifier(ident.to_string()));
    }
    Ok(())
}

impl Library {
    /// Check table and column names before they are spliced into SQL.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(self.table)?;
        for c in &self.columns {
            validate_identifier(c.name)?;
        }
        Ok(())
    }

    /// `CREATE TABLE IF NOT EXISTS` plus column comments.
    pub fn create_table_sql(&self) -> Result<String> {
        self.validate()?;
        let defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.sql_definition(self.prefix)))
            .collect();
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
            self.table,
            defs.join(",\n")
        );
        for c in self.columns.iter().filter(|c| !c.description.is_empty()) {
            sql.push_str(&format!(
                "COMMENT ON COLUMN {}.{} IS {};\n",
                self.table,
                c.name,
                quote_literal(c.description)
            ));
        }
        Ok(sql)
    }

    fn dbl_entry(&self) -> DblLibrary {
        let mut fields = Vec::new();
        let mut properties = BTreeMap::new();
        for c in &self.columns {
            match &c.kind {
                ColumnKind::Field(spec) => fields.push(DblField {
                    column: c.name.to_string(),
                    name: spec.name.to_string(),
                    visible_on_add: spec.visible_on_add,
                    visible_in_chooser: spec.visible_in_chooser,
                    show_name: spec.show_name,
                    inherit_properties: spec.inherit_properties,
                }),
                ColumnKind::Property(which) => match which.dbl_field_name() {
                    Some(name) => fields.push(DblField {
                        column: c.name.to_string(),
                        name: name.to_string(),
                        visible_on_add: *which == PropertyKind::Value,
                        visible_in_chooser: false,
                        show_name: false,
                        inherit_properties: false,
                    }),
                    None => {
                        properties.insert(which.as_str().to_string(), c.name.to_string());
                    }
                },
                ColumnKind::Plain { .. } => {}
            }
        }
        DblLibrary {
            name: self.name.to_string(),
            table: self.table.to_string(),
            key: KEY_COLUMN.to_string(),
            symbols: SYMBOLS_COLUMN.to_string(),
            footprints: FOOTPRINTS_COLUMN.to_string(),
            fields,
            properties,
        }
    }
}

/// DDL for every library, in order.
pub fn create_all_sql(libs: &[Library]) -> Result<String> {
    let parts: Result<Vec<String>> = libs.iter().map(Library::create_table_sql).collect();
    Ok(parts?.join("\n"))
}

// ---------------------------------------------------------------------------
// .kicad_dbl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblMeta {
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub dsn: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u32,
    pub connection_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblField {
    pub column: String,
    pub name: String,
    pub visible_on_add: bool,
    pub visible_in_chooser: bool,
    pub show_name: bool,
    pub inherit_properties: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblLibrary {
    pub name: String,
    pub table: String,
    pub key: String,
    pub symbols: String,
    pub footprints: String,
    pub fields: Vec<DblField>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DblDocument {
    pub meta: DblMeta,
    pub name: String,
    pub description: String,
    pub source: DblSource,
    pub libraries: Vec<DblLibrary>,
}

/// Connection and naming details for a generated `.kicad_dbl`.
#[derive(Debug, Clone, PartialEq)]
pub struct DblOptions {
    pub name: String,
    pub description: String,
    /// ODBC data source name; ignored by KiCad when `connection_string` is set.
    pub dsn: String,
    pub username: String,
    pub password: String,
    pub connection_string: String,
    pub timeout_seconds: u32,
}

impl Default for DblOptions {
    fn default() -> Self {
        Self {
            name: "Parts Database".to_string(),
            description: "Parts from the partsdb PostgreSQL database".to_string(),
            dsn: String::new(),
            username: String::new(),
            password: String::new(),
            connection_string: String::new(),
            timeout_seconds: 2,
        }
    }
}

pub fn kicad_dbl(libs: &[Library], options: &DblOptions) -> Result<DblDocument> {
    for lib in libs {
        lib.validate()?;
    }
    Ok(DblDocument {
        meta: DblMeta { version: 0 },
        name: options.name.clone(),
        description: options.description.clone(),
        source: DblSource {
            kind: "odbc".to_string(),
            dsn: options.dsn.clone(),
            username: options.username.clone(),
            password: options.password.clone(),
            timeout_seconds: options.timeout_seconds,
            connection_string: options.connection_string.clone(),
        },
        libraries: libs.iter().map(Library::dbl_entry).collect(),
    })
}

// ---------------------------------------------------------------------------
// .kicad_httplib
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLibMeta {
    pub version: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLibSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub api_version: String,
    pub root_url: String,
    pub token: String,
    pub timeout_parts_seconds: u32,
    pub timeout_categories_seconds: u32,
}

/// Descriptor that points KiCad's HTTP library type at this server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLibDocument {
    pub meta: HttpLibMeta,
    pub name: String,
    pub description: String,
    pub source: HttpLibSource,
}

/// `root_url` is the server base without the version segment; KiCad appends
/// `/v1/` itself.
pub fn kicad_httplib(
    name: &str,
    description: &str,
    root_url: &str,
    token: Option<&str>,
) -> HttpLibDocument {
    HttpLibDocument {
        meta: HttpLibMeta { version: 1.0 },
        name: name.to_string(),
        description: description.to_string(),
        source: HttpLibSource {
            kind: "REST_API".to_string(),
            api_version: "v1".to_string(),
            root_url: root_url.trim_end_matches('/').to_string(),
            token: token.unwrap_or_default().to_string(),
            timeout_parts_seconds: 60,
            timeout_categories_seconds: 600,
        },
    }
}
