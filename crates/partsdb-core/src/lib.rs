pub mod config;
pub mod error;
pub mod io;
pub mod kicad;
pub mod library;
pub mod schema;
pub mod seed;
pub mod store;
pub mod types;

pub use error::{PartsError, Result};
