pub mod health;
pub mod kicad;
