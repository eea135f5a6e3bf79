//! Command-line support layer: graph loading from CSV pairs, JSONL vertex
//! streams, and annotation seeding.

pub mod import_export;
