// Relational store: schema setup and the JSON → SQLite loader.

pub mod loader;
pub mod schema;
