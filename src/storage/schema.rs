use rusqlite::Connection;
use std::path::Path;
use tracing::{error, info};

/// Table definitions for the protocol store. Speeches carry their natural
/// string id; agenda items get an auto-increment surrogate.
const SCHEMA_SQL: &str = r#"
    PRAGMA journal_mode=WAL;
    CREATE TABLE IF NOT EXISTS sitzungen (
        sitzungs_id INTEGER PRIMARY KEY NOT NULL,
        datum       DATE NOT NULL,
        start       TIME NOT NULL,
        ende        TIME NOT NULL
    );
    CREATE TABLE IF NOT EXISTS tagesordnungspunkte (
        tagesordnungspunkt_id INTEGER PRIMARY KEY,
        name        TEXT NOT NULL,
        sitzungs_id INTEGER NOT NULL,
        FOREIGN KEY (sitzungs_id) REFERENCES sitzungen (sitzungs_id)
    );
    CREATE TABLE IF NOT EXISTS redner (
        redner_id INTEGER PRIMARY KEY NOT NULL,
        titel     TEXT,
        vorname   TEXT NOT NULL,
        nachname  TEXT NOT NULL,
        fraktion  TEXT
    );
    CREATE TABLE IF NOT EXISTS rollen (
        rollen_id    INTEGER PRIMARY KEY,
        beschreibung TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS reden (
        rede_id               TEXT PRIMARY KEY NOT NULL,
        text                  TEXT NOT NULL,
        redner_id             INTEGER NOT NULL,
        tagesordnungspunkt_id INTEGER NOT NULL,
        rollen_id             INTEGER,
        FOREIGN KEY (redner_id) REFERENCES redner (redner_id),
        FOREIGN KEY (tagesordnungspunkt_id) REFERENCES tagesordnungspunkte (tagesordnungspunkt_id),
        FOREIGN KEY (rollen_id) REFERENCES rollen (rollen_id)
    );
    CREATE TABLE IF NOT EXISTS kommentare (
        kommentar_id    INTEGER PRIMARY KEY,
        kommentar_index INTEGER NOT NULL,
        kommentator     TEXT NOT NULL,
        fraktion        TEXT NOT NULL,
        text            TEXT NOT NULL,
        rede_id         TEXT NOT NULL,
        FOREIGN KEY (rede_id) REFERENCES reden (rede_id),
        UNIQUE (kommentar_index, rede_id)
    );
"#;

/// Opens (creating if necessary) the database and sets up all tables.
///
/// A failure while creating tables is logged but does not abort the
/// connection step; the open connection is returned either way.
pub fn setup_database<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    info!("database created");

    info!("creating tables...");
    match conn.execute_batch(SCHEMA_SQL) {
        Ok(()) => info!("tables created successfully"),
        Err(e) => error!("Failed to create tables: {e}"),
    }

    Ok(conn)
}
