use anyhow::Context;
use indexmap::IndexMap;
use rusqlite::{params, Connection};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::constants::{DATA_JSON, REDNER_JSON, ROLLEN_JSON};
use crate::types::{Redner, Rollen, Sitzung};

/// Loads the parser's JSON artifacts into the relational store.
///
/// Inserts run in dependency order (roles, speakers, sessions, agenda
/// items, speeches, comments) inside one transaction committed at the
/// very end, so a crash mid-load leaves no partial data behind.
pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(json_dir: P, db_path: Q) -> anyhow::Result<()> {
    let json_dir = json_dir.as_ref();
    let sitzungen: IndexMap<String, Sitzung> = read_artifact(&json_dir.join(DATA_JSON))?;
    let redner: IndexMap<String, Redner> = read_artifact(&json_dir.join(REDNER_JSON))?;
    let rollen: Rollen = read_artifact(&json_dir.join(ROLLEN_JSON))?;

    let mut conn = Connection::open(db_path)?;
    let tx = conn.transaction()?;

    for (rollen_id, beschreibung) in &rollen.rollen {
        tx.execute(
            "INSERT INTO rollen (rollen_id, beschreibung) VALUES (?1, ?2)",
            params![rollen_id, beschreibung],
        )?;
    }

    for (redner_id, person) in &redner {
        let redner_id: i64 = redner_id
            .parse()
            .with_context(|| format!("non-numeric redner id '{redner_id}'"))?;
        tx.execute(
            "INSERT INTO redner (redner_id, titel, vorname, nachname, fraktion)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                redner_id,
                person.titel,
                person.vorname,
                person.nachname,
                person.fraktion
            ],
        )?;
    }

    let mut reden_count = 0usize;
    let mut kommentare_count = 0usize;

    for (sitzungs_id, sitzung) in &sitzungen {
        let sitzungs_id: i64 = sitzungs_id
            .parse()
            .with_context(|| format!("non-numeric sitzungs id '{sitzungs_id}'"))?;
        tx.execute(
            "INSERT INTO sitzungen (sitzungs_id, datum, start, ende) VALUES (?1, ?2, ?3, ?4)",
            params![
                sitzungs_id,
                sitzung.metadaten.datum,
                sitzung.metadaten.sitzungsbeginn,
                sitzung.metadaten.sitzungsende
            ],
        )?;

        for (top_name, reden) in &sitzung.inhalt {
            tx.execute(
                "INSERT INTO tagesordnungspunkte (name, sitzungs_id) VALUES (?1, ?2)",
                params![top_name, sitzungs_id],
            )?;
            let tagesordnungspunkt_id = tx.last_insert_rowid();

            for (rede_id, rede) in reden {
                let redner_id: i64 = rede
                    .reference
                    .redner
                    .parse()
                    .with_context(|| format!("non-numeric redner reference in rede '{rede_id}'"))?;
                tx.execute(
                    "INSERT INTO reden (rede_id, text, redner_id, tagesordnungspunkt_id, rollen_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        rede_id,
                        rede.text.join("\n"),
                        redner_id,
                        tagesordnungspunkt_id,
                        rede.reference.rolle
                    ],
                )?;
                reden_count += 1;

                for (kommentar_index, kommentar) in &rede.kommentare {
                    tx.execute(
                        "INSERT INTO kommentare (kommentar_index, kommentator, fraktion, text, rede_id)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            kommentar_index,
                            kommentar.kommentator,
                            kommentar.fraktion,
                            kommentar.text,
                            rede_id
                        ],
                    )?;
                    kommentare_count += 1;
                }
            }
        }
    }

    tx.commit()?;
    info!(
        sitzungen = sitzungen.len(),
        redner = redner.len(),
        rollen = rollen.rollen.len(),
        reden = reden_count,
        kommentare = kommentare_count,
        "Load complete"
    );
    Ok(())
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
