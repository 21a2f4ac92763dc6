//! Read-only aggregate queries over the loaded store, plus a small word
//! tokenizer for frequency counts over speech text.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug)]
pub struct SpeakerActivity {
    pub name: String,
    pub fraktion: Option<String>,
    pub reden: u32,
    pub kommentare_erhalten: u32,
}

#[derive(Debug)]
pub struct SessionOverview {
    pub sitzungs_id: i64,
    pub datum: String,
    pub reden: u32,
    pub kommentare: u32,
}

pub struct Analyzer {
    conn: Connection,
}

impl Analyzer {
    pub fn open<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        Ok(Self {
            conn: Connection::open(db_path)?,
        })
    }

    /// Speeches held and interjections received per speaker, busiest first.
    pub fn speaker_activity(&self, limit: u32) -> anyhow::Result<Vec<SpeakerActivity>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.vorname || ' ' || r.nachname, r.fraktion,
                    COUNT(DISTINCT re.rede_id), COUNT(k.kommentar_id)
             FROM redner r
             JOIN reden re ON re.redner_id = r.redner_id
             LEFT JOIN kommentare k ON k.rede_id = re.rede_id
             GROUP BY r.redner_id
             ORDER BY COUNT(DISTINCT re.rede_id) DESC, r.nachname
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(SpeakerActivity {
                name: row.get(0)?,
                fraktion: row.get(1)?,
                reden: row.get(2)?,
                kommentare_erhalten: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Interjections grouped by the commenting faction.
    pub fn kommentare_per_fraktion(&self) -> anyhow::Result<Vec<(String, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT fraktion, COUNT(*)
             FROM kommentare
             GROUP BY fraktion
             ORDER BY COUNT(*) DESC, fraktion",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Speech and interjection counts per session, in session order.
    pub fn session_overview(&self) -> anyhow::Result<Vec<SessionOverview>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.sitzungs_id, s.datum,
                    COUNT(DISTINCT re.rede_id), COUNT(k.kommentar_id)
             FROM sitzungen s
             LEFT JOIN tagesordnungspunkte t ON t.sitzungs_id = s.sitzungs_id
             LEFT JOIN reden re ON re.tagesordnungspunkt_id = t.tagesordnungspunkt_id
             LEFT JOIN kommentare k ON k.rede_id = re.rede_id
             GROUP BY s.sitzungs_id
             ORDER BY s.sitzungs_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionOverview {
                sitzungs_id: row.get(0)?,
                datum: row.get(1)?,
                reden: row.get(2)?,
                kommentare: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Most frequent words across all stored speech text.
    pub fn word_frequencies(&self, top_n: usize) -> anyhow::Result<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare("SELECT text FROM reden")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for text in rows {
            for token in tokenize(&text?) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut frequencies: Vec<(String, u64)> = counts.into_iter().collect();
        frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        frequencies.truncate(top_n);
        Ok(frequencies)
    }
}

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Alphabetic}[\p{Alphabetic}-]*").unwrap());

/// Lowercased word tokens; one- and two-letter tokens are dropped as noise.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| token.chars().count() > 2)
        .collect()
}
