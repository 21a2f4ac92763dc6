use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One plenary session, identified by `{wahlperiode}{sitzung-nr}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sitzung {
    pub metadaten: Metadaten,
    /// Agenda items in document order, keyed by their `top-id`.
    pub inhalt: IndexMap<String, Tagesordnungspunkt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadaten {
    pub datum: NaiveDate,
    pub sitzungsbeginn: NaiveTime,
    pub sitzungsende: NaiveTime,
}

/// An agenda item: the speeches held under it, in document order.
pub type Tagesordnungspunkt = IndexMap<String, Rede>;

/// A single speech. Paragraphs stay separate entries until load time,
/// where they are joined with newlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rede {
    pub text: Vec<String>,
    /// Interjections keyed by their speech-local 1-based index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kommentare: BTreeMap<u32, Kommentar>,
    pub reference: RedeReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeReference {
    /// Id of the speaker holding this speech.
    pub redner: String,
    /// Role the speaker spoke in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolle: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kommentar {
    pub kommentator: String,
    pub fraktion: String,
    pub text: String,
}

/// A speaker as announced in a speech's name block. Deduplicated across
/// the whole batch; the first occurrence wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redner {
    pub redner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    pub vorname: String,
    pub nachname: String,
    /// Absent when an officeholder speaks purely in a role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraktion: Option<String>,
}

/// Role dictionary accumulated across a batch: integer ids starting at 1,
/// append-only, plus the reverse description → id map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rollen {
    pub rollen: BTreeMap<u32, String>,
    pub map: IndexMap<String, u32>,
}

impl Rollen {
    /// Returns the id for a whitespace-normalized role description,
    /// inserting it on first sight.
    pub fn intern(&mut self, beschreibung: &str) -> u32 {
        if let Some(id) = self.map.get(beschreibung) {
            return *id;
        }
        let id = self.rollen.len() as u32 + 1;
        self.rollen.insert(id, beschreibung.to_string());
        self.map.insert(beschreibung.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollen_intern_dedup() {
        let mut rollen = Rollen::default();
        let a = rollen.intern("Präsidentin des Deutschen Bundestages");
        let b = rollen.intern("Bundesministerin der Justiz");
        let c = rollen.intern("Präsidentin des Deutschen Bundestages");

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(c, a);
        assert_eq!(rollen.rollen.len(), 2);
        assert_eq!(rollen.map.len(), 2);
    }
}
