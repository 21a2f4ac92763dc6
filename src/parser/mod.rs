//! Transcript parser/normalizer.
//!
//! Turns one plenary protocol XML document into the session/speech shape
//! of [`crate::types`], accumulating speaker and role dictionaries across
//! all documents of a batch.

pub mod text;

pub use text::{clean_text, extract_comments, normalize_whitespace};

use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::{DATA_JSON, REDNER_JSON, ROLLEN_JSON};
use crate::error::{PipelineError, Result};
use crate::types::{
    Metadaten, Rede, RedeReference, Redner, Rollen, Sitzung, Tagesordnungspunkt,
};

/// Outcome of one batch run over a transcript directory.
#[derive(Debug, Default)]
pub struct ParseSummary {
    pub total_files: usize,
    pub parsed_files: usize,
    pub sessions: usize,
    pub errors: Vec<String>,
}

/// Accumulates sessions, speakers and roles across a batch of transcripts.
///
/// Speaker and role dictionaries are append-only: the first occurrence of
/// an id or description wins and is never overwritten.
#[derive(Debug, Default)]
pub struct ProtokollParser {
    pub sitzungen: IndexMap<String, Sitzung>,
    pub redner: IndexMap<String, Redner>,
    pub rollen: Rollen,
}

impl ProtokollParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `*.xml` file under `input_dir` (sorted by name) and
    /// writes the three JSON artifacts into `output_dir`.
    ///
    /// A malformed document aborts only that file; the batch continues
    /// and the failure shows up in the summary.
    pub fn crawl_directory(&mut self, input_dir: &Path, output_dir: &Path) -> Result<ParseSummary> {
        let mut paths: Vec<PathBuf> = fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        paths.sort();

        let mut summary = ParseSummary::default();
        for path in &paths {
            summary.total_files += 1;
            match self.parse_file(path) {
                Ok(()) => {
                    summary.parsed_files += 1;
                    info!(file = %path.display(), "Parsed transcript");
                }
                Err(e) => {
                    warn!(file = %path.display(), "Failed to parse transcript: {e}");
                    summary.errors.push(format!("{}: {e}", path.display()));
                }
            }
        }
        summary.sessions = self.sitzungen.len();

        self.write_artifacts(output_dir)?;
        Ok(summary)
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        self.parse_document(&content)
    }

    /// Parses one transcript document and merges it into the accumulator.
    pub fn parse_document(&mut self, xml: &str) -> Result<()> {
        // The published protocols declare a DTD
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        let root = doc.root_element();

        let wahlperiode = required_attr(root, "wahlperiode")?;
        let sitzung_nr = required_attr(root, "sitzung-nr")?;
        let sitzungs_id = format!("{wahlperiode}{sitzung_nr}");

        let kopfdaten = find_child(find_child(root, "vorspann")?, "kopfdaten")?;
        let veranstaltungsdaten = find_child(kopfdaten, "veranstaltungsdaten")?;
        let datum = parse_datum(required_attr(find_child(veranstaltungsdaten, "datum")?, "date")?)?;

        let sitzungsverlauf = find_child(root, "sitzungsverlauf")?;
        let sitzungsbeginn = parse_uhrzeit(required_attr(
            find_child(sitzungsverlauf, "sitzungsbeginn")?,
            "sitzung-start-uhrzeit",
        )?)?;
        let sitzungsende = parse_uhrzeit(required_attr(
            find_child(sitzungsverlauf, "sitzungsende")?,
            "sitzung-ende-uhrzeit",
        )?)?;

        let mut inhalt = IndexMap::new();
        for top in sitzungsverlauf
            .children()
            .filter(|n| n.has_tag_name("tagesordnungspunkt"))
        {
            let top_id = required_attr(top, "top-id")?;
            let mut reden: Tagesordnungspunkt = IndexMap::new();

            for rede_node in top.children().filter(|n| n.has_tag_name("rede")) {
                let rede_id = required_attr(rede_node, "id")?;
                match self.extract_rede(rede_node) {
                    Ok(rede) => {
                        reden.insert(rede_id.to_string(), rede);
                    }
                    Err(e) => {
                        warn!(rede = rede_id, "Skipping speech: {e}");
                    }
                }
            }

            // Agenda items with no surviving speeches are dropped
            if !reden.is_empty() {
                inhalt.insert(top_id.to_string(), reden);
            }
        }

        debug!(
            sitzung = %sitzungs_id,
            tagesordnungspunkte = inhalt.len(),
            "Extracted session"
        );

        self.sitzungen.insert(
            sitzungs_id,
            Sitzung {
                metadaten: Metadaten {
                    datum,
                    sitzungsbeginn,
                    sitzungsende,
                },
                inhalt,
            },
        );

        Ok(())
    }

    /// Extracts one speech: its paragraph sequence, interjections and the
    /// reference to the (deduplicated) speaker and optional role.
    fn extract_rede(&mut self, rede_node: Node) -> Result<Rede> {
        let mut paragraphs = Vec::new();
        let mut kommentare = BTreeMap::new();
        let mut kommentar_index = 0u32;

        for child in rede_node.children().filter(|n| n.is_element()) {
            if child.has_tag_name("kommentar") {
                if let Some(raw) = child.text() {
                    for kommentar in extract_comments(&clean_text(raw)) {
                        kommentar_index += 1;
                        kommentare.insert(kommentar_index, kommentar);
                    }
                }
                continue;
            }

            // Speaker announcements are metadata, not speech text
            if child.has_tag_name("p") && child.attribute("klasse") == Some("redner") {
                continue;
            }

            if let Some(raw) = child.text() {
                paragraphs.push(clean_text(raw));
            }
        }

        let reference = self.extract_redner(rede_node)?;

        Ok(Rede {
            text: paragraphs,
            kommentare,
            reference,
        })
    }

    /// Reads the speaker element out of the announcement paragraph and
    /// interns speaker and role into the batch dictionaries.
    fn extract_redner(&mut self, rede_node: Node) -> Result<RedeReference> {
        let announcement = rede_node
            .children()
            .find(|n| n.has_tag_name("p"))
            .filter(|p| p.attribute("klasse") == Some("redner"))
            .ok_or_else(|| {
                PipelineError::MissingElement("speaker announcement paragraph".to_string())
            })?;

        let redner_node = find_child(announcement, "redner")?;
        let redner_id = required_attr(redner_node, "id")?.to_string();
        let name = find_child(redner_node, "name")?;

        let mut titel = None;
        let mut vorname = None;
        let mut nachname = None;
        let mut fraktion = None;
        let mut rolle = None;

        for element in name.children().filter(|n| n.is_element()) {
            if element.has_tag_name("rolle") {
                let rolle_lang = find_child(element, "rolle_lang")?
                    .text()
                    .ok_or_else(|| PipelineError::MissingElement("rolle_lang text".to_string()))?;
                let beschreibung = normalize_whitespace(rolle_lang);
                rolle = Some(self.rollen.intern(&beschreibung));
                continue;
            }

            let Some(value) = element.text() else { continue };
            let value = clean_text(value);
            match element.tag_name().name() {
                "titel" => titel = Some(value),
                "vorname" => vorname = Some(value),
                "nachname" => nachname = Some(value),
                "fraktion" => fraktion = Some(value),
                other => debug!(element = other, "Ignoring name element"),
            }
        }

        if !self.redner.contains_key(&redner_id) {
            let redner = Redner {
                redner_id: redner_id.clone(),
                titel,
                vorname: vorname
                    .ok_or_else(|| PipelineError::MissingElement("vorname".to_string()))?,
                nachname: nachname
                    .ok_or_else(|| PipelineError::MissingElement("nachname".to_string()))?,
                fraktion,
            };
            self.redner.insert(redner_id.clone(), redner);
        }

        Ok(RedeReference {
            redner: redner_id,
            rolle,
        })
    }

    /// Writes the accumulated batch as the three JSON artifacts.
    pub fn write_artifacts(&self, output_dir: &Path) -> Result<()> {
        fs::create_dir_all(output_dir)?;
        write_json(&output_dir.join(DATA_JSON), &self.sitzungen)?;
        write_json(&output_dir.join(REDNER_JSON), &self.redner)?;
        write_json(&output_dir.join(ROLLEN_JSON), &self.rollen)?;
        info!(
            sitzungen = self.sitzungen.len(),
            redner = self.redner.len(),
            rollen = self.rollen.rollen.len(),
            output = %output_dir.display(),
            "Wrote JSON artifacts"
        );
        Ok(())
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        PipelineError::MissingElement(format!(
            "attribute '{name}' on <{}>",
            node.tag_name().name()
        ))
    })
}

fn find_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Result<Node<'a, 'i>> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .ok_or_else(|| {
            PipelineError::MissingElement(format!(
                "<{name}> under <{}>",
                node.tag_name().name()
            ))
        })
}

fn parse_datum(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y")?)
}

/// Session times appear as `9:00`, `13.30` or `9:02 Uhr` depending on the
/// electoral period.
fn parse_uhrzeit(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim().trim_end_matches(" Uhr");
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H.%M"))
        .map_err(PipelineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uhrzeit_variants() {
        assert_eq!(
            parse_uhrzeit("9:00").unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_uhrzeit("13.30").unwrap(),
            NaiveTime::from_hms_opt(13, 30, 0).unwrap()
        );
        assert_eq!(
            parse_uhrzeit("9:02 Uhr").unwrap(),
            NaiveTime::from_hms_opt(9, 2, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_datum() {
        assert_eq!(
            parse_datum("05.06.2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
        assert!(parse_datum("Juni 2024").is_err());
    }
}
