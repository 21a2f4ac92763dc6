use plenar_scraper::analysis::Analyzer;
use plenar_scraper::parser::ProtokollParser;
use plenar_scraper::storage::{loader, schema};

const PROTOKOLL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dbtplenarprotokoll wahlperiode="20" sitzung-nr="202">
  <vorspann>
    <kopfdaten>
      <veranstaltungsdaten>
        <datum date="05.06.2024">Mittwoch, den 5. Juni 2024</datum>
      </veranstaltungsdaten>
    </kopfdaten>
  </vorspann>
  <sitzungsverlauf>
    <sitzungsbeginn sitzung-start-uhrzeit="9:00">Die Sitzung ist eröffnet.</sitzungsbeginn>
    <tagesordnungspunkt top-id="TOP 1">
      <rede id="ID2020200100">
        <p klasse="redner"><redner id="11001478"><name><titel>Dr.</titel><vorname>Anna</vorname><nachname>Beispiel</nachname><fraktion>SPD</fraktion></name></redner>Dr. Anna Beispiel (SPD):</p>
        <p klasse="J_1">Wir beraten heute den Haushalt.</p>
        <kommentar>(Beifall bei der SPD - Max Mustermann [CDU/CSU]: Sehr richtig!)</kommentar>
        <p klasse="J">Der Haushalt muss solide bleiben.</p>
        <kommentar>(Karl Schulze [AfD]: Das stimmt doch nicht! - Zuruf von der FDP)</kommentar>
      </rede>
      <rede id="ID2020200200">
        <p klasse="redner"><redner id="11002190"><name><vorname>Petra</vorname><nachname>Muster</nachname><rolle><rolle_lang>Präsidentin des Deutschen Bundestages</rolle_lang></rolle></name></redner>Präsidentin Petra Muster:</p>
        <p klasse="J_1">Vielen Dank für den Haushalt-Beitrag.</p>
      </rede>
    </tagesordnungspunkt>
    <tagesordnungspunkt top-id="TOP 2">
      <rede id="ID2020200300">
        <p klasse="redner"><redner id="11001478"><name><vorname>Anna</vorname><nachname>Beispiel</nachname><fraktion>SPD</fraktion></name></redner>Dr. Anna Beispiel (SPD):</p>
        <p klasse="J_1">Zum zweiten Tagesordnungspunkt: der Haushalt bleibt wichtig.</p>
      </rede>
    </tagesordnungspunkt>
    <sitzungsende sitzung-ende-uhrzeit="16:58"/>
  </sitzungsverlauf>
</dbtplenarprotokoll>
"#;

/// Runs parser, schema setup and loader against scratch directories and
/// returns the temp dir holding the database.
fn loaded_database() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let json_dir = dir.path().join("json");
    let db_path = dir.path().join("plenarprotokolle.db");

    let mut parser = ProtokollParser::new();
    parser.parse_document(PROTOKOLL).unwrap();
    parser.write_artifacts(&json_dir).unwrap();

    let conn = schema::setup_database(&db_path).unwrap();
    drop(conn);

    loader::load(&json_dir, &db_path).unwrap();
    (dir, db_path)
}

#[test]
fn test_loader_populates_all_tables() {
    let (_dir, db_path) = loaded_database();
    let conn = rusqlite::Connection::open(db_path).unwrap();

    let count = |table: &str| -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    };

    assert_eq!(count("sitzungen"), 1);
    assert_eq!(count("tagesordnungspunkte"), 2);
    assert_eq!(count("redner"), 2);
    assert_eq!(count("rollen"), 1);
    assert_eq!(count("reden"), 3);
    assert_eq!(count("kommentare"), 2);
}

#[test]
fn test_loader_stores_session_metadata_and_joined_text() {
    let (_dir, db_path) = loaded_database();
    let conn = rusqlite::Connection::open(db_path).unwrap();

    let (datum, start, ende): (String, String, String) = conn
        .query_row(
            "SELECT datum, start, ende FROM sitzungen WHERE sitzungs_id = 20202",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(datum, "2024-06-05");
    assert_eq!(start, "09:00:00");
    assert_eq!(ende, "16:58:00");

    // paragraphs are joined with newlines only at load time
    let text: String = conn
        .query_row(
            "SELECT text FROM reden WHERE rede_id = 'ID2020200100'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(
        text,
        "Wir beraten heute den Haushalt.\nDer Haushalt muss solide bleiben."
    );
}

#[test]
fn test_loader_resolves_foreign_keys() {
    let (_dir, db_path) = loaded_database();
    let conn = rusqlite::Connection::open(db_path).unwrap();

    // every speech joins to a speaker and an agenda item
    let resolved: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM reden re
             JOIN redner r ON r.redner_id = re.redner_id
             JOIN tagesordnungspunkte t ON t.tagesordnungspunkt_id = re.tagesordnungspunkt_id",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(resolved, 3);

    // the president's speech carries the role reference, the others none
    let rollen_id: Option<i64> = conn
        .query_row(
            "SELECT rollen_id FROM reden WHERE rede_id = 'ID2020200200'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rollen_id, Some(1));

    let ohne_rolle: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM reden WHERE rollen_id IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(ohne_rolle, 2);

    // optional speaker fields survive as NULLs
    let fraktion: Option<String> = conn
        .query_row(
            "SELECT fraktion FROM redner WHERE redner_id = 11002190",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fraktion, None);
}

#[test]
fn test_loader_preserves_comment_indices() {
    let (_dir, db_path) = loaded_database();
    let conn = rusqlite::Connection::open(db_path).unwrap();

    let mut stmt = conn
        .prepare(
            "SELECT kommentar_index, kommentator, fraktion, text
             FROM kommentare WHERE rede_id = 'ID2020200100'
             ORDER BY kommentar_index",
        )
        .unwrap();
    let kommentare: Vec<(i64, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        kommentare,
        vec![
            (
                1,
                "Max Mustermann".to_string(),
                "CDU/CSU".to_string(),
                "Sehr richtig!".to_string()
            ),
            (
                2,
                "Karl Schulze".to_string(),
                "AfD".to_string(),
                "Das stimmt doch nicht!".to_string()
            ),
        ]
    );
}

#[test]
fn test_analyzer_reports_over_loaded_store() {
    let (_dir, db_path) = loaded_database();
    let analyzer = Analyzer::open(&db_path).unwrap();

    let sessions = analyzer.session_overview().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].sitzungs_id, 20202);
    assert_eq!(sessions[0].reden, 3);
    assert_eq!(sessions[0].kommentare, 2);

    let speakers = analyzer.speaker_activity(10).unwrap();
    assert_eq!(speakers.len(), 2);
    assert_eq!(speakers[0].name, "Anna Beispiel");
    assert_eq!(speakers[0].fraktion.as_deref(), Some("SPD"));
    assert_eq!(speakers[0].reden, 2);
    assert_eq!(speakers[0].kommentare_erhalten, 2);
    assert_eq!(speakers[1].name, "Petra Muster");
    assert_eq!(speakers[1].kommentare_erhalten, 0);

    let fraktionen = analyzer.kommentare_per_fraktion().unwrap();
    assert_eq!(
        fraktionen,
        vec![("AfD".to_string(), 1), ("CDU/CSU".to_string(), 1)]
    );

    let words = analyzer.word_frequencies(5).unwrap();
    assert_eq!(words[0].0, "haushalt");
    assert_eq!(words[0].1, 3);
}
