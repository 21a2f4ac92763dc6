/// File names of the JSON artifacts the parser writes and the loader reads.
pub const DATA_JSON: &str = "data.json";
pub const REDNER_JSON: &str = "redner.json";
pub const ROLLEN_JSON: &str = "rollen.json";

/// Paginated AJAX listing behind the Bundestag open-data page.
pub const DEFAULT_LISTING_URL: &str =
    "https://www.bundestag.de/ajax/filterlist/de/services/opendata/866354-866354";

/// Base URL for resolving relative document links from the listing.
pub const BUNDESTAG_BASE_URL: &str = "https://www.bundestag.de";

pub const USER_AGENT: &str = "plenar_scraper/0.1";
