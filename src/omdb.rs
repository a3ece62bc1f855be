use crate::renamer::{bracket_year, sanitize_filename};
use log::warn;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;

const ENDPOINT: &str = "http://www.omdbapi.com/";

// Score adjustment when a search candidate's year agrees (or not) with the
// year extracted from the filename, and the acceptance bars for the best
// candidate. Year corroboration lowers the bar.
const YEAR_WEIGHT: f64 = 0.2;
const THRESHOLD_WITH_YEAR: f64 = 0.8;
const THRESHOLD_WITHOUT_YEAR: f64 = 0.9;

#[derive(Debug)]
pub struct OMDB {
    key: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OmdbMovie {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
}

impl OmdbMovie {
    fn found(&self) -> bool {
        self.response == "True"
    }

    /// Canonical "{Title} ({Year})" name, when OMDb returned both fields.
    pub fn suggested_name(&self) -> Option<String> {
        match (&self.title, &self.year) {
            (Some(title), Some(year)) => Some(format!("{} ({})", title, year)),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
struct SearchItem {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
}

#[derive(Deserialize, Debug)]
struct SearchPage {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Search", default)]
    results: Vec<SearchItem>,
}

impl OMDB {
    pub fn new(key: &str) -> OMDB {
        OMDB {
            key: key.to_string(),
        }
    }

    /// Look a movie up by title, falling back to a fuzzy search and then to
    /// progressively shorter forms of the title. Lookup problems degrade to
    /// no result; they never abort the caller.
    pub fn query(&self, title: &str, year: Option<&str>) -> Option<OmdbMovie> {
        if let Some(movie) = self.lookup_by_title(title, year) {
            return Some(movie);
        }
        if let Some(movie) = self.fuzzy_search(title, year) {
            return Some(movie);
        }
        for query in relaxed_queries(title) {
            if let Some(movie) = self.fuzzy_search(&query, year) {
                return Some(movie);
            }
        }
        None
    }

    fn lookup_by_title(&self, title: &str, year: Option<&str>) -> Option<OmdbMovie> {
        let mut params = vec![
            ("t", title.trim().to_string()),
            ("apikey", self.key.clone()),
        ];
        if let Some(year) = year {
            params.push(("y", year.to_string()));
        }
        self.get::<OmdbMovie>(&params).filter(OmdbMovie::found)
    }

    fn lookup_by_id(&self, imdb_id: &str) -> Option<OmdbMovie> {
        let params = [("i", imdb_id.to_string()), ("apikey", self.key.clone())];
        self.get::<OmdbMovie>(&params).filter(OmdbMovie::found)
    }

    fn fuzzy_search(&self, query: &str, year: Option<&str>) -> Option<OmdbMovie> {
        let params = [("s", query.trim().to_string()), ("apikey", self.key.clone())];
        let page = self.get::<SearchPage>(&params)?;
        if page.response != "True" {
            return None;
        }
        let best = best_candidate(&page.results, query, year)?;
        self.lookup_by_id(&best.imdb_id)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, String)]) -> Option<T> {
        let url = Url::parse_with_params(ENDPOINT, params).unwrap();

        match reqwest::blocking::get(url.as_str()) {
            Ok(resp) => match resp.json::<T>() {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!("Cannot read OMDb response: {e}");
                    None
                }
            },
            Err(e) => {
                warn!("Cannot reach OMDb: {e}");
                None
            }
        }
    }
}

/// Pick the search candidate most similar to the intended title. A matching
/// year is worth an extra 0.2 and a conflicting one costs the same; the best
/// candidate must still clear the acceptance bar.
fn best_candidate<'a>(
    candidates: &'a [SearchItem],
    intended_title: &str,
    intended_year: Option<&str>,
) -> Option<&'a SearchItem> {
    let mut best: Option<(&SearchItem, f64)> = None;
    for item in candidates {
        let ratio = strsim::normalized_levenshtein(
            &item.title.to_lowercase(),
            &intended_title.to_lowercase(),
        );
        let score = match intended_year {
            Some(year) if item.year == year => ratio + YEAR_WEIGHT,
            Some(_) => ratio - YEAR_WEIGHT,
            None => ratio,
        };
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((item, score));
        }
    }

    let threshold = if intended_year.is_some() {
        THRESHOLD_WITH_YEAR
    } else {
        THRESHOLD_WITHOUT_YEAR
    };
    best.filter(|&(_, score)| score >= threshold)
        .map(|(item, _)| item)
}

/// Fallback queries for a title that found nothing: the alphabetic words
/// alone, then prefixes of that word list shrinking down to two words.
fn relaxed_queries(title: &str) -> Vec<String> {
    let word = Regex::new(r"[A-Za-z]+").unwrap();
    let words: Vec<&str> = word.find_iter(title).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut queries = Vec::new();
    let simplified = words.join(" ");
    if simplified != title {
        queries.push(simplified);
    }
    for len in (2..words.len()).rev() {
        queries.push(words[..len].join(" "));
    }
    queries
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Validity {
    Confirmed,
    Mismatch(String),
    Unknown,
}

/// Cross-checks computed movie names against OMDb. Only constructed when an
/// API key was resolved; without one the whole check is skipped upstream.
pub struct Validator {
    omdb: OMDB,
}

impl Validator {
    pub fn new(api_key: &str) -> Validator {
        Validator {
            omdb: OMDB::new(api_key),
        }
    }

    /// Compare `current` (the computed filename stem) with what OMDb calls
    /// this movie. No data means unknown, never invalid.
    pub fn validate_movie_name(&self, title: &str, year: Option<&str>, current: &str) -> Validity {
        let movie = match self.omdb.query(title, year) {
            Some(m) => m,
            None => return Validity::Unknown,
        };
        let suggested = match movie.suggested_name() {
            Some(s) => s,
            None => return Validity::Unknown,
        };

        let suggested = sanitize_filename(&bracket_year(&suggested));
        if suggested.to_lowercase() == current.to_lowercase() {
            Validity::Confirmed
        } else {
            Validity::Mismatch(suggested)
        }
    }
}

#[cfg(test)]
mod omdb_tests {
    use super::*;

    fn candidate(title: &str, year: &str) -> SearchItem {
        SearchItem {
            title: title.to_string(),
            year: year.to_string(),
            imdb_id: String::from("tt0000001"),
        }
    }

    #[test]
    fn title_payload_decodes_with_optional_fields() {
        let movie: OmdbMovie =
            serde_json::from_str(r#"{"Title":"Waterworld","Year":"1995","Response":"True"}"#)
                .unwrap();
        assert!(movie.found());
        assert_eq!(movie.suggested_name().as_deref(), Some("Waterworld (1995)"));

        let missing: OmdbMovie =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap();
        assert!(!missing.found());
        assert_eq!(missing.suggested_name(), None);

        let no_year: OmdbMovie =
            serde_json::from_str(r#"{"Title":"The Matrix","Response":"True"}"#).unwrap();
        assert_eq!(no_year.suggested_name(), None);
    }

    #[test]
    fn search_payload_decodes() {
        let page: SearchPage = serde_json::from_str(
            r#"{"Response":"True","Search":[{"Title":"Vicky Cristina Barcelona","Year":"2008","imdbID":"tt0497465"}]}"#,
        )
        .unwrap();
        assert_eq!(page.response, "True");
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].imdb_id, "tt0497465");

        let empty: SearchPage = serde_json::from_str(r#"{"Response":"False"}"#).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn exact_title_clears_the_bar_without_a_year() {
        let items = vec![candidate("The Matrix", "1999")];
        let best = best_candidate(&items, "The Matrix", None).unwrap();
        assert_eq!(best.title, "The Matrix");
    }

    #[test]
    fn bar_is_stricter_without_a_year() {
        let items = vec![candidate("The Matrix Reloaded", "2003")];
        assert!(best_candidate(&items, "The Matrix", None).is_none());
        assert!(best_candidate(&items, "The Matrix", Some("2003")).is_none());
    }

    #[test]
    fn matching_year_lifts_a_near_miss() {
        let items = vec![candidate("The Matrixx", "1999")];
        assert!(best_candidate(&items, "The Matrix", Some("1999")).is_some());
    }

    #[test]
    fn conflicting_year_sinks_a_near_miss() {
        let items = vec![candidate("The Matrixx", "2003")];
        assert!(best_candidate(&items, "The Matrix", Some("1999")).is_none());
    }

    #[test]
    fn year_agreement_beats_closer_spelling() {
        let items = vec![
            candidate("The Matrix Reloaded", "1999"),
            candidate("The Matrix", "2003"),
        ];
        let best = best_candidate(&items, "The Matrix", Some("1999")).unwrap();
        assert_eq!(best.title, "The Matrix");
    }

    #[test]
    fn relaxation_simplifies_then_shortens() {
        assert_eq!(
            relaxed_queries("Vicky Cristina Barcelonaz 2008"),
            vec![
                String::from("Vicky Cristina Barcelonaz"),
                String::from("Vicky Cristina"),
            ]
        );
        assert_eq!(
            relaxed_queries("One Two Three Four"),
            vec![String::from("One Two Three"), String::from("One Two")]
        );
    }

    #[test]
    fn relaxation_needs_alphabetic_words() {
        assert!(relaxed_queries("1234").is_empty());
        assert!(relaxed_queries("Solo").is_empty());
        assert!(relaxed_queries("Duo Title").is_empty());
    }
}
