use regex::Regex;
use std::path::Path;

#[derive(Eq, PartialEq, Debug)]
pub struct MovieName {
    pub title: String,
    pub year: Option<String>,
}

#[derive(Eq, PartialEq, Debug)]
pub struct SeriesName {
    pub series_title: String,
    pub season: u32,
    pub episode_code: String,
    pub new_filename: String,
}

/// Remove the characters that common filesystems reject in filenames.
/// Periods and hyphens carry meaning in media names and stay untouched.
pub fn sanitize_filename(name: &str) -> String {
    let illegal = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
    illegal.replace_all(name, "").to_string()
}

/// Rewrite "(YYYY)" year annotations to the bracketed form used for movie
/// filenames, so externally suggested names can be compared against ours.
pub fn bracket_year(name: &str) -> String {
    let wrapped = Regex::new(r"\((\d{4})\)").unwrap();
    wrapped.replace_all(name, "[$1]").to_string()
}

/// Extract the title and year a movie filename carries, if any.
///
/// The first 4-digit run in the stem is the year and everything before it is
/// the title. A stem that itself begins with 4 digits is a numeric title
/// (e.g. "2012"); its year counts only when bracketed after the title.
pub fn parse_movie_name(filename: &str) -> Option<MovieName> {
    let (stem, _ext) = split_extension(filename);
    let stem = stem.replace(['[', ']'], "");

    let leading = Regex::new(r"^(\d{4})(?:\D|$)").unwrap();
    if let Some(caps) = leading.captures(&stem) {
        let title = caps[1].to_string();
        let run = Regex::new(r"\d{4}").unwrap();
        let rest = match run.find(filename) {
            Some(m) => &filename[m.end()..],
            None => "",
        };
        let wrapped = Regex::new(r"[\[(](\d{4})[\])]").unwrap();
        let year = wrapped.captures(rest).map(|c| c[1].to_string());
        return Some(MovieName { title, year });
    }

    let run = Regex::new(r"\d{4}").unwrap();
    let m = run.find(&stem)?;
    let title = stem[..m.start()].replace('.', " ");
    let title = collapse_whitespace(&title)
        .trim_matches([' ', '.'])
        .to_string();
    Some(MovieName {
        title,
        year: Some(m.as_str().to_string()),
    })
}

/// Normalized "{title} [{year}]{ext}" filename for a movie, or None when the
/// name carries no year at all and cannot be renamed automatically.
pub fn movie_new_filename(filename: &str) -> Option<String> {
    let (_stem, ext) = split_extension(filename);
    let name = parse_movie_name(filename)?;
    let new_name = match &name.year {
        Some(year) => format!("{} [{}]{}", name.title, year, ext),
        None => format!("{}{}", name.title, ext),
    };
    Some(sanitize_filename(&new_name))
}

/// Parse a series filename into title, season, and episode code, or None
/// when no "S##E##" token is present.
pub fn series_new_filename(filename: &str) -> Option<SeriesName> {
    let (stem, ext) = split_extension(filename);
    let annotation = Regex::new(r"\(\d{4}\)").unwrap();
    let stem = annotation.replace_all(stem, "").to_string();

    let episode = Regex::new(r"(?i)S(\d{2})E(\d{2})").unwrap();
    let caps = episode.captures(&stem)?;
    let code = caps.get(0)?;
    let season: u32 = caps[1].parse().ok()?;
    let episode_code = code.as_str().to_uppercase();

    // A filename that starts with the episode code has no title; the
    // resulting leading space is preserved as-is.
    let raw_title = stem[..code.start()].replace(['.', '-'], " ");
    let series_title = collapse_whitespace(&raw_title)
        .trim_matches([' ', '.'])
        .to_string();
    let new_filename = sanitize_filename(&format!("{} {}{}", series_title, episode_code, ext));

    Some(SeriesName {
        series_title,
        season,
        episode_code,
        new_filename,
    })
}

pub(crate) fn split_extension(filename: &str) -> (&str, String) {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    (stem, ext)
}

fn collapse_whitespace(s: &str) -> String {
    let whitespace = Regex::new(r"\s+").unwrap();
    whitespace.replace_all(s, " ").to_string()
}
