use regex::Regex;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Classification {
    Movie,
    Series,
    Unclassified,
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Movie => write!(f, "movie"),
            Classification::Series => write!(f, "series"),
            Classification::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Decide movie vs series from the filename alone. An episode token like
/// "S01E01" anywhere in the name marks a series; everything else is a movie.
/// Paths without a readable filename cannot be classified.
pub fn classify(path: &Path) -> Classification {
    let episode = Regex::new(r"[Ss]\d+[Ee]\d+").unwrap();
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if episode.is_match(name) => Classification::Series,
        Some(_) => Classification::Movie,
        None => Classification::Unclassified,
    }
}

#[cfg(test)]
mod classifier_tests {
    use super::*;

    #[test]
    fn episode_token_marks_a_series() {
        assert_eq!(
            classify(Path::new("Breaking.Bad.S01E01.mp4")),
            Classification::Series
        );
        assert_eq!(classify(Path::new("show.s4e12.mkv")), Classification::Series);
        assert_eq!(
            classify(Path::new("/downloads/SeriesName (2014) - S04E01.mkv")),
            Classification::Series
        );
    }

    #[test]
    fn everything_else_is_a_movie() {
        assert_eq!(
            classify(Path::new("The.Matrix.1999.mp4")),
            Classification::Movie
        );
        assert_eq!(classify(Path::new("NoYearHere.mp4")), Classification::Movie);
        // Letters where digits belong do not make an episode token.
        assert_eq!(classify(Path::new("Show SXXEYY.mkv")), Classification::Movie);
    }

    #[test]
    fn paths_without_a_filename_are_unclassified() {
        assert_eq!(classify(Path::new("/")), Classification::Unclassified);
        assert_eq!(classify(Path::new("..")), Classification::Unclassified);
    }
}
