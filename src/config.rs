use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct OmdbConfig {
    pub apikey: Option<String>,
}

/// Declarative counterpart of the CLI flags, loaded from a YAML file.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub series_output: Option<PathBuf>,
    pub movie_output: Option<PathBuf>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub clean_up: bool,
    #[serde(default)]
    pub omdb: OmdbConfig,
}

impl Config {
    pub fn from_file(file: &Path) -> Result<Config> {
        let config_file = match std::fs::File::open(file) {
            Ok(f) => f,
            Err(e) => bail!("Cannot open {:?}: {}", file, e),
        };
        match serde_yaml::from_reader(config_file) {
            Ok(c) => Ok(c),
            Err(e) => bail!("Cannot load config file: {}", e),
        }
    }

    /// Write a scaffold config for the user to edit, appending a .yaml
    /// extension when the path has none. Returns the path actually written.
    pub fn write_sample(path: &Path) -> Result<PathBuf> {
        let path = if path.extension().is_none() {
            path.with_extension("yaml")
        } else {
            path.to_path_buf()
        };
        let sample = Config {
            source: Some(PathBuf::from("/path/to/downloads")),
            series_output: Some(PathBuf::from("/path/to/series")),
            movie_output: Some(PathBuf::from("/path/to/movies")),
            dry_run: false,
            clean_up: false,
            omdb: OmdbConfig { apikey: None },
        };
        std::fs::write(&path, serde_yaml::to_string(&sample)?)?;
        Ok(path)
    }
}

/// Flags and paths after merging the CLI over the config file. Every key
/// falls back independently.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    pub source: Option<PathBuf>,
    pub series_output: Option<PathBuf>,
    pub movie_output: Option<PathBuf>,
    pub dry_run: bool,
    pub clean_up: bool,
    pub assume_yes: bool,
    pub api_key: Option<String>,
}

/// The three directories every run needs, once validated.
#[derive(Debug, Clone)]
pub struct Paths {
    pub source: PathBuf,
    pub series_output: PathBuf,
    pub movie_output: PathBuf,
}

impl Settings {
    pub fn merge(cli: Settings, file: Config) -> Settings {
        Settings {
            source: cli.source.or(file.source),
            series_output: cli.series_output.or(file.series_output),
            movie_output: cli.movie_output.or(file.movie_output),
            dry_run: cli.dry_run || file.dry_run,
            clean_up: cli.clean_up || file.clean_up,
            assume_yes: cli.assume_yes,
            api_key: cli.api_key.or(file.omdb.apikey),
        }
    }

    /// No paths at all means there is nothing to do rather than a usage
    /// error; the run becomes a no-op.
    pub fn is_noop(&self) -> bool {
        self.source.is_none() && self.series_output.is_none() && self.movie_output.is_none()
    }

    pub fn require_paths(&self) -> Result<Paths> {
        match (&self.source, &self.series_output, &self.movie_output) {
            (Some(source), Some(series), Some(movies)) => Ok(Paths {
                source: source.clone(),
                series_output: series.clone(),
                movie_output: movies.clone(),
            }),
            _ => {
                let mut missing = Vec::new();
                if self.source.is_none() {
                    missing.push("--source");
                }
                if self.series_output.is_none() {
                    missing.push("--series-output");
                }
                if self.movie_output.is_none() {
                    missing.push("--movie-output");
                }
                bail!("Missing required paths: {}", missing.join(", "))
            }
        }
    }
}
