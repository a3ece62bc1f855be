use crate::classifier::{classify, Classification};
use crate::config::{Paths, Settings};
use crate::finder;
use crate::omdb::{Validator, Validity};
use crate::renamer::{movie_new_filename, parse_movie_name, series_new_filename, split_extension};
use anyhow::Result;
use dialoguer::console::{user_attended, Term};
use dialoguer::Confirm;
use log::warn;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;

pub struct ReelSort {
    paths: Paths,
    dry_run: bool,
    clean_up: bool,
    assume_yes: bool,
    validator: Option<Validator>,
}

/// One discovered video with its computed destination. A plan without a
/// target is skipped and the file stays where it is.
struct MovePlan {
    source: PathBuf,
    kind: Classification,
    target: Option<PathBuf>,
    skip: Option<String>,
    validity: Option<Validity>,
}

impl ReelSort {
    pub fn new(paths: Paths, settings: &Settings) -> ReelSort {
        ReelSort {
            paths,
            dry_run: settings.dry_run,
            clean_up: settings.clean_up,
            assume_yes: settings.assume_yes,
            validator: settings.api_key.as_deref().map(Validator::new),
        }
    }

    pub fn run(&self) -> Result<()> {
        let (videos, non_videos) = finder::find_files(&self.paths.source)?;
        let plans: Vec<MovePlan> = videos.iter().map(|v| self.plan(v)).collect();

        println!("Files to move");
        println!("{}", self.render_moves(&plans));

        if !self.confirmed(&plans, &non_videos)? {
            println!("Aborted; nothing was moved.");
            return Ok(());
        }

        let mut moved_parents = BTreeSet::new();
        for plan in &plans {
            if self.execute(plan) {
                if let Some(parent) = plan.source.parent() {
                    moved_parents.insert(parent.to_path_buf());
                }
            }
        }

        if self.clean_up {
            self.clean_up_non_videos(&non_videos, &mut moved_parents)?;
            if !self.dry_run {
                for dir in moved_parents.iter().rev() {
                    remove_empty_parents(dir, &self.paths.source);
                }
            }
        }

        Ok(())
    }

    fn plan(&self, video: &Path) -> MovePlan {
        let kind = classify(video);
        let filename = video
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match kind {
            Classification::Series => match series_new_filename(&filename) {
                Some(name) => MovePlan {
                    source: video.to_path_buf(),
                    kind,
                    target: Some(
                        self.paths
                            .series_output
                            .join(&name.series_title)
                            .join(format!("Season {}", name.season))
                            .join(&name.new_filename),
                    ),
                    skip: None,
                    validity: None,
                },
                None => self.skipped(video, kind, "no episode code found"),
            },
            Classification::Movie => match movie_new_filename(&filename) {
                Some(new_name) => {
                    let validity = self.validate(&filename, &new_name);
                    let target_name = match &validity {
                        Some(Validity::Mismatch(suggested)) => {
                            let (_stem, ext) = split_extension(&filename);
                            format!("{}{}", suggested, ext)
                        }
                        _ => new_name,
                    };
                    MovePlan {
                        source: video.to_path_buf(),
                        kind,
                        target: Some(self.paths.movie_output.join(target_name)),
                        skip: None,
                        validity,
                    }
                }
                None => self.skipped(video, kind, "no year found"),
            },
            // No readable filename to derive anything from; keep the name.
            Classification::Unclassified => match video.file_name() {
                Some(name) => MovePlan {
                    source: video.to_path_buf(),
                    kind,
                    target: Some(self.paths.movie_output.join(name)),
                    skip: None,
                    validity: None,
                },
                None => self.skipped(video, kind, "no usable filename"),
            },
        }
    }

    fn skipped(&self, video: &Path, kind: Classification, reason: &str) -> MovePlan {
        MovePlan {
            source: video.to_path_buf(),
            kind,
            target: None,
            skip: Some(reason.to_string()),
            validity: None,
        }
    }

    fn validate(&self, filename: &str, new_name: &str) -> Option<Validity> {
        let validator = self.validator.as_ref()?;
        let parsed = parse_movie_name(filename)?;
        let current = Path::new(new_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(new_name);
        Some(validator.validate_movie_name(&parsed.title, parsed.year.as_deref(), current))
    }

    fn confirmed(&self, plans: &[MovePlan], non_videos: &[PathBuf]) -> Result<bool> {
        if self.dry_run || self.assume_yes {
            return Ok(true);
        }
        let has_work = plans.iter().any(|p| p.target.is_some())
            || (self.clean_up && !non_videos.is_empty());
        if !has_work || !user_attended() {
            return Ok(true);
        }

        let confirmed = Confirm::new()
            .with_prompt("Proceed with moves?")
            .default(false)
            .interact_on(&Term::stderr())?;
        Ok(confirmed)
    }

    /// Act on one plan. Returns whether the file actually moved.
    fn execute(&self, plan: &MovePlan) -> bool {
        let target = match &plan.target {
            Some(target) => target,
            None => {
                warn!(
                    "Skipping {:?}: {}, leaving in place",
                    plan.source,
                    plan.skip.as_deref().unwrap_or("skipped")
                );
                return false;
            }
        };

        if target.exists() {
            warn!("Target {:?} already exists. Skipping.", target);
            return false;
        }

        if self.dry_run {
            println!("Would move: {} -> {}", plan.source.display(), target.display());
            return false;
        }

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                println!("Failed to move {}: {}", plan.source.display(), e);
                return false;
            }
        }

        match move_file(&plan.source, target) {
            Ok(()) => {
                println!("Moved: {} -> {}", plan.source.display(), target.display());
                true
            }
            Err(e) => {
                println!("Failed to move {}: {}", plan.source.display(), e);
                false
            }
        }
    }

    fn clean_up_non_videos(
        &self,
        non_videos: &[PathBuf],
        moved_parents: &mut BTreeSet<PathBuf>,
    ) -> Result<()> {
        let deleted_dir = self.paths.source.join("Deleted");
        let cleanup: Vec<(PathBuf, PathBuf)> = non_videos
            .iter()
            .filter_map(|file| {
                file.file_name()
                    .map(|name| (file.clone(), deleted_dir.join(name)))
            })
            .collect();
        if cleanup.is_empty() {
            return Ok(());
        }

        println!("Files to be deleted");
        println!("{}", render_cleanup(&cleanup));

        if !self.dry_run {
            fs::create_dir_all(&deleted_dir)?;
        }

        for (source, target) in &cleanup {
            if self.dry_run {
                println!(
                    "Would move (delete): {} -> {}",
                    source.display(),
                    target.display()
                );
                continue;
            }
            if target.exists() {
                warn!("Deleted file {:?} already exists. Skipping.", target);
                continue;
            }
            match move_file(source, target) {
                Ok(()) => {
                    println!(
                        "Moved (deleted): {} -> {}",
                        source.display(),
                        target.display()
                    );
                    if let Some(parent) = source.parent() {
                        moved_parents.insert(parent.to_path_buf());
                    }
                }
                Err(e) => println!("Failed to move (delete) {}: {}", source.display(), e),
            }
        }

        Ok(())
    }

    fn render_moves(&self, plans: &[MovePlan]) -> String {
        let with_validity = self.validator.is_some();
        let mut builder = Builder::default();

        let mut header = vec!["File", "Type", "Target"];
        if with_validity {
            header.push("OMDb");
        }
        builder.push_record(header);

        for plan in plans {
            let file = plan
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| plan.source.display().to_string());
            let target = match &plan.target {
                Some(target) => target.display().to_string(),
                None => format!("- ({})", plan.skip.as_deref().unwrap_or("skipped")),
            };
            let mut row = vec![file, plan.kind.to_string(), target];
            if with_validity {
                row.push(match &plan.validity {
                    Some(Validity::Confirmed) => String::from("ok"),
                    Some(Validity::Mismatch(suggested)) => suggested.clone(),
                    Some(Validity::Unknown) | None => String::from("?"),
                });
            }
            builder.push_record(row);
        }

        builder.build().with(Style::rounded()).to_string()
    }
}

/// Header-only moves table for runs with nothing to scan.
pub fn empty_summary() -> String {
    let mut builder = Builder::default();
    builder.push_record(["File", "Type", "Target"]);
    builder.build().with(Style::rounded()).to_string()
}

fn render_cleanup(cleanup: &[(PathBuf, PathBuf)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["File", "Target"]);
    for (source, target) in cleanup {
        let file = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        builder.push_record([file, target.display().to_string()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn move_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if fs::rename(source, target).is_err() {
        // Source and target may be on different filesystems; copy, then
        // remove the original.
        fs::copy(source, target)?;
        fs::remove_file(source)?;
    }
    Ok(())
}

/// Remove `dir` if it is empty, then walk up removing empty parents,
/// stopping at `stop` (which is kept), at the first non-empty directory, or
/// on any error.
fn remove_empty_parents(dir: &Path, stop: &Path) {
    let mut current = dir.to_path_buf();
    while current != stop {
        match current.read_dir() {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    break;
                }
            }
            Err(_) => break,
        }
        if fs::remove_dir(&current).is_err() {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
}
