use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::{self, AppConfig};
use crate::render::Renderer;
use crate::timer::schedule::{BuildOutcome, Diagnostic, Level, TimerBuilder};
use crate::timer::Timer;

/// Where the timer comes from: round dates in the config file, or a phase
/// feed produced elsewhere. Loading again is how the display reloads.
#[derive(Debug, Clone, Default)]
pub struct TimerSource {
    pub config_path: Option<PathBuf>,
    pub feed_path: Option<PathBuf>,
}

/// A loaded configuration together with the timer built from it.
pub struct Loaded {
    pub config: AppConfig,
    pub outcome: BuildOutcome,
}

impl TimerSource {
    pub fn new(config_path: Option<PathBuf>, feed_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            feed_path,
        }
    }

    pub fn load(&self) -> Result<Loaded> {
        let config = config::load_config(self.config_path.as_deref())?;

        let outcome = match &self.feed_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read phase feed: {}", path.display()))?;
                let timer = Timer::from_json(&json)
                    .with_context(|| format!("Failed to parse phase feed: {}", path.display()))?;
                feed_outcome(timer, path)
            }
            None => TimerBuilder::new(Local).build(&config.timer),
        };
        outcome.log();

        Ok(Loaded { config, outcome })
    }

    /// Load and require a timer.
    pub fn load_timer(&self) -> Result<(AppConfig, Timer)> {
        let Loaded { config, outcome } = self.load()?;
        let timer = outcome
            .timer
            .context("No timer configured: declare at least one valid [[timer.hours]] entry or pass --feed")?;
        Ok((config, timer))
    }

    /// Reload into `renderer`, keeping the current phases on failure.
    /// Returns the fresh configuration when new phases were installed.
    pub fn reload_into(&self, renderer: &mut Renderer) -> Option<AppConfig> {
        match self.load() {
            Ok(Loaded {
                config,
                outcome: BuildOutcome { timer: Some(timer), .. },
            }) => {
                tracing::info!(
                    previous = renderer.timer().phases.len(),
                    phases = timer.phases.len(),
                    "timer reloaded"
                );
                renderer.replace_timer(timer);
                Some(config)
            }
            Ok(_) => {
                tracing::warn!("reloaded configuration has no timer, keeping previous phases");
                None
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "timer reload failed, keeping previous phases");
                None
            }
        }
    }
}

fn feed_outcome(timer: Timer, path: &std::path::Path) -> BuildOutcome {
    let mut diagnostics = Vec::new();
    if timer.valid_phase_count() == 0 {
        diagnostics.push(Diagnostic {
            level: Level::Warning,
            location: path.display().to_string(),
            message: "the feed has no usable phase, the display will stay blank".into(),
        });
    }
    let flagged = timer.phases.len() - timer.valid_phase_count();
    if flagged > 0 {
        diagnostics.push(Diagnostic {
            level: Level::Info,
            location: path.display().to_string(),
            message: format!("{flagged} flagged phase(s) will be skipped"),
        });
    }
    BuildOutcome {
        timer: Some(timer),
        diagnostics,
    }
}
