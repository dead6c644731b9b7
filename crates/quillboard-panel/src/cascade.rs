//! Cascading selection over an N-level chain of dependent fields.
//!
//! Level `k + 1` draws its options from the value selected at level `k`:
//! a static list, a map keyed by the parent value, or a remote endpoint whose
//! template names the parent field in braces (`/api/countries/{country_id}/states`).
//!
//! Selecting at level `k` clears every deeper level and resolves options for
//! level `k + 1` only. Remote loads are split into [`CascadeResolver::select`],
//! which hands back a [`PendingLoad`], and [`CascadeResolver::complete`]. Each
//! load carries the level's generation at the time it was issued, so results
//! for a parent value that has since changed are dropped.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::form::{SelectOption, option_label};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'a>>;

/// Loads options for a remote level.
pub trait OptionFetcher: Send + Sync {
    fn fetch<'a>(&'a self, endpoint: &'a str) -> FetchFuture<'a>;
}

#[derive(Debug, Clone)]
pub enum OptionSource {
    Static(Vec<SelectOption>),
    /// Options keyed by the parent's selected value.
    Map(HashMap<String, Vec<SelectOption>>),
    /// Endpoint template; `{parent_name}` is replaced by the parent value.
    Remote(String),
}

#[derive(Debug, Clone)]
pub struct CascadeLevel {
    pub name: String,
    pub label: String,
    pub source: OptionSource,
}

impl CascadeLevel {
    pub fn new(name: impl Into<String>, label: impl Into<String>, source: OptionSource) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            source,
        }
    }

    pub fn placeholder(&self) -> String {
        format!("Select {}", self.label.to_lowercase())
    }
}

/// Fills `{parent}` in `template` with `value`.
pub fn expand_endpoint(template: &str, parent: Option<&str>, value: &str) -> String {
    match parent {
        Some(parent) => template.replace(&format!("{{{parent}}}"), value),
        None => template.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
struct LevelState {
    value: String,
    options: Vec<SelectOption>,
    loading: bool,
    generation: u64,
}

/// A remote option load issued for one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub level: usize,
    pub generation: u64,
    pub endpoint: String,
}

impl PendingLoad {
    /// Runs the fetch. Failures are logged and resolve to no options.
    pub async fn run(self, fetcher: &dyn OptionFetcher) -> LoadedOptions {
        let options = match fetcher.fetch(&self.endpoint).await {
            Ok(options) => options,
            Err(error) => {
                warn!(endpoint = %self.endpoint, %error, "Failed to load dependent options");
                Vec::new()
            }
        };
        LoadedOptions {
            level: self.level,
            generation: self.generation,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedOptions {
    pub level: usize,
    pub generation: u64,
    pub options: Vec<SelectOption>,
}

/// What a consumer needs after a selection: the field written, its label,
/// the levels that were cleared and, once known, the next level's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeChange {
    pub name: String,
    pub value: String,
    pub label: Option<String>,
    pub cleared: Vec<String>,
    pub next_options: Option<Vec<SelectOption>>,
}

/// Either the next level resolved on the spot or a remote load to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready(Vec<SelectOption>),
    Pending(PendingLoad),
    /// Selected the last level.
    None,
}

pub struct CascadeResolver {
    levels: Vec<CascadeLevel>,
    state: Vec<LevelState>,
    fetcher: Arc<dyn OptionFetcher>,
    disabled: bool,
}

impl CascadeResolver {
    pub fn new(levels: Vec<CascadeLevel>, fetcher: Arc<dyn OptionFetcher>) -> Self {
        let state = vec![LevelState::default(); levels.len()];
        Self {
            levels,
            state,
            fetcher,
            disabled: false,
        }
    }

    pub fn levels(&self) -> &[CascadeLevel] {
        &self.levels
    }

    pub fn fetcher(&self) -> Arc<dyn OptionFetcher> {
        Arc::clone(&self.fetcher)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name == name)
    }

    pub fn value(&self, level: usize) -> Option<&str> {
        self.state
            .get(level)
            .map(|s| s.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn options(&self, level: usize) -> &[SelectOption] {
        self.state.get(level).map_or(&[], |s| s.options.as_slice())
    }

    pub fn is_loading(&self, level: usize) -> bool {
        self.state.get(level).is_some_and(|s| s.loading)
    }

    /// Disabled while the form is, while loading, or while the parent is empty.
    pub fn is_disabled(&self, level: usize) -> bool {
        if self.disabled || self.is_loading(level) {
            return true;
        }
        level > 0 && self.value(level - 1).is_none()
    }

    /// Plans the option lookup for `level` from its parent's current value.
    fn plan(&mut self, level: usize) -> Resolution {
        let Some(config) = self.levels.get(level) else {
            return Resolution::None;
        };
        let parent_value = if level == 0 {
            None
        } else {
            match self.value(level - 1) {
                Some(v) => Some(v.to_string()),
                None => return Resolution::Ready(Vec::new()),
            }
        };

        match &config.source {
            OptionSource::Static(options) => Resolution::Ready(options.clone()),
            OptionSource::Map(map) => Resolution::Ready(
                parent_value
                    .and_then(|v| map.get(&v).cloned())
                    .unwrap_or_default(),
            ),
            OptionSource::Remote(template) => {
                let parent = level.checked_sub(1).map(|p| self.levels[p].name.as_str());
                let endpoint = expand_endpoint(template, parent, parent_value.as_deref().unwrap_or(""));
                let state = &mut self.state[level];
                state.generation += 1;
                state.loading = true;
                Resolution::Pending(PendingLoad {
                    level,
                    generation: state.generation,
                    endpoint,
                })
            }
        }
    }

    fn apply_plan(&mut self, level: usize, resolution: &Resolution) {
        if let (Resolution::Ready(options), Some(state)) = (resolution, self.state.get_mut(level)) {
            state.options = options.clone();
            state.loading = false;
        }
    }

    /// Writes `value` at `level`, clears deeper levels and resolves the next
    /// one. Unknown levels yield `None`.
    pub fn select(&mut self, level: usize, value: impl Into<String>) -> Option<(CascadeChange, Resolution)> {
        if level >= self.levels.len() {
            return None;
        }
        let value = value.into();
        self.state[level].value = value.clone();

        let mut cleared = Vec::new();
        for deeper in level + 1..self.levels.len() {
            let state = &mut self.state[deeper];
            state.value.clear();
            state.options.clear();
            state.loading = false;
            // Invalidate loads issued for the old parent value.
            state.generation += 1;
            cleared.push(self.levels[deeper].name.clone());
        }

        let resolution = self.plan(level + 1);
        self.apply_plan(level + 1, &resolution);

        let change = CascadeChange {
            name: self.levels[level].name.clone(),
            label: option_label(self.options(level), &value).map(str::to_string),
            value,
            cleared,
            next_options: match &resolution {
                Resolution::Ready(options) => Some(options.clone()),
                _ => None,
            },
        };
        debug!(field = %change.name, value = %change.value, "Cascade selection");
        Some((change, resolution))
    }

    /// Applies a finished load. Returns false when the load is stale.
    pub fn complete(&mut self, loaded: LoadedOptions) -> bool {
        let Some(state) = self.state.get_mut(loaded.level) else {
            return false;
        };
        if state.generation != loaded.generation {
            debug!(level = loaded.level, "Dropping stale option load");
            return false;
        }
        state.options = loaded.options;
        state.loading = false;
        true
    }

    /// Selects and waits for the next level's options.
    pub async fn select_and_resolve(&mut self, level: usize, value: impl Into<String>) -> Option<CascadeChange> {
        let (mut change, resolution) = self.select(level, value)?;
        if let Resolution::Pending(pending) = resolution {
            let fetcher = self.fetcher();
            let loaded = pending.run(fetcher.as_ref()).await;
            let next_level = loaded.level;
            if self.complete(loaded) {
                change.next_options = Some(self.options(next_level).to_vec());
            }
        }
        Some(change)
    }

    async fn resolve(&mut self, level: usize) {
        let resolution = self.plan(level);
        match resolution {
            Resolution::Pending(pending) => {
                let fetcher = self.fetcher();
                let loaded = pending.run(fetcher.as_ref()).await;
                self.complete(loaded);
            }
            ready => self.apply_plan(level, &ready),
        }
    }

    /// Loads level 0, then walks down the chain resolving each level whose
    /// parent already holds a value. Levels below an empty parent are cleared.
    pub async fn hydrate<F>(&mut self, mut initial: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for level in 0..self.levels.len() {
            let parent_set = level == 0 || self.value(level - 1).is_some();
            if !parent_set {
                let state = &mut self.state[level];
                state.value.clear();
                state.options.clear();
                state.loading = false;
                continue;
            }
            self.state[level].value = initial(&self.levels[level].name).unwrap_or_default();
            self.resolve(level).await;
        }
    }
}
