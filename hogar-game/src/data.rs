//! Module, question and roadmap catalog bundled with the crate.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::feedback::{FeedbackBands, Tone};
use crate::gating;

/// A choice within a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    #[serde(default)]
    pub points: u32,
    /// Copy shown for a moment before the module moves on
    #[serde(default)]
    pub consequence: Option<String>,
    /// Projected monthly savings in euros (savings missions only)
    #[serde(default)]
    pub savings: u32,
}

/// One scored question of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    /// Highest score any choice can award.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.choices.iter().map(|c| c.points).max().unwrap_or(0)
    }
}

/// A dashboard module and its question list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: u32,
    pub title: String,
    pub desc: String,
    /// Advertised point budget on the dashboard card
    #[serde(default)]
    pub points: u32,
    #[serde(default = "default_minutes")]
    pub minutes: u32,
    #[serde(default = "default_tone")]
    pub tone: Tone,
    /// When set, each answer's consequence is shown for this long before advancing
    #[serde(default)]
    pub consequence_delay_ms: Option<u64>,
    /// Missing bands means every completion is reported as a success
    #[serde(default)]
    pub feedback: Option<FeedbackBands>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_minutes() -> u32 {
    3
}

const fn default_tone() -> Tone {
    Tone::Primary
}

impl Module {
    #[must_use]
    pub fn question(&self, number: usize) -> Option<&Question> {
        number.checked_sub(1).and_then(|idx| self.questions.get(idx))
    }

    #[must_use]
    pub fn shows_consequences(&self) -> bool {
        self.consequence_delay_ms.is_some()
    }

    #[must_use]
    pub fn predecessor(&self) -> Option<u32> {
        gating::predecessor(self.id)
    }
}

/// A step of the legacy ten-stage roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub id: u32,
    pub title: String,
    pub desc: String,
    pub points: u32,
}

/// Container for all module data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModuleCatalog {
    pub modules: Vec<Module>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapStep>,
}

static STATIC_CATALOG: &str = include_str!("../assets/modules.json");

impl ModuleCatalog {
    /// Create empty catalog data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
            roadmap: Vec::new(),
        }
    }

    /// Load catalog data from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid catalog data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Catalog bundled with the crate, parsed once.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static() -> Result<&'static Self, CatalogError> {
        static CATALOG: OnceLock<Result<ModuleCatalog, String>> = OnceLock::new();
        CATALOG
            .get_or_init(|| Self::from_json(STATIC_CATALOG).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| CatalogError::Malformed(e.clone()))
    }

    #[must_use]
    pub fn module(&self, id: u32) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn module_count(&self) -> u32 {
        u32::try_from(self.modules.len()).unwrap_or(u32::MAX)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }
}

impl<'a> IntoIterator for &'a ModuleCatalog {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("module catalog is malformed: {0}")]
    Malformed(String),
}
