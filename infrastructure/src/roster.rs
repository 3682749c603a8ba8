//! Agent roster files for simulations.
//!
//! A roster lists the agents taking part and each one's preference
//! document, as JSON or TOML:
//!
//! ```toml
//! [[agents]]
//! id = "alice"
//! [agents.profile]
//! priorities = { cost = 8, speed = 4 }
//! ```

use accord_domain::AgentId;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON roster: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML roster: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Roster needs at least two agents, found {0}")]
    TooFewAgents(usize),

    #[error("Duplicate agent id in roster: {0}")]
    DuplicateAgent(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterAgent {
    pub id: AgentId,
    /// Opaque preference document
    #[serde(default)]
    pub profile: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentRoster {
    pub agents: Vec<RosterAgent>,
}

impl AgentRoster {
    /// Load by extension: `.json` is JSON, anything else TOML.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_toml(&text)
        }
    }

    pub fn from_json(text: &str) -> Result<Self, RosterError> {
        serde_json::from_str::<Self>(text)?.validated()
    }

    pub fn from_toml(text: &str) -> Result<Self, RosterError> {
        toml::from_str::<Self>(text)?.validated()
    }

    fn validated(self) -> Result<Self, RosterError> {
        if self.agents.len() < 2 {
            return Err(RosterError::TooFewAgents(self.agents.len()));
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if self.agents[..i].iter().any(|a| a.id == agent.id) {
                return Err(RosterError::DuplicateAgent(agent.id.to_string()));
            }
        }
        Ok(self)
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }
}
