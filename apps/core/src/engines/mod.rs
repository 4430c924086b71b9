//! # Reply Engines
//!
//! Interchangeable reply backends behind the [`ChatEngine`] trait, selected
//! by [`EngineKind`] from configuration.

pub mod dad;
pub mod echo;
pub mod traits;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::brain::BrainsEngine;
use crate::error::AppError;

pub use dad::DadEngine;
pub use echo::EchoEngine;
pub use traits::ChatEngine;

/// Which reply backend to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Rule-based offline engine
    #[default]
    Brains,
    /// Repeats the input
    Echo,
    /// Canned dad persona
    Dad,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Brains => "brains",
            EngineKind::Echo => "echo",
            EngineKind::Dad => "dad",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EngineKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brains" | "brain" => Ok(EngineKind::Brains),
            "echo" => Ok(EngineKind::Echo),
            "dad" => Ok(EngineKind::Dad),
            other => Err(AppError::Config(format!("Unknown engine '{}'", other))),
        }
    }
}

/// Builds the engine for `kind`. Only the rule-based engine uses the delay.
pub fn build(kind: EngineKind, thinking_delay: Duration) -> Arc<dyn ChatEngine> {
    match kind {
        EngineKind::Brains => Arc::new(BrainsEngine::new(thinking_delay)),
        EngineKind::Echo => Arc::new(EchoEngine),
        EngineKind::Dad => Arc::new(DadEngine),
    }
}
