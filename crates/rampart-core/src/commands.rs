//! Player commands sent from the surrounding application to the engine.
//!
//! Commands are queued and processed at the next tick boundary. Invalid
//! commands (bad placement, nothing left to deploy, raid already over)
//! are absorbed without faulting.

use serde::{Deserialize, Serialize};

use crate::enums::UnitKind;
use crate::types::Position;

/// All possible player actions during a raid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Begin the raid; opens the deployment window.
    StartRaid,
    /// Drop one unit of the given kind at a position.
    Deploy { kind: UnitKind, position: Position },
    /// Concede: stop deploying and let the raid wind down.
    EndRaid,
}
