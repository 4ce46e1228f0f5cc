//! # Stellar Core
//!
//! Deterministic game-economy and fleet-simulation engine for Stellar Dominion.
//!
//! This crate contains **only** stateless game logic:
//! - No rendering
//! - No IO (configuration is parsed from strings handed in by the caller)
//! - No wall clock (every operation takes `now` explicitly)
//! - No background ticking (state is recomputed on read)
//!
//! This separation enables:
//! - Replaying any stored entity at any instant
//! - Calling the engine from request handlers and jobs alike
//! - Deterministic tests without clock mocking
//!
//! ## Crate Structure
//!
//! - [`config`] - Versioned game configuration tables
//! - [`economy`] - Production, storage, energy, cost and upgrade formulas
//! - [`queue`] - Shipyard and defense-factory construction queues
//! - [`fleet`] - Travel time and mission lifecycle
//! - [`ship_generator`] - Procedural ship naming, rarity and stats
//! - [`progression`] - Reputation level curve
//! - [`document`] - Hydration of possibly-absent persisted documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod document;
pub mod economy;
pub mod error;
pub mod fleet;
pub mod planet;
pub mod progression;
pub mod queue;
pub mod resources;
pub mod reward;
pub mod ship_generator;
pub mod time;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        BiomeConfig, CostCurve, DefenseConfig, GameConfig, ResearchConfig, ShipConfig,
        SpeedMultipliers, StructureConfig,
    };
    pub use crate::economy::{ResearchLevels, UpgradeCheck, UpgradeStart};
    pub use crate::error::{EngineError, Result};
    pub use crate::fleet::{
        FleetMovement, FleetOrder, MissionHandler, MissionType, MovementEvent, MovementStatus,
        ShipManifest,
    };
    pub use crate::planet::{ConstructionWindow, Planet, Position, Structure};
    pub use crate::progression::User;
    pub use crate::queue::{Admission, ConstructionQueue, FacilityKind, QueueResolution};
    pub use crate::resources::{ResourceCost, ResourceKind, ResourceLedger, ResourcePayload};
    pub use crate::ship_generator::{Rarity, Ship, ShipBlueprint, ShipComponent, ShipStats};
    pub use crate::time::Timestamp;
}
