//! # gossipsim: Deterministic Gossip Dissemination
//!
//! A seeded simulation of epidemic (gossip) spreading of a single rumor
//! over a static, undirected network. No async, no threads, no real
//! transport. Just a state machine advanced in discrete steps, emitting
//! one immutable snapshot per step.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────┐
//! │         Simulation          │ ← fixed step budget, emits Snapshots
//! │  ┌───────────────────────┐  │
//! │  │     GossipStepper      │  │ ← spreading rule, one step per call
//! │  │  ┌─────────────────┐  │  │
//! │  │  │   GossipState    │  │  │ ← informed set + inform steps
//! │  │  └─────────────────┘  │  │
//! │  │  ┌─────────────────┐  │  │
//! │  │  │  ChoiceSource    │  │  │ ← SplitMix64, seeded
//! │  │  └─────────────────┘  │  │
//! │  │  ┌─────────────────┐  │  │
//! │  │  │    Topology      │  │  │ ← immutable neighbor lookup
//! │  │  └─────────────────┘  │  │
//! │  └───────────────────────┘  │
//! └─────────────────────────────┘
//! ```

pub mod config;
pub mod dsl;
pub mod error;
pub mod explorer;
pub mod node;
pub mod rng;
pub mod simulation;
pub mod snapshot;
pub mod state;
pub mod step;
pub mod stepper;
pub mod topology;

// Re-exports for convenience.
pub use config::{ScenarioFile, SimulationConfig};
pub use dsl::SimulationBuilder;
pub use error::{GossipError, GossipResult};
pub use explorer::{ExplorationResult, Explorer, NamedProperty, Property};
pub use node::NodeId;
pub use rng::{ChoiceSource, DeterministicRng, ScriptedChoices};
pub use simulation::{Simulation, Snapshots};
pub use snapshot::{run_digest, NodeStatus, Renderer, Snapshot};
pub use state::GossipState;
pub use step::Step;
pub use stepper::{GossipStepper, StepReport, Transmission};
pub use topology::Topology;
