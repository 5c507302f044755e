//! World simulation engine.
//!
//! This module implements the bounded 2D field where predators, grazers and
//! plants age, feed, breed and die, driven by a shared environmental clock.

pub mod census;
pub mod clock;
pub mod grid;
pub mod organism;
pub mod render;
pub mod simulation;

pub use census::{Census, ViabilityRule};
pub use clock::EnvironmentClock;
pub use grid::{Field, Occupant};
pub use organism::{DeathCause, Fate, Habitat, IdAllocator, Mode, Organism, Outcome, Profile};
pub use render::{RenderSink, TextRenderer};
pub use simulation::{RunState, Simulation};
