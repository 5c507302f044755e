//! Simulation engine for running a savanna.

use crate::census::{Census, ViabilityRule};
use crate::clock::EnvironmentClock;
use crate::grid::Field;
use crate::organism::{Habitat, IdAllocator, Organism, Profile};
use crate::render::RenderSink;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use savanna_core::{
    Error, Location, OrganismId, Result, SimulationConfig, SpawnEntry, Species, SpeciesTable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, event, info, instrument, warn, Level};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Freshly built or reset; no step taken yet
    Idle,
    /// Stepping, and the last census was viable
    Running,
    /// The last census was not viable
    Halted,
}

pub struct Simulation<R = ChaCha8Rng> {
    field: Field,
    organisms: HashMap<OrganismId, Organism>,
    // Acting order for the next tick; append-only between reconciliations
    living: Vec<OrganismId>,
    clock: EnvironmentClock,
    species: SpeciesTable,
    spawn: Vec<SpawnEntry>,
    census: Census,
    viability: Box<dyn ViabilityRule>,
    rng: R,
    ids: IdAllocator,
    steps: u64,
    state: RunState,
    report_interval: u64,
    total_births: u64,
    total_deaths: u64,
}

impl Simulation<ChaCha8Rng> {
    /// Build an empty simulation whose random stream comes from `config.seed`.
    pub fn seeded(config: SimulationConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::new(config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Build an empty, idle simulation. Call [`Simulation::reset_and_populate`]
    /// or [`Simulation::introduce`] to put organisms on the field.
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let SimulationConfig {
            world,
            species,
            spawn,
            viability,
            report_interval,
            ..
        } = config;

        Ok(Self {
            field: Field::new(world.depth, world.width)?,
            organisms: HashMap::new(),
            living: Vec::new(),
            clock: EnvironmentClock::new(),
            species,
            spawn,
            census: Census::new(),
            viability: Box::new(viability),
            rng,
            ids: IdAllocator::default(),
            steps: 0,
            state: RunState::Idle,
            report_interval,
            total_births: 0,
            total_deaths: 0,
        })
    }

    /// Replace the viability rule consulted after every step.
    pub fn with_viability(mut self, rule: Box<dyn ViabilityRule>) -> Self {
        self.viability = rule;
        self
    }

    /// Clear everything and seed the field from the configured spawn chain.
    pub fn reset_and_populate(&mut self) -> Result<()> {
        let spawn = self.spawn.clone();
        self.reset_and_populate_with(&spawn)
    }

    /// Clear everything and seed the field from `spawn`.
    ///
    /// Cells are visited in row-major order. For each cell the entries are
    /// tried in order and the first whose draw succeeds claims the cell, so
    /// an early entry shadows every later one. A species late in the chain
    /// spawns with probability `p * Π(1 - p_earlier)`, not `p`.
    pub fn reset_and_populate_with(&mut self, spawn: &[SpawnEntry]) -> Result<()> {
        for entry in spawn {
            self.species.get(entry.species)?;
        }

        self.field.clear_all();
        self.organisms.clear();
        self.living.clear();
        self.clock.reset();
        self.ids.reset();
        self.steps = 0;
        self.total_births = 0;
        self.total_deaths = 0;
        self.state = RunState::Idle;

        let locations: Vec<Location> = self.field.locations().collect();
        for location in locations {
            for entry in spawn {
                if self.rng.gen::<f64>() <= entry.probability {
                    let profile = Profile::random(self.species.get(entry.species)?, &mut self.rng);
                    self.insert(entry.species, location, profile)?;
                    break;
                }
            }
        }

        self.census.recompute(&self.field);
        info!(
            depth = self.field.depth(),
            width = self.field.width(),
            population = self.census.total(),
            census = %self.census,
            "Field populated"
        );
        Ok(())
    }

    /// Place one organism by hand. Fails if the cell is taken.
    pub fn introduce(
        &mut self,
        species: Species,
        location: Location,
        profile: Profile,
    ) -> Result<OrganismId> {
        self.species.get(species)?;
        if !self.field.is_free(location)? {
            return Err(Error::Occupied(location));
        }

        let id = self.insert(species, location, profile)?;
        self.census.recompute(&self.field);
        debug!(organism_id = %id, species = %species, location = %location, "Organism introduced");
        Ok(id)
    }

    fn insert(
        &mut self,
        species: Species,
        location: Location,
        profile: Profile,
    ) -> Result<OrganismId> {
        let id = self.ids.allocate();
        let organism = Organism::new(id, species, profile);
        self.field.place(organism.occupant(), location)?;
        self.organisms.insert(id, organism);
        self.living.push(id);
        Ok(id)
    }

    /// Execute one simulation step.
    ///
    /// An error from an organism ends the pass early. Whatever already
    /// happened is still reconciled, so the field and the living list agree,
    /// and the run is left `Halted`.
    pub fn step(&mut self) -> Result<()> {
        self.clock.advance(&mut self.rng);

        let mut newborns = Vec::new();
        let mut births = 0u64;
        let mut deaths = 0u64;
        let mut failure = None;

        // The list is frozen for the pass: newborns wait in their own buffer.
        for &id in &self.living {
            let Some(mut actor) = self.organisms.remove(&id) else {
                failure = Some(Error::UnknownOrganism(id));
                break;
            };
            // Eaten earlier in this pass
            if !actor.is_alive() {
                self.organisms.insert(id, actor);
                continue;
            }

            let mut habitat = Habitat {
                field: &mut self.field,
                others: &mut self.organisms,
                clock: &self.clock,
                species: &self.species,
                ids: &mut self.ids,
                newborns: &mut newborns,
                rng: &mut self.rng,
            };
            let outcome = actor.act(&mut habitat);
            self.organisms.insert(id, actor);

            match outcome {
                Ok(outcome) => {
                    births += u64::from(outcome.births);
                    if outcome.died() {
                        deaths += 1;
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let removed = self.remove_dead_organisms();
        let mut eaten_young = 0;
        for id in newborns {
            match self.organisms.get(&id) {
                Some(young) if young.is_alive() => self.living.push(id),
                _ => {
                    self.organisms.remove(&id);
                    eaten_young += 1;
                }
            }
        }

        self.total_births += births;
        self.total_deaths += removed + eaten_young;
        self.census.recompute(&self.field);

        if let Some(e) = failure {
            self.state = RunState::Halted;
            error!(
                step = self.steps,
                error = %e,
                invariant_violation = e.is_invariant_violation(),
                living = self.living.len(),
                "Step aborted, halting"
            );
            return Err(e);
        }

        self.steps += 1;
        debug_assert_eq!(self.field.occupied_count(), self.living.len());
        debug_assert_eq!(self.organisms.len(), self.living.len());

        debug!(
            step = self.steps,
            hour = self.clock.hour(),
            weather = %self.clock.weather(),
            births,
            deaths,
            living = self.living.len(),
            "Step reconciled"
        );

        self.update_state();
        Ok(())
    }

    /// Drop dead organisms from the living list and the store. Returns how
    /// many were removed.
    fn remove_dead_organisms(&mut self) -> u64 {
        let organisms = &mut self.organisms;
        let before = self.living.len();
        self.living.retain(|id| match organisms.get(id) {
            Some(organism) if organism.is_alive() => true,
            _ => {
                organisms.remove(id);
                false
            }
        });
        (before - self.living.len()) as u64
    }

    fn update_state(&mut self) {
        if self.viability.is_viable(&self.census) {
            self.state = RunState::Running;
        } else if self.state != RunState::Halted {
            self.state = RunState::Halted;
            warn!(
                step = self.steps,
                population = self.census.total(),
                census = %self.census,
                "Population no longer viable, halting"
            );
        }
    }

    /// Step up to `steps` times, stopping early once the population is no
    /// longer viable or the run is halted. Returns the number of steps
    /// executed.
    #[instrument(skip(self), fields(start = self.steps))]
    pub fn run_for(&mut self, steps: u64) -> Result<u64> {
        let mut executed = 0;
        while executed < steps && self.state != RunState::Halted && self.is_viable() {
            self.step()?;
            executed += 1;

            if self.steps % self.report_interval == 0 {
                self.emit_population_metrics();
            }
        }

        self.emit_run_summary(executed);
        Ok(executed)
    }

    /// Emit population metrics in the structured gauge format
    fn emit_population_metrics(&self) {
        info!(
            event = "population_metrics",
            step = self.steps,
            hour = self.clock.hour(),
            weather = %self.clock.weather(),
            total_population = self.census.total(),
            species_present = self.census.species_present(),
            total_births = self.total_births,
            total_deaths = self.total_deaths,
            census = %self.census,
            "Population metrics snapshot"
        );

        for (species, count) in self.census.iter() {
            event!(
                Level::INFO,
                gauge_name = "population",
                gauge_value = count,
                species = %species,
                step = self.steps,
                "Population gauge"
            );
        }
    }

    fn emit_run_summary(&self, executed: u64) {
        info!(
            event = "run_summary",
            steps_executed = executed,
            final_step = self.steps,
            state = ?self.state,
            total_population = self.census.total(),
            total_births = self.total_births,
            total_deaths = self.total_deaths,
            census = %self.census,
            "Run complete"
        );

        event!(
            Level::INFO,
            gauge_name = "final_population",
            gauge_value = self.census.total(),
            "Final population gauge"
        );
    }

    /// Hand the current field and census to a renderer.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.render(self.steps, &self.field, &self.census);
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn clock(&self) -> &EnvironmentClock {
        &self.clock
    }

    pub fn census(&self) -> &Census {
        &self.census
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    /// Living organisms in acting order
    pub fn living(&self) -> impl Iterator<Item = &Organism> + '_ {
        self.living.iter().filter_map(|id| self.organisms.get(id))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_viable(&self) -> bool {
        self.viability.is_viable(&self.census)
    }
}
