//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::{HourWindow, Species, Weather};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Food value of one prey species for a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreyValue {
    pub species: Species,
    /// Ticks the consumer can go without eating after this meal
    pub food_value: u32,
}

impl PreyValue {
    pub fn new(species: Species, food_value: u32) -> Self {
        Self { species, food_value }
    }
}

/// What a species lives on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diet {
    /// Sessile; never feeds and never moves
    Autotroph,
    /// Hunts or forages the listed species
    Consumer { prey: Vec<PreyValue> },
}

impl Diet {
    pub fn consumer(prey: impl IntoIterator<Item = PreyValue>) -> Self {
        Diet::Consumer {
            prey: prey.into_iter().collect(),
        }
    }

    /// Food value gained by eating `species`, if it is on the menu.
    pub fn food_value(&self, species: Species) -> Option<u32> {
        match self {
            Diet::Autotroph => None,
            Diet::Consumer { prey } => prey
                .iter()
                .find(|p| p.species == species)
                .map(|p| p.food_value),
        }
    }

    /// Food level of a newborn: the richest meal in the diet.
    pub fn satiation(&self) -> u32 {
        match self {
            Diet::Autotroph => 0,
            Diet::Consumer { prey } => prey.iter().map(|p| p.food_value).max().unwrap_or(0),
        }
    }

    pub fn is_sessile(&self) -> bool {
        matches!(self, Diet::Autotroph)
    }
}

/// How a species finds a partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mating {
    /// A female breeds next to a male of her own species
    Sexual,
    /// Any organism breeds next to another of its own species
    Pollination,
}

/// Life-history parameters of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParameters {
    /// Age an individual must exceed before it can breed
    pub breeding_age: u32,
    /// Age past which an individual dies
    pub max_age: u32,
    /// Chance of a litter on each eligible tick
    pub breeding_probability: f64,
    /// Upper bound on births per litter
    pub max_litter_size: u32,
    /// Chance that a newborn is male
    #[serde(default = "default_male_birth_rate")]
    pub male_birth_rate: f32,
    pub diet: Diet,
    pub mating: Mating,
    /// Hours during which the species sleeps
    #[serde(default)]
    pub sleep_window: Option<HourWindow>,
    /// Weather conditions that keep the species from feeding or breeding
    #[serde(default)]
    pub weather_sensitivity: Vec<Weather>,
}

fn default_male_birth_rate() -> f32 {
    0.5
}

impl SpeciesParameters {
    pub fn lion() -> Self {
        Self {
            breeding_age: 6,
            max_age: 45,
            breeding_probability: 0.4,
            max_litter_size: 6,
            male_birth_rate: default_male_birth_rate(),
            diet: Diet::consumer([
                PreyValue::new(Species::Rhino, 23),
                PreyValue::new(Species::Giraffe, 20),
            ]),
            mating: Mating::Sexual,
            sleep_window: Some(HourWindow::new(3, 6)),
            weather_sensitivity: vec![Weather::Rain, Weather::Fog],
        }
    }

    pub fn vulture() -> Self {
        Self {
            breeding_age: 15,
            max_age: 150,
            breeding_probability: 0.09,
            max_litter_size: 2,
            male_birth_rate: default_male_birth_rate(),
            diet: Diet::consumer([
                PreyValue::new(Species::Rhino, 9),
                PreyValue::new(Species::Baboon, 9),
            ]),
            mating: Mating::Sexual,
            sleep_window: Some(HourWindow::new(18, 23)),
            weather_sensitivity: vec![Weather::Fog],
        }
    }

    fn grazer(breeding_probability: f64) -> Self {
        Self {
            breeding_age: 5,
            max_age: 40,
            breeding_probability,
            max_litter_size: 4,
            male_birth_rate: default_male_birth_rate(),
            diet: Diet::consumer([PreyValue::new(Species::Plant, 10)]),
            mating: Mating::Sexual,
            sleep_window: None,
            weather_sensitivity: Vec::new(),
        }
    }

    /// The only grazer with a sleep window.
    pub fn rhino() -> Self {
        Self {
            sleep_window: Some(HourWindow::new(18, 23)),
            ..Self::grazer(0.4)
        }
    }

    pub fn giraffe() -> Self {
        Self::grazer(0.9)
    }

    pub fn baboon() -> Self {
        Self::grazer(0.07)
    }

    pub fn plant() -> Self {
        Self {
            breeding_age: 1,
            max_age: 60,
            breeding_probability: 0.5,
            max_litter_size: 2,
            male_birth_rate: default_male_birth_rate(),
            diet: Diet::Autotroph,
            mating: Mating::Pollination,
            sleep_window: None,
            weather_sensitivity: Vec::new(),
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Lion => Self::lion(),
            Species::Vulture => Self::vulture(),
            Species::Rhino => Self::rhino(),
            Species::Giraffe => Self::giraffe(),
            Species::Baboon => Self::baboon(),
            Species::Plant => Self::plant(),
        }
    }

    pub fn is_asleep(&self, hour: u8) -> bool {
        self.sleep_window.is_some_and(|w| w.contains(hour))
    }

    pub fn is_grounded_by(&self, weather: Weather) -> bool {
        self.weather_sensitivity.contains(&weather)
    }

    fn validate(&self, species: Species) -> Result<()> {
        let invalid = |msg: String| -> Result<()> {
            Err(Error::InvalidConfiguration(format!("{species}: {msg}")))
        };

        if self.max_age == 0 {
            return invalid("max_age must be positive".into());
        }
        if self.max_litter_size == 0 {
            return invalid("max_litter_size must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.breeding_probability) {
            return invalid(format!(
                "breeding_probability {} is outside [0, 1]",
                self.breeding_probability
            ));
        }
        if !(0.0..=1.0).contains(&self.male_birth_rate) {
            return invalid(format!(
                "male_birth_rate {} is outside [0, 1]",
                self.male_birth_rate
            ));
        }
        if let Some(window) = self.sleep_window {
            if window.start > 23 || window.end > 23 {
                return invalid(format!(
                    "sleep window {}..={} has hours past 23",
                    window.start, window.end
                ));
            }
        }
        if let Diet::Consumer { prey } = &self.diet {
            if prey.is_empty() {
                return invalid("a consumer needs at least one prey species".into());
            }
            if let Some(p) = prey.iter().find(|p| p.food_value == 0) {
                return invalid(format!("food value for {} must be positive", p.species));
            }
        }
        Ok(())
    }
}

/// Parameters for every species, keyed by species tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesTable(BTreeMap<Species, SpeciesParameters>);

impl SpeciesTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, species: Species, params: SpeciesParameters) {
        self.0.insert(species, params);
    }

    pub fn get(&self, species: Species) -> Result<&SpeciesParameters> {
        self.0.get(&species).ok_or_else(|| {
            Error::InvalidConfiguration(format!("no parameters configured for {species}"))
        })
    }

    pub fn get_mut(&mut self, species: Species) -> Option<&mut SpeciesParameters> {
        self.0.get_mut(&species)
    }

    pub fn contains(&self, species: Species) -> bool {
        self.0.contains_key(&species)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, &SpeciesParameters)> + '_ {
        self.0.iter().map(|(s, p)| (*s, p))
    }

    pub fn validate(&self) -> Result<()> {
        for (species, params) in self.iter() {
            params.validate(species)?;
        }
        Ok(())
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self(
            Species::ALL
                .iter()
                .map(|&s| (s, SpeciesParameters::defaults_for(s)))
                .collect(),
        )
    }
}

/// One link of the spawn priority chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub species: Species,
    pub probability: f64,
}

impl SpawnEntry {
    pub fn new(species: Species, probability: f64) -> Self {
        Self { species, probability }
    }
}

/// Spawn chain used when populating a fresh field.
///
/// Order matters: a cell claimed by an earlier entry never rolls for later ones.
pub fn default_spawn_chain() -> Vec<SpawnEntry> {
    vec![
        SpawnEntry::new(Species::Vulture, 0.01),
        SpawnEntry::new(Species::Lion, 0.01),
        SpawnEntry::new(Species::Giraffe, 0.02),
        SpawnEntry::new(Species::Baboon, 0.02),
        SpawnEntry::new(Species::Rhino, 0.4),
        SpawnEntry::new(Species::Plant, 0.2),
    ]
}

/// Built-in liveness policies for the census
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViabilityPolicy {
    /// At least one organism of any species
    AnySurvivor,
    /// At least `min` species with a non-zero population
    DistinctSpecies { min: usize },
}

impl Default for ViabilityPolicy {
    fn default() -> Self {
        ViabilityPolicy::DistinctSpecies { min: 2 }
    }
}

/// Field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of rows
    pub depth: usize,
    /// Number of columns
    pub width: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            depth: 80,
            width: 120,
        }
    }
}

/// Complete configuration of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub species: SpeciesTable,
    /// Spawn priority chain for `reset_and_populate`
    pub spawn: Vec<SpawnEntry>,
    pub viability: ViabilityPolicy,
    /// Steps between population log lines
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            species: SpeciesTable::default(),
            spawn: default_spawn_chain(),
            viability: ViabilityPolicy::default(),
            report_interval: 100,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.depth == 0 || self.world.width == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "field dimensions must be positive, got {}x{}",
                self.world.depth, self.world.width
            )));
        }

        self.species.validate()?;

        for entry in &self.spawn {
            if !(0.0..=1.0).contains(&entry.probability) {
                return Err(Error::InvalidConfiguration(format!(
                    "spawn probability {} for {} is outside [0, 1]",
                    entry.probability, entry.species
                )));
            }
            if !self.species.contains(entry.species) {
                return Err(Error::InvalidConfiguration(format!(
                    "{} is in the spawn chain but has no parameters",
                    entry.species
                )));
            }
        }

        if self.report_interval == 0 {
            return Err(Error::InvalidConfiguration(
                "report_interval must be positive".into(),
            ));
        }

        Ok(())
    }
}
