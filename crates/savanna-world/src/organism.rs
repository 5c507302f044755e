//! Organism state and the shared life cycle.
//!
//! Every species runs the same `act` algorithm; what differs is looked up in
//! its [`SpeciesParameters`]: diet, mating, sleep window and weather
//! sensitivity.

use crate::clock::EnvironmentClock;
use crate::grid::{Field, Occupant};
use rand::Rng;
use savanna_core::{
    Error, Gender, Location, Mating, OrganismId, Result, Species, SpeciesParameters, SpeciesTable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Why an organism died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Overcrowding,
    Eaten,
}

/// Behaviour mode selected for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Active,
    Sleeping,
    WeatherBlocked,
}

/// How a single `act` call ended for the acting organism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Died(DeathCause),
    /// Slept through the tick without moving
    Slept,
    /// Kept from feeding by the weather; wandered to a free cell
    Sheltered(Location),
    /// A plant with room around it stayed where it is
    Rooted,
    Moved(Location),
    Fed { prey: Occupant, at: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub fate: Fate,
    /// Offspring placed on the field this tick
    pub births: u32,
}

impl Outcome {
    fn new(fate: Fate, births: u32) -> Self {
        Self { fate, births }
    }

    pub fn died(&self) -> bool {
        matches!(self.fate, Fate::Died(_))
    }
}

/// Starting state for a new organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub gender: Gender,
    pub age: u32,
    pub food_level: u32,
}

impl Profile {
    /// Age zero and fully fed.
    pub fn newborn<R>(params: &SpeciesParameters, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            gender: draw_gender(params, rng),
            age: 0,
            food_level: params.diet.satiation(),
        }
    }

    /// Random age below the species maximum and random hunger, as used when
    /// seeding a fresh field.
    pub fn random<R>(params: &SpeciesParameters, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let age = rng.gen_range(0..params.max_age.max(1));
        let satiation = params.diet.satiation();
        let food_level = if satiation > 0 {
            rng.gen_range(0..satiation)
        } else {
            0
        };
        Self {
            gender: draw_gender(params, rng),
            age,
            food_level,
        }
    }
}

fn draw_gender<R>(params: &SpeciesParameters, rng: &mut R) -> Gender
where
    R: Rng + ?Sized,
{
    if rng.gen::<f32>() < params.male_birth_rate {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// Sequential id source; ids are never reused within a run.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> OrganismId {
        let id = OrganismId(self.next);
        self.next += 1;
        id
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Everything an organism may look at or change while acting.
///
/// `others` holds every organism on the field except the one acting,
/// including newborns of the current tick.
pub struct Habitat<'a, R: ?Sized> {
    pub field: &'a mut Field,
    pub others: &'a mut HashMap<OrganismId, Organism>,
    pub clock: &'a EnvironmentClock,
    pub species: &'a SpeciesTable,
    pub ids: &'a mut IdAllocator,
    pub newborns: &'a mut Vec<OrganismId>,
    pub rng: &'a mut R,
}

/// An individual of any species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organism {
    id: OrganismId,
    species: Species,
    alive: bool,
    age: u32,
    food_level: u32,
    gender: Gender,
}

impl Organism {
    pub fn new(id: OrganismId, species: Species, profile: Profile) -> Self {
        Self {
            id,
            species,
            alive: true,
            age: profile.age,
            food_level: profile.food_level,
            gender: profile.gender,
        }
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn occupant(&self) -> Occupant {
        Occupant::new(self.id, self.species)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn food_level(&self) -> u32 {
        self.food_level
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Mark dead and free the cell it occupied.
    pub fn set_dead(&mut self, field: &mut Field, cause: DeathCause) {
        self.alive = false;
        let location = field.release(self.id);
        trace!(
            organism_id = %self.id,
            species = %self.species,
            age = self.age,
            cause = ?cause,
            location = ?location,
            "Organism died"
        );
    }

    /// Which behaviour applies at the clock's current hour and weather.
    pub fn mode(&self, params: &SpeciesParameters, clock: &EnvironmentClock) -> Mode {
        if params.is_asleep(clock.hour()) {
            Mode::Sleeping
        } else if params.is_grounded_by(clock.weather()) {
            Mode::WeatherBlocked
        } else {
            Mode::Active
        }
    }

    /// Live through one tick.
    ///
    /// The caller must take this organism out of `habitat.others` first and
    /// must never call `act` on a dead organism.
    pub fn act<R>(&mut self, habitat: &mut Habitat<'_, R>) -> Result<Outcome>
    where
        R: Rng + ?Sized,
    {
        if !self.alive {
            return Err(Error::DeadOrganism(self.id));
        }

        let table: &SpeciesTable = habitat.species;
        let params = table.get(self.species)?;
        let location = habitat
            .field
            .location_of(self.id)
            .ok_or(Error::UnknownOrganism(self.id))?;

        self.age += 1;
        if self.age > params.max_age {
            return Ok(self.die(habitat.field, DeathCause::OldAge, 0));
        }

        if !params.diet.is_sessile() {
            self.food_level = self.food_level.saturating_sub(1);
            if self.food_level == 0 {
                return Ok(self.die(habitat.field, DeathCause::Starvation, 0));
            }
        }

        let mode = self.mode(params, habitat.clock);
        let mut births = 0;
        let mut meal = None;
        let destination = match mode {
            Mode::Sleeping => {
                self.food_level += 1;
                return Ok(Outcome::new(Fate::Slept, 0));
            }
            Mode::WeatherBlocked => {
                self.food_level += 1;
                habitat.field.free_adjacent_location(location, habitat.rng)?
            }
            Mode::Active => {
                births = self.give_birth(params, location, habitat)?;
                meal = self.find_food(params, location, habitat)?;
                match meal {
                    Some((_, at)) => Some(at),
                    None => habitat.field.free_adjacent_location(location, habitat.rng)?,
                }
            }
        };

        let Some(destination) = destination else {
            return Ok(self.die(habitat.field, DeathCause::Overcrowding, births));
        };

        if params.diet.is_sessile() {
            return Ok(Outcome::new(Fate::Rooted, births));
        }

        habitat.field.place(self.occupant(), destination)?;

        let fate = match meal {
            Some((prey, at)) => Fate::Fed { prey, at },
            None if mode == Mode::WeatherBlocked => Fate::Sheltered(destination),
            None => Fate::Moved(destination),
        };
        Ok(Outcome::new(fate, births))
    }

    fn die(&mut self, field: &mut Field, cause: DeathCause, births: u32) -> Outcome {
        self.set_dead(field, cause);
        Outcome::new(Fate::Died(cause), births)
    }

    /// Eat the first live adjacent organism on the menu.
    fn find_food<R>(
        &mut self,
        params: &SpeciesParameters,
        location: Location,
        habitat: &mut Habitat<'_, R>,
    ) -> Result<Option<(Occupant, Location)>>
    where
        R: Rng + ?Sized,
    {
        if params.diet.is_sessile() {
            return Ok(None);
        }

        for neighbor in habitat.field.adjacent_locations(location, habitat.rng)? {
            let Some(occupant) = habitat.field.occupant_at(neighbor)? else {
                continue;
            };
            let Some(food_value) = params.diet.food_value(occupant.species) else {
                continue;
            };
            let prey = habitat
                .others
                .get_mut(&occupant.id)
                .ok_or(Error::UnknownOrganism(occupant.id))?;
            if !prey.is_alive() {
                continue;
            }

            prey.set_dead(habitat.field, DeathCause::Eaten);
            self.food_level = food_value;
            trace!(
                organism_id = %self.id,
                species = %self.species,
                prey_id = %occupant.id,
                prey_species = %occupant.species,
                "Organism fed"
            );
            return Ok(Some((occupant, neighbor)));
        }

        Ok(None)
    }

    /// Place any offspring in free adjacent cells and report how many.
    fn give_birth<R>(
        &mut self,
        params: &SpeciesParameters,
        location: Location,
        habitat: &mut Habitat<'_, R>,
    ) -> Result<u32>
    where
        R: Rng + ?Sized,
    {
        let free = habitat.field.free_adjacent_locations(location, habitat.rng)?;
        let litter = self.breed(params, location, habitat)?;

        let mut births = 0;
        for spot in free.into_iter().take(litter as usize) {
            let id = habitat.ids.allocate();
            let young = Organism::new(id, self.species, Profile::newborn(params, habitat.rng));
            habitat.field.place(young.occupant(), spot)?;
            habitat.others.insert(id, young);
            habitat.newborns.push(id);
            births += 1;
        }

        if births > 0 {
            trace!(
                organism_id = %self.id,
                species = %self.species,
                litter,
                births,
                "Organism gave birth"
            );
        }
        Ok(births)
    }

    /// Litter size for this tick; zero when not breeding.
    fn breed<R>(
        &self,
        params: &SpeciesParameters,
        location: Location,
        habitat: &mut Habitat<'_, R>,
    ) -> Result<u32>
    where
        R: Rng + ?Sized,
    {
        if !self.can_breed(params, location, habitat)? {
            return Ok(0);
        }
        if habitat.rng.gen::<f64>() <= params.breeding_probability {
            Ok(habitat.rng.gen_range(1..=params.max_litter_size))
        } else {
            Ok(0)
        }
    }

    fn can_breed<R>(
        &self,
        params: &SpeciesParameters,
        location: Location,
        habitat: &mut Habitat<'_, R>,
    ) -> Result<bool>
    where
        R: Rng + ?Sized,
    {
        if params.mating == Mating::Sexual && self.gender == Gender::Male {
            return Ok(false);
        }
        if self.age <= params.breeding_age {
            return Ok(false);
        }

        for neighbor in habitat.field.adjacent_locations(location, habitat.rng)? {
            let Some(occupant) = habitat.field.occupant_at(neighbor)? else {
                continue;
            };
            if occupant.species != self.species {
                continue;
            }
            let partner = habitat
                .others
                .get(&occupant.id)
                .ok_or(Error::UnknownOrganism(occupant.id))?;
            if !partner.is_alive() {
                continue;
            }
            match params.mating {
                Mating::Pollination => return Ok(true),
                Mating::Sexual if partner.gender == Gender::Male => return Ok(true),
                Mating::Sexual => {}
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use savanna_core::Weather;

    /// A field plus a population store small enough to drive `act` by hand.
    struct Patch {
        field: Field,
        organisms: HashMap<OrganismId, Organism>,
        clock: EnvironmentClock,
        species: SpeciesTable,
        ids: IdAllocator,
        newborns: Vec<OrganismId>,
        rng: ChaCha8Rng,
    }

    impl Patch {
        fn new(depth: usize, width: usize) -> Self {
            Self {
                field: Field::new(depth, width).unwrap(),
                organisms: HashMap::new(),
                clock: EnvironmentClock::at(12, Weather::Clear),
                species: SpeciesTable::default(),
                ids: IdAllocator::default(),
                newborns: Vec::new(),
                rng: ChaCha8Rng::seed_from_u64(17),
            }
        }

        fn add(&mut self, species: Species, location: Location, profile: Profile) -> OrganismId {
            let id = self.ids.allocate();
            let organism = Organism::new(id, species, profile);
            self.field.place(organism.occupant(), location).unwrap();
            self.organisms.insert(id, organism);
            id
        }

        fn act(&mut self, id: OrganismId) -> Result<Outcome> {
            let mut actor = self.organisms.remove(&id).unwrap();
            let mut habitat = Habitat {
                field: &mut self.field,
                others: &mut self.organisms,
                clock: &self.clock,
                species: &self.species,
                ids: &mut self.ids,
                newborns: &mut self.newborns,
                rng: &mut self.rng,
            };
            let outcome = actor.act(&mut habitat);
            self.organisms.insert(id, actor);
            outcome
        }

        fn organism(&self, id: OrganismId) -> &Organism {
            &self.organisms[&id]
        }
    }

    fn profile(gender: Gender, age: u32, food_level: u32) -> Profile {
        Profile {
            gender,
            age,
            food_level,
        }
    }

    #[test]
    fn test_organism_creation() {
        let organism = Organism::new(
            OrganismId(3),
            Species::Giraffe,
            profile(Gender::Female, 4, 9),
        );
        assert_eq!(organism.id(), OrganismId(3));
        assert_eq!(organism.species(), Species::Giraffe);
        assert_eq!(organism.age(), 4);
        assert_eq!(organism.food_level(), 9);
        assert!(organism.is_alive());
    }

    #[test]
    fn test_newborn_profile() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let lion = Profile::newborn(&SpeciesParameters::lion(), &mut rng);
        assert_eq!(lion.age, 0);
        assert_eq!(lion.food_level, 23);

        let plant = Profile::newborn(&SpeciesParameters::plant(), &mut rng);
        assert_eq!(plant.food_level, 0);
    }

    #[test]
    fn test_random_profile_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let params = SpeciesParameters::rhino();
        for _ in 0..200 {
            let p = Profile::random(&params, &mut rng);
            assert!(p.age < params.max_age);
            assert!(p.food_level < params.diet.satiation());
        }
    }

    #[test]
    fn test_gender_follows_male_birth_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut params = SpeciesParameters::baboon();
        params.male_birth_rate = 1.0;
        assert_eq!(Profile::newborn(&params, &mut rng).gender, Gender::Male);
        params.male_birth_rate = 0.0;
        assert_eq!(Profile::newborn(&params, &mut rng).gender, Gender::Female);
    }

    #[test]
    fn test_dies_of_old_age() {
        let mut patch = Patch::new(3, 3);
        let id = patch.add(Species::Rhino, Location::new(1, 1), profile(Gender::Male, 40, 10));

        let outcome = patch.act(id).unwrap();
        assert_eq!(outcome.fate, Fate::Died(DeathCause::OldAge));
        assert!(!patch.organism(id).is_alive());
        assert_eq!(patch.field.occupied_count(), 0);
    }

    #[test]
    fn test_starves() {
        let mut patch = Patch::new(3, 3);
        let id = patch.add(Species::Baboon, Location::new(0, 0), profile(Gender::Male, 2, 1));

        let outcome = patch.act(id).unwrap();
        assert_eq!(outcome.fate, Fate::Died(DeathCause::Starvation));
        assert_eq!(patch.field.location_of(id), None);
    }

    #[test]
    fn test_overcrowding_frees_cell() {
        let mut patch = Patch::new(3, 3);
        let centre = Location::new(1, 1);
        let rhino = patch.add(Species::Rhino, centre, profile(Gender::Male, 2, 10));
        for location in patch.field.adjacent_locations(centre, &mut patch.rng).unwrap() {
            patch.add(Species::Lion, location, profile(Gender::Male, 10, 20));
        }

        let outcome = patch.act(rhino).unwrap();
        assert_eq!(outcome.fate, Fate::Died(DeathCause::Overcrowding));
        assert!(!patch.organism(rhino).is_alive());
        assert!(patch.field.is_free(centre).unwrap());
        assert_eq!(patch.field.occupied_count(), 8);
    }

    #[test]
    fn test_moves_to_free_cell() {
        let mut patch = Patch::new(3, 3);
        let id = patch.add(Species::Giraffe, Location::new(1, 1), profile(Gender::Male, 2, 5));

        let outcome = patch.act(id).unwrap();
        let Fate::Moved(to) = outcome.fate else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_ne!(to, Location::new(1, 1));
        assert!(to.row.abs_diff(1) <= 1 && to.col.abs_diff(1) <= 1);
        assert_eq!(patch.field.location_of(id), Some(to));
        assert!(patch.field.is_free(Location::new(1, 1)).unwrap());
        assert_eq!(patch.organism(id).age(), 3);
        assert_eq!(patch.organism(id).food_level(), 4);
    }

    #[test]
    fn test_predator_eats_adjacent_prey() {
        let mut patch = Patch::new(1, 2);
        let lion = patch.add(Species::Lion, Location::new(0, 0), profile(Gender::Male, 10, 5));
        let rhino = patch.add(Species::Rhino, Location::new(0, 1), profile(Gender::Female, 3, 5));

        let outcome = patch.act(lion).unwrap();
        assert_eq!(
            outcome.fate,
            Fate::Fed {
                prey: Occupant::new(rhino, Species::Rhino),
                at: Location::new(0, 1)
            }
        );
        assert!(!patch.organism(rhino).is_alive());
        assert_eq!(patch.organism(lion).food_level(), 23);
        assert_eq!(patch.field.location_of(lion), Some(Location::new(0, 1)));
        assert_eq!(patch.field.occupied_count(), 1);
    }

    #[test]
    fn test_predator_ignores_non_prey() {
        let mut patch = Patch::new(1, 2);
        let lion = patch.add(Species::Lion, Location::new(0, 0), profile(Gender::Male, 10, 5));
        patch.add(Species::Baboon, Location::new(0, 1), profile(Gender::Male, 3, 5));

        let outcome = patch.act(lion).unwrap();
        assert_eq!(outcome.fate, Fate::Died(DeathCause::Overcrowding));
    }

    #[test]
    fn test_sleeping_keeps_hunger_and_place() {
        let mut patch = Patch::new(3, 3);
        patch.clock = EnvironmentClock::at(20, Weather::Clear);
        let vulture = patch.add(
            Species::Vulture,
            Location::new(1, 1),
            profile(Gender::Male, 20, 5),
        );

        let outcome = patch.act(vulture).unwrap();
        assert_eq!(outcome.fate, Fate::Slept);
        assert_eq!(patch.organism(vulture).food_level(), 5);
        assert_eq!(patch.organism(vulture).age(), 21);
        assert_eq!(patch.field.location_of(vulture), Some(Location::new(1, 1)));
    }

    #[test]
    fn test_sleeping_survives_when_boxed_in() {
        let mut patch = Patch::new(3, 3);
        patch.clock = EnvironmentClock::at(4, Weather::Clear);
        let centre = Location::new(1, 1);
        let lion = patch.add(Species::Lion, centre, profile(Gender::Female, 10, 5));
        for location in patch.field.adjacent_locations(centre, &mut patch.rng).unwrap() {
            patch.add(Species::Vulture, location, profile(Gender::Male, 20, 5));
        }

        let outcome = patch.act(lion).unwrap();
        assert_eq!(outcome.fate, Fate::Slept);
        assert!(patch.organism(lion).is_alive());
    }

    #[test]
    fn test_rhino_sleeps_in_the_evening() {
        let mut patch = Patch::new(1, 2);
        patch.clock = EnvironmentClock::at(20, Weather::Clear);
        let rhino = patch.add(Species::Rhino, Location::new(0, 0), profile(Gender::Male, 3, 4));
        let plant = patch.add(Species::Plant, Location::new(0, 1), profile(Gender::Female, 3, 0));

        let outcome = patch.act(rhino).unwrap();
        assert_eq!(outcome.fate, Fate::Slept);
        assert_eq!(patch.organism(rhino).food_level(), 4);
        assert!(patch.organism(plant).is_alive());
    }

    #[test]
    fn test_giraffe_grazes_in_the_evening() {
        let mut patch = Patch::new(1, 2);
        patch.clock = EnvironmentClock::at(20, Weather::Clear);
        let giraffe = patch.add(Species::Giraffe, Location::new(0, 0), profile(Gender::Male, 3, 4));
        patch.add(Species::Plant, Location::new(0, 1), profile(Gender::Female, 3, 0));

        let outcome = patch.act(giraffe).unwrap();
        assert!(matches!(outcome.fate, Fate::Fed { .. }));
    }

    #[test]
    fn test_weather_blocks_hunting() {
        let mut patch = Patch::new(1, 3);
        patch.clock = EnvironmentClock::at(12, Weather::Fog);
        let lion = patch.add(Species::Lion, Location::new(0, 1), profile(Gender::Male, 10, 5));
        let rhino = patch.add(Species::Rhino, Location::new(0, 0), profile(Gender::Male, 3, 5));

        let outcome = patch.act(lion).unwrap();
        assert_eq!(outcome.fate, Fate::Sheltered(Location::new(0, 2)));
        assert!(patch.organism(rhino).is_alive());
        assert_eq!(patch.organism(lion).food_level(), 5);
    }

    #[test]
    fn test_weather_only_blocks_sensitive_species() {
        let mut patch = Patch::new(1, 2);
        patch.clock = EnvironmentClock::at(12, Weather::Rain);
        let vulture = patch.add(
            Species::Vulture,
            Location::new(0, 0),
            profile(Gender::Male, 20, 5),
        );
        patch.add(Species::Baboon, Location::new(0, 1), profile(Gender::Male, 3, 5));

        let outcome = patch.act(vulture).unwrap();
        assert!(matches!(outcome.fate, Fate::Fed { .. }));
        assert_eq!(patch.organism(vulture).food_level(), 9);
    }

    #[test]
    fn test_female_breeds_next_to_male() {
        let mut patch = Patch::new(3, 3);
        let giraffe = patch.species.get_mut(Species::Giraffe).unwrap();
        giraffe.breeding_probability = 1.0;
        giraffe.max_litter_size = 1;

        let mother = patch.add(
            Species::Giraffe,
            Location::new(1, 1),
            profile(Gender::Female, 6, 8),
        );
        patch.add(Species::Giraffe, Location::new(0, 1), profile(Gender::Male, 6, 8));

        let outcome = patch.act(mother).unwrap();
        assert_eq!(outcome.births, 1);
        assert_eq!(patch.newborns.len(), 1);

        let young = patch.organism(patch.newborns[0]);
        assert_eq!(young.age(), 0);
        assert_eq!(young.species(), Species::Giraffe);
        assert_eq!(young.food_level(), 10);
        assert!(patch.field.location_of(young.id()).is_some());
        assert_eq!(patch.field.occupied_count(), 3);
    }

    #[test]
    fn test_litter_bounded_by_free_cells() {
        let mut patch = Patch::new(1, 3);
        let giraffe = patch.species.get_mut(Species::Giraffe).unwrap();
        giraffe.breeding_probability = 1.0;
        giraffe.max_litter_size = 4;

        let mother = patch.add(
            Species::Giraffe,
            Location::new(0, 1),
            profile(Gender::Female, 6, 8),
        );
        patch.add(Species::Giraffe, Location::new(0, 0), profile(Gender::Male, 6, 8));

        let outcome = patch.act(mother).unwrap();
        assert_eq!(outcome.births, 1);
        // The only free cell went to the calf, so the mother is boxed in.
        assert_eq!(outcome.fate, Fate::Died(DeathCause::Overcrowding));
    }

    #[test]
    fn test_no_breeding_without_male() {
        let mut patch = Patch::new(3, 3);
        patch.species.get_mut(Species::Rhino).unwrap().breeding_probability = 1.0;
        let mother = patch.add(Species::Rhino, Location::new(1, 1), profile(Gender::Female, 6, 8));
        patch.add(Species::Rhino, Location::new(0, 1), profile(Gender::Female, 6, 8));

        assert_eq!(patch.act(mother).unwrap().births, 0);
        assert!(patch.newborns.is_empty());
    }

    #[test]
    fn test_males_and_juveniles_do_not_breed() {
        let mut patch = Patch::new(3, 3);
        patch.species.get_mut(Species::Rhino).unwrap().breeding_probability = 1.0;
        let male = patch.add(Species::Rhino, Location::new(1, 1), profile(Gender::Male, 6, 8));
        let young = patch.add(Species::Rhino, Location::new(0, 1), profile(Gender::Female, 4, 8));
        patch.add(Species::Rhino, Location::new(0, 0), profile(Gender::Male, 6, 8));

        assert_eq!(patch.act(male).unwrap().births, 0);
        // Age 4 ticks over to 5, which does not exceed the breeding age.
        assert_eq!(patch.act(young).unwrap().births, 0);
        assert!(patch.newborns.is_empty());
    }

    #[test]
    fn test_plant_stays_rooted() {
        let mut patch = Patch::new(3, 3);
        let plant = patch.add(Species::Plant, Location::new(1, 1), profile(Gender::Female, 0, 0));

        let outcome = patch.act(plant).unwrap();
        assert_eq!(outcome.fate, Fate::Rooted);
        assert_eq!(patch.field.location_of(plant), Some(Location::new(1, 1)));
        assert_eq!(patch.organism(plant).food_level(), 0);
    }

    #[test]
    fn test_plants_pollinate_regardless_of_gender() {
        let mut patch = Patch::new(3, 3);
        let plant_params = patch.species.get_mut(Species::Plant).unwrap();
        plant_params.breeding_probability = 1.0;
        plant_params.max_litter_size = 1;

        let plant = patch.add(Species::Plant, Location::new(1, 1), profile(Gender::Male, 5, 0));
        patch.add(Species::Plant, Location::new(1, 0), profile(Gender::Male, 5, 0));

        let outcome = patch.act(plant).unwrap();
        assert_eq!(outcome.births, 1);
        assert_eq!(outcome.fate, Fate::Rooted);
    }

    #[test]
    fn test_grazer_eats_plant() {
        let mut patch = Patch::new(1, 2);
        let baboon = patch.add(Species::Baboon, Location::new(0, 0), profile(Gender::Male, 3, 2));
        let plant = patch.add(Species::Plant, Location::new(0, 1), profile(Gender::Female, 3, 0));

        let outcome = patch.act(baboon).unwrap();
        assert!(matches!(outcome.fate, Fate::Fed { .. }));
        assert!(!patch.organism(plant).is_alive());
        assert_eq!(patch.organism(baboon).food_level(), 10);
    }

    #[test]
    fn test_dead_organism_cannot_act() {
        let mut patch = Patch::new(2, 2);
        let id = patch.add(Species::Rhino, Location::new(0, 0), profile(Gender::Male, 40, 10));
        patch.act(id).unwrap();

        let err = patch.act(id).unwrap_err();
        assert!(matches!(err, Error::DeadOrganism(dead) if dead == id));
        assert!(err.is_invariant_violation());
    }
}
