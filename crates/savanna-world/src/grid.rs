//! 2D occupancy grid for the savanna.

use rand::seq::SliceRandom;
use rand::Rng;
use savanna_core::{Direction, Error, Location, OrganismId, Result, Species};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a cell holds: an organism and its species tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    pub id: OrganismId,
    pub species: Species,
}

impl Occupant {
    pub fn new(id: OrganismId, species: Species) -> Self {
        Self { id, species }
    }
}

/// A bounded, non-wrapping grid holding at most one organism per cell.
///
/// The reverse index `positions` mirrors `cells` exactly: an id appears in
/// `positions` iff it occupies the cell it maps to.
#[derive(Debug, Clone)]
pub struct Field {
    depth: usize,
    width: usize,
    cells: Vec<Option<Occupant>>,
    positions: HashMap<OrganismId, Location>,
}

impl Field {
    pub fn new(depth: usize, width: usize) -> Result<Self> {
        if depth == 0 || width == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "field dimensions must be positive, got {depth}x{width}"
            )));
        }

        Ok(Self {
            depth,
            width,
            cells: vec![None; depth * width],
            positions: HashMap::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, location: Location) -> bool {
        location.row < self.depth && location.col < self.width
    }

    /// Put `occupant` at `location`, vacating its previous cell first.
    ///
    /// Whatever already sits at `location` is overwritten and loses its
    /// recorded position; callers check occupancy when that matters.
    pub fn place(&mut self, occupant: Occupant, location: Location) -> Result<()> {
        let index = self.index_of(location)?;

        if let Some(previous) = self.positions.remove(&occupant.id) {
            let previous_index = self.raw_index(previous);
            self.cells[previous_index] = None;
        }

        if let Some(evicted) = self.cells[index].replace(occupant) {
            if evicted.id != occupant.id {
                self.positions.remove(&evicted.id);
            }
        }
        self.positions.insert(occupant.id, location);
        Ok(())
    }

    /// Empty a cell. Clearing an empty cell is a no-op.
    pub fn clear(&mut self, location: Location) -> Result<Option<Occupant>> {
        let index = self.index_of(location)?;
        let removed = self.cells[index].take();
        if let Some(occupant) = removed {
            self.positions.remove(&occupant.id);
        }
        Ok(removed)
    }

    /// Remove `id` from wherever it stands and return that location.
    pub fn release(&mut self, id: OrganismId) -> Option<Location> {
        let location = self.positions.remove(&id)?;
        let index = self.raw_index(location);
        self.cells[index] = None;
        Some(location)
    }

    pub fn occupant_at(&self, location: Location) -> Result<Option<Occupant>> {
        let index = self.index_of(location)?;
        Ok(self.cells[index])
    }

    pub fn location_of(&self, id: OrganismId) -> Option<Location> {
        self.positions.get(&id).copied()
    }

    pub fn is_free(&self, location: Location) -> Result<bool> {
        Ok(self.occupant_at(location)?.is_none())
    }

    /// In-bounds neighbours of `location`, shuffled on every call.
    ///
    /// The shuffle keeps searches for food, mates and free cells from
    /// favouring any direction.
    pub fn adjacent_locations<R>(&self, location: Location, rng: &mut R) -> Result<Vec<Location>>
    where
        R: Rng + ?Sized,
    {
        self.index_of(location)?;

        let mut neighbors: Vec<Location> = Direction::all()
            .into_iter()
            .filter_map(|direction| location.step(direction))
            .filter(|neighbor| self.contains(*neighbor))
            .collect();
        neighbors.shuffle(rng);
        Ok(neighbors)
    }

    /// Unoccupied neighbours of `location`, in shuffled order.
    pub fn free_adjacent_locations<R>(
        &self,
        location: Location,
        rng: &mut R,
    ) -> Result<Vec<Location>>
    where
        R: Rng + ?Sized,
    {
        let mut neighbors = self.adjacent_locations(location, rng)?;
        neighbors.retain(|neighbor| self.cells[self.raw_index(*neighbor)].is_none());
        Ok(neighbors)
    }

    /// A random free neighbour, or `None` when the cell is boxed in.
    pub fn free_adjacent_location<R>(
        &self,
        location: Location,
        rng: &mut R,
    ) -> Result<Option<Location>>
    where
        R: Rng + ?Sized,
    {
        Ok(self.free_adjacent_locations(location, rng)?.into_iter().next())
    }

    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.positions.clear();
    }

    pub fn occupied_count(&self) -> usize {
        self.positions.len()
    }

    /// Get location from index
    pub fn index_to_location(&self, index: usize) -> Location {
        Location::new(index / self.width, index % self.width)
    }

    /// Iterator over all locations in row-major order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_location(i))
    }

    /// Iterator over all cells with locations, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Location, Option<Occupant>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_location(i), *cell))
    }

    /// Iterator over occupied cells only
    pub fn occupants(&self) -> impl Iterator<Item = (Location, Occupant)> + '_ {
        self.iter()
            .filter_map(|(location, cell)| cell.map(|occupant| (location, occupant)))
    }

    fn index_of(&self, location: Location) -> Result<usize> {
        if !self.contains(location) {
            return Err(Error::OutOfBounds {
                location,
                depth: self.depth,
                width: self.width,
            });
        }
        Ok(self.raw_index(location))
    }

    fn raw_index(&self, location: Location) -> usize {
        location.row * self.width + location.col
    }
}
