//! Population counts and the viability verdict.

use crate::grid::Field;
use savanna_core::{Species, ViabilityPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-species population counts from one scan of the field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    counts: BTreeMap<Species, usize>,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every cell once and tally occupants by species.
    pub fn recompute(&mut self, field: &Field) {
        self.counts.clear();
        for (_, occupant) in field.occupants() {
            *self.counts.entry(occupant.species).or_insert(0) += 1;
        }
    }

    pub fn scan(field: &Field) -> Self {
        let mut census = Self::new();
        census.recompute(field);
        census
    }

    pub fn count(&self, species: Species) -> usize {
        self.counts.get(&species).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of species with at least one living member
    pub fn species_present(&self) -> usize {
        self.counts.values().filter(|&&count| count > 0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, usize)> + '_ {
        self.counts.iter().map(|(species, count)| (*species, *count))
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (species, count) in self.iter().filter(|(_, count)| *count > 0) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{species}: {count}")?;
            first = false;
        }
        Ok(())
    }
}

/// Decides from a census whether a run is still worth continuing
pub trait ViabilityRule: Send + Sync {
    fn is_viable(&self, census: &Census) -> bool;
}

impl ViabilityRule for ViabilityPolicy {
    fn is_viable(&self, census: &Census) -> bool {
        match self {
            ViabilityPolicy::AnySurvivor => census.total() > 0,
            ViabilityPolicy::DistinctSpecies { min } => census.species_present() >= *min,
        }
    }
}

impl<F> ViabilityRule for F
where
    F: Fn(&Census) -> bool + Send + Sync,
{
    fn is_viable(&self, census: &Census) -> bool {
        self(census)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupant;
    use savanna_core::{Location, OrganismId};

    fn populated() -> Field {
        let mut field = Field::new(3, 3).unwrap();
        let placements = [
            (Species::Lion, Location::new(0, 0)),
            (Species::Rhino, Location::new(0, 1)),
            (Species::Rhino, Location::new(1, 1)),
            (Species::Plant, Location::new(2, 2)),
        ];
        for (id, (species, location)) in placements.into_iter().enumerate() {
            field
                .place(Occupant::new(OrganismId(id as u64), species), location)
                .unwrap();
        }
        field
    }

    #[test]
    fn test_counts() {
        let census = Census::scan(&populated());
        assert_eq!(census.count(Species::Rhino), 2);
        assert_eq!(census.count(Species::Lion), 1);
        assert_eq!(census.count(Species::Vulture), 0);
        assert_eq!(census.total(), 4);
        assert_eq!(census.species_present(), 3);
    }

    #[test]
    fn test_recompute_replaces_previous_counts() {
        let mut field = populated();
        let mut census = Census::scan(&field);
        field.clear_all();
        census.recompute(&field);
        assert_eq!(census.total(), 0);
        assert_eq!(census, Census::new());
    }

    #[test]
    fn test_display() {
        let census = Census::scan(&populated());
        assert_eq!(census.to_string(), "Lion: 1 Rhino: 2 Plant: 1");
        assert_eq!(Census::new().to_string(), "");
    }

    #[test]
    fn test_serializes_counts_by_species_name() {
        let census = Census::scan(&populated());
        let json = serde_json::to_value(&census).unwrap();
        assert_eq!(json["counts"]["Rhino"], 2);
        assert_eq!(json["counts"]["Plant"], 1);

        let back: Census = serde_json::from_value(json).unwrap();
        assert_eq!(back, census);
    }

    #[test]
    fn test_viability_policies() {
        let census = Census::scan(&populated());
        let empty = Census::new();

        assert!(ViabilityPolicy::AnySurvivor.is_viable(&census));
        assert!(!ViabilityPolicy::AnySurvivor.is_viable(&empty));
        assert!(ViabilityPolicy::DistinctSpecies { min: 3 }.is_viable(&census));
        assert!(!ViabilityPolicy::DistinctSpecies { min: 4 }.is_viable(&census));
        assert!(!ViabilityPolicy::default().is_viable(&empty));
    }

    #[test]
    fn test_closure_rule() {
        let predators_alive = |c: &Census| c.count(Species::Lion) + c.count(Species::Vulture) > 0;
        assert!(predators_alive.is_viable(&Census::scan(&populated())));
        assert!(!predators_alive.is_viable(&Census::new()));
    }
}
