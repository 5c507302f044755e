//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an organism within one run.
///
/// Ids are handed out sequentially by the simulation, so two runs with the
/// same seed allocate the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell coordinate in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`; `None` when that would go below zero.
    ///
    /// The upper bound is the field's business, not the coordinate's.
    pub fn step(&self, direction: Direction) -> Option<Self> {
        let (drow, dcol) = direction.to_delta();
        let row = self.row.checked_add_signed(drow)?;
        let col = self.col.checked_add_signed(dcol)?;
        Some(Self { row, col })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The eight compass neighbours of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// `(row, col)` delta; north is towards row 0.
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// Species living on the savanna
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Lion,
    Vulture,
    Rhino,
    Giraffe,
    Baboon,
    Plant,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Lion,
        Species::Vulture,
        Species::Rhino,
        Species::Giraffe,
        Species::Baboon,
        Species::Plant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Lion => "Lion",
            Species::Vulture => "Vulture",
            Species::Rhino => "Rhino",
            Species::Giraffe => "Giraffe",
            Species::Baboon => "Baboon",
            Species::Plant => "Plant",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Weather condition, redrawn once per simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rain,
    Fog,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Fog];
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weather::Clear => f.write_str("clear"),
            Weather::Rain => f.write_str("rain"),
            Weather::Fog => f.write_str("fog"),
        }
    }
}

/// An inclusive range of hours, e.g. 18..=23.
///
/// When `start > end` the window wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour <= self.end
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}
