//! Read-only snapshots of the field.

use crate::census::Census;
use crate::grid::Field;
use savanna_core::Species;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::warn;

/// Receives the field after a step. Implementations must not mutate it.
pub trait RenderSink {
    fn render(&mut self, step: u64, field: &Field, census: &Census);
}

/// Draws the field as one character per cell.
pub struct TextRenderer<W = io::Stdout> {
    out: W,
    glyphs: BTreeMap<Species, char>,
    empty: char,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            glyphs: default_glyphs(),
            empty: '.',
        }
    }

    pub fn with_glyph(mut self, species: Species, glyph: char) -> Self {
        self.glyphs.insert(species, glyph);
        self
    }

    pub fn glyph(&self, species: Species) -> char {
        self.glyphs.get(&species).copied().unwrap_or('?')
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// The full frame as text: header, one line per row, census line.
    pub fn frame(&self, step: u64, field: &Field, census: &Census) -> String {
        let mut text = String::with_capacity((field.width() + 1) * (field.depth() + 2));
        text.push_str(&format!("Step: {step}\n"));

        for (location, cell) in field.iter() {
            text.push(match cell {
                Some(occupant) => self.glyph(occupant.species),
                None => self.empty,
            });
            if location.col + 1 == field.width() {
                text.push('\n');
            }
        }

        text.push_str(&format!("Population: {census}\n"));
        text
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn render(&mut self, step: u64, field: &Field, census: &Census) {
        let frame = self.frame(step, field, census);
        if let Err(e) = self.out.write_all(frame.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, step, "Failed to write frame");
        }
    }
}

fn default_glyphs() -> BTreeMap<Species, char> {
    BTreeMap::from([
        (Species::Lion, 'L'),
        (Species::Vulture, 'V'),
        (Species::Rhino, 'R'),
        (Species::Giraffe, 'G'),
        (Species::Baboon, 'B'),
        (Species::Plant, '*'),
    ])
}
