//! Terrain grid decoded from a save file and its text rendering

use super::GRID_SIZE;
use crate::explode::ExplodeReader;
use crate::{DecodeError, Result};
use bitflags::bitflags;
use std::fmt;
use std::io::Read;

bitflags! {
    /// Terrain bits of one map cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u16 {
        /// Trees
        const TREE = 0x1;
        /// Rocks
        const ROCK = 0x2;
        /// Water
        const WATER = 0x4;
        /// Any building
        const BUILDING = 0x8;
        /// Scrub land
        const SCRUB = 0x10;
        /// Gardens
        const GARDEN = 0x20;
        /// Roads
        const ROAD = 0x40;
        /// Within reach of a reservoir
        const RESERVOIR_RANGE = 0x80;
        /// Aqueducts
        const AQUEDUCT = 0x100;
        /// Raised ground
        const ELEVATION = 0x200;
        /// Ramps onto raised ground
        const ACCESS_RAMP = 0x400;
        /// Meadow
        const MEADOW = 0x800;
        /// Rubble
        const RUBBLE = 0x1000;
        /// Within reach of a fountain
        const FOUNTAIN_RANGE = 0x2000;
        /// Walls
        const WALL = 0x4000;
        /// Gatehouses
        const GATEHOUSE = 0x8000;
        /// Cells beyond the playable map carry both tree and water bits
        const OUTSIDE_MAP = Self::TREE.bits() | Self::WATER.bits();
    }
}

/// Symbol for each terrain kind, first match wins
const SYMBOLS: [(TerrainFlags, char); 14] = [
    (TerrainFlags::TREE, 'Y'),
    (TerrainFlags::ROCK, 'O'),
    (TerrainFlags::WATER, '~'),
    (TerrainFlags::BUILDING, 'B'),
    (TerrainFlags::SCRUB, 'v'),
    (TerrainFlags::GARDEN, 'z'),
    (TerrainFlags::ROAD, '='),
    (TerrainFlags::AQUEDUCT, '|'),
    (TerrainFlags::ELEVATION, '/'),
    (TerrainFlags::ACCESS_RAMP, '\\'),
    (TerrainFlags::WALL, 'w'),
    (TerrainFlags::GATEHOUSE, 'W'),
    (TerrainFlags::MEADOW, '_'),
    (TerrainFlags::RUBBLE, ';'),
];

/// Map symbol for a cell, or `None` outside the playable map
pub fn terrain_symbol(flags: TerrainFlags) -> Option<char> {
    if flags.contains(TerrainFlags::OUTSIDE_MAP) {
        return None;
    }

    let symbol = SYMBOLS
        .iter()
        .find(|(kind, _)| flags.intersects(*kind))
        .map_or('.', |&(_, symbol)| symbol);
    Some(symbol)
}

/// Square grid of terrain cells, stored row by row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    size: usize,
    cells: Vec<u16>,
}

impl TerrainGrid {
    /// Build a grid from raw cell values; `cells` must hold `size * size`
    /// values.
    pub fn new(size: usize, cells: Vec<u16>) -> Result<Self> {
        let (expected, expected_bytes) = grid_extent(size)?;
        if cells.len() != expected {
            return Err(DecodeError::TruncatedTerrain {
                expected: expected_bytes,
                actual: cells.len().saturating_mul(2),
            });
        }
        Ok(Self { size, cells })
    }

    /// Pull `size * size` little-endian 16-bit cells out of a chunk
    pub fn decode<R: Read>(chunk: &mut ExplodeReader<R>, size: usize) -> Result<Self> {
        let (count, expected_bytes) = grid_extent(size)?;
        // Grows past a standard map only as the chunk delivers cells
        let mut cells = Vec::with_capacity(count.min(GRID_SIZE * GRID_SIZE));

        while cells.len() < count {
            match (chunk.next_byte()?, chunk.next_byte()?) {
                (Some(low), Some(high)) => cells.push(u16::from_le_bytes([low, high])),
                _ => {
                    return Err(DecodeError::TruncatedTerrain {
                        expected: expected_bytes,
                        actual: chunk.stats().bytes_emitted,
                    })
                }
            }
        }

        Ok(Self { size, cells })
    }

    /// Width and height of the grid
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw cell values, row by row
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Flags of the cell at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<TerrainFlags> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(TerrainFlags::from_bits_retain(self.cells[y * self.size + x]))
    }

    /// Iterate over rows of flags
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = TerrainFlags> + '_> + '_ {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|&cell| TerrainFlags::from_bits_retain(cell)))
    }

    /// Count cells that have any of `kind`'s bits set
    pub fn count(&self, kind: TerrainFlags) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| TerrainFlags::from_bits_retain(cell).intersects(kind))
            .count()
    }

    /// Write the map as text, one line per row. Rows lying entirely outside
    /// the map are omitted.
    pub fn render<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.filter_map(terrain_symbol).collect();
            if !line.is_empty() {
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }
}

/// Cell count and byte size of a `size` x `size` grid
fn grid_extent(size: usize) -> Result<(usize, usize)> {
    size.checked_mul(size)
        .and_then(|count| Some((count, count.checked_mul(2)?)))
        .ok_or(DecodeError::GridTooLarge(size))
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}
