//! Save-file container
//!
//! A save opens with a short preamble, then a run of length-prefixed
//! compressed chunks. The terrain grid sits behind the image, edge and
//! building-id grids, which are skipped without decoding.

mod chunk;
mod terrain;

pub use chunk::{read_chunk_length, read_compressed_chunk, skip_compressed_chunk};
pub use terrain::{terrain_symbol, TerrainFlags, TerrainGrid};

use crate::explode::ExplodeOptions;
use crate::Result;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Side length of the map grid
pub const GRID_SIZE: usize = 162;

/// Where the terrain chunk lives inside a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveLayout {
    /// Bytes before the first chunk
    pub preamble_len: u64,
    /// Chunks skipped before the terrain chunk
    pub chunks_before_terrain: usize,
    /// Side length of the terrain grid
    pub grid_size: usize,
}

impl Default for SaveLayout {
    fn default() -> Self {
        Self {
            preamble_len: 8,
            chunks_before_terrain: 3,
            grid_size: GRID_SIZE,
        }
    }
}

/// Reads terrain out of a save file
#[derive(Debug)]
pub struct SaveReader<R> {
    source: R,
    layout: SaveLayout,
    options: ExplodeOptions,
}

impl SaveReader<BufReader<File>> {
    /// Open a save file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> SaveReader<R> {
    /// Wrap a seekable source positioned anywhere; reads start from offset 0
    pub fn new(source: R) -> Self {
        Self {
            source,
            layout: SaveLayout::default(),
            options: ExplodeOptions::default(),
        }
    }

    /// Use a different layout
    pub fn with_layout(mut self, layout: SaveLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Use different decoder options
    pub fn with_options(mut self, options: ExplodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Layout in use
    pub fn layout(&self) -> &SaveLayout {
        &self.layout
    }

    /// Locate and decode the terrain grid
    pub fn read_terrain(&mut self) -> Result<TerrainGrid> {
        self.source.seek(SeekFrom::Start(self.layout.preamble_len))?;

        for index in 0..self.layout.chunks_before_terrain {
            let length = skip_compressed_chunk(&mut self.source)?;
            debug!("chunk {} skipped ({} bytes)", index, length);
        }

        let grid_size = self.layout.grid_size;
        let grid = read_compressed_chunk(&mut self.source, self.options, |chunk| {
            TerrainGrid::decode(chunk, grid_size)
        })?;

        debug!("terrain grid decoded: {0}x{0}", grid.size());
        Ok(grid)
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }
}
