//! Deterministic per-block tile selection.
//!
//! Every 128-unit block seeds its own generator from a string key built
//! from its corner, so a block's pattern never depends on which other
//! blocks were generated or in what order.

use crate::config::TileGranularity;
use crate::vec::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

pub const SEED_PREFIX: &str = "cutout_tile";
pub const MATERIAL_SEED_PREFIX: &str = "cutout_tile_mat";

/// Cells per block side before any coarsening.
pub const CELLS_PER_SIDE: usize = 4;
pub const CELL_SIZE: i32 = 32;

/// 64-bit FNV-1a of `key`. Same value on every target.
pub fn seed_of(key: &str) -> u64 {
    key.as_bytes().iter().fold(0xcbf2_9ce4_8422_2325, |h: u64, &b| {
        (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Build a generator whose stream depends only on `key`.
pub fn seeded_rng(key: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed_of(key))
}

/// Seed key for a block, e.g. `"cutout_tile0 -128 64"`.
pub fn block_seed(prefix: &str, corner: Vec3) -> String {
    format!("{}{}", prefix, corner.join(" "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Opaque tile using the surface's own material.
    Full,
    /// Thin filler tile.
    Glue,
    /// Nothing; the backing shows through.
    Empty,
}

/// Outcome of every tile of one block, indexed `[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    side: usize,
    kinds: Vec<CellKind>,
}

impl TileGrid {
    fn new(side: usize) -> Self {
        Self {
            side,
            kinds: vec![CellKind::Empty; side * side],
        }
    }

    /// Tiles along one side of the block.
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, x: usize, y: usize) -> CellKind {
        self.kinds[x * self.side + y]
    }

    fn set(&mut self, x: usize, y: usize, kind: CellKind) {
        self.kinds[x * self.side + y] = kind;
    }

    /// `(x, y, kind)` in row-major order, X outermost.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellKind)> + '_ {
        let side = self.side;
        self.kinds
            .iter()
            .enumerate()
            .map(move |(i, kind)| (i / side, i % side, *kind))
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }
}

/// Cell centres that must always produce a full tile.
///
/// A location is consumed the first time a block claims it.
#[derive(Debug, Clone, Default)]
pub struct ForcedLocations {
    locations: FxHashSet<Vec3>,
}

impl ForcedLocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, loc: Vec3) -> bool {
        self.locations.insert(loc)
    }

    /// Force the two cells nearest `loc`. A point halfway between tiles forces both.
    pub fn insert_around(&mut self, loc: Vec3) {
        self.insert((loc - (15, 15, 0)).snap_to_cell_center());
        self.insert((loc + (15, 15, 0)).snap_to_cell_center());
    }

    pub fn contains(&self, loc: &Vec3) -> bool {
        self.locations.contains(loc)
    }

    /// Remove `loc`, returning whether it was forced.
    pub fn take(&mut self, loc: &Vec3) -> bool {
        self.locations.remove(loc)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl FromIterator<Vec3> for ForcedLocations {
    fn from_iter<T: IntoIterator<Item = Vec3>>(iter: T) -> Self {
        Self {
            locations: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CellSampler {
    /// Percent chance in `0..=100` that a cell gets a full tile.
    pub tile_chance: i32,
    /// Percent chance that a cell without a full tile gets a glue tile.
    pub glue_chance: i32,
}

impl CellSampler {
    pub fn new(tile_chance: i32, glue_chance: i32) -> Self {
        Self {
            tile_chance,
            glue_chance,
        }
    }

    /// Random outcome of each of the 16 cells of the block at `corner`, ignoring forced cells.
    ///
    /// Sixteen full-tile draws come first, then one glue draw for each cell whose
    /// full draw failed, both in row-major order.
    pub fn draw(&self, corner: Vec3) -> [[CellKind; CELLS_PER_SIDE]; CELLS_PER_SIDE] {
        let mut rng = seeded_rng(&block_seed(SEED_PREFIX, corner));
        let full: [bool; CELLS_PER_SIDE * CELLS_PER_SIDE] =
            std::array::from_fn(|_| rng.gen_range(0..100) < self.tile_chance);

        let mut cells = [[CellKind::Empty; CELLS_PER_SIDE]; CELLS_PER_SIDE];
        for (x, column) in cells.iter_mut().enumerate() {
            for (y, cell) in column.iter_mut().enumerate() {
                *cell = if full[x * CELLS_PER_SIDE + y] {
                    CellKind::Full
                } else if rng.gen_range(0..100) < self.glue_chance {
                    CellKind::Glue
                } else {
                    CellKind::Empty
                };
            }
        }
        cells
    }

    /// Classify the tiles of the block whose lower corner is `corner`.
    ///
    /// Forced cell centres override the draw and are consumed from `forced`.
    /// With 2x2 granularity each 64-unit quadrant takes its lowest cell's
    /// outcome and is forced if any of its four cell centres is.
    pub fn sample(
        &self,
        corner: Vec3,
        granularity: TileGranularity,
        forced: &mut ForcedLocations,
    ) -> TileGrid {
        let cells = self.draw(corner);
        let side = granularity.tiles_per_side() as usize;
        let span = CELLS_PER_SIDE / side;
        let mut grid = TileGrid::new(side);

        for tx in 0..side {
            for ty in 0..side {
                let mut is_forced = false;
                for cx in tx * span..(tx + 1) * span {
                    for cy in ty * span..(ty + 1) * span {
                        let center = corner
                            + Vec3::new(
                                cx as i32 * CELL_SIZE + CELL_SIZE / 2,
                                cy as i32 * CELL_SIZE + CELL_SIZE / 2,
                                0,
                            );
                        // Consume every matching location, not just the first.
                        is_forced |= forced.take(&center);
                    }
                }
                let kind = if is_forced {
                    CellKind::Full
                } else {
                    cells[tx * span][ty * span]
                };
                grid.set(tx, ty, kind);
            }
        }
        grid
    }
}
