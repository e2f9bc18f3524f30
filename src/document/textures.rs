use crate::error::{CutoutError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Which way a tiled surface faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Facing up.
    Floor,
    /// Facing down.
    Ceiling,
}

impl Surface {
    /// +1 for floors, -1 for ceilings. Multiplying a Z offset by this mirrors floor geometry.
    pub fn sign(self) -> i32 {
        match self {
            Surface::Floor => 1,
            Surface::Ceiling => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Floor => "floor",
            Surface::Ceiling => "ceiling",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour category recorded for each tiled surface block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceColor {
    White,
    Black,
}

impl SurfaceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceColor::White => "white",
            SurfaceColor::Black => "black",
        }
    }
}

impl fmt::Display for SurfaceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic texture keys (`"white.floor"`, `"overlay.exit"`, ...) mapped to material names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureTable {
    entries: FxHashMap<String, SmolStr>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the stock tile and signage materials.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (key, mat) in [
            ("white.floor", "tile/white_floor_tile002a"),
            ("white.ceiling", "tile/white_ceiling_tile002a"),
            ("black.floor", "metal/black_floor_metal_001c"),
            ("black.ceiling", "metal/black_floor_metal_001c"),
            ("overlay.exit", "signage/signage_exit"),
            ("overlay.arrow", "signage/signage_overlay_arrow"),
            ("overlay.dot", "signage/signage_overlay_dot"),
            ("overlay.moon", "signage/signage_overlay_fling1"),
            ("overlay.pistonplatform", "signage/signage_overlay_pistonplatform1"),
            ("overlay.timer", "signage/indicator_lights/indicator_lights_timer"),
        ] {
            table.insert(key, mat);
        }
        table
    }

    pub fn insert(&mut self, key: &str, material: impl Into<SmolStr>) {
        self.entries.insert(key.to_ascii_lowercase(), material.into());
    }

    pub fn get(&self, key: &str) -> Result<&SmolStr> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .ok_or_else(|| CutoutError::MissingTexture(key.to_string()))
    }

    /// Material for a tile top of the given colour on the given surface.
    pub fn surface_material(&self, color: SurfaceColor, surface: Surface) -> Result<&SmolStr> {
        self.get(&format!("{}.{}", color, surface))
    }

    /// Casefolded materials of every `overlay.*` entry.
    pub fn overlay_materials(&self) -> FxHashSet<String> {
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with("overlay."))
            .map(|(_, mat)| mat.to_ascii_lowercase())
            .collect()
    }
}
