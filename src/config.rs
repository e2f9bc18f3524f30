//! Generation options and the material table.
//!
//! Options can be loaded from JSON or from the flat key/value property list
//! attached to a map condition. Material roles are a closed set: an unknown
//! role is rejected when the config is loaded, never at generation time.

use crate::document::{Surface, SurfaceColor};
use crate::error::{CutoutError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

/// How many tiles a 128-unit block is split into along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileGranularity {
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[default]
    #[serde(rename = "4x4")]
    FourByFour,
}

impl TileGranularity {
    pub fn tiles_per_side(self) -> i32 {
        match self {
            TileGranularity::TwoByTwo => 2,
            TileGranularity::FourByFour => 4,
        }
    }

    /// Edge length of one tile in map units.
    pub fn tile_size(self) -> i32 {
        128 / self.tiles_per_side()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TileGranularity::TwoByTwo => "2x2",
            TileGranularity::FourByFour => "4x4",
        }
    }
}

impl FromStr for TileGranularity {
    type Err = CutoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2x2" => Ok(TileGranularity::TwoByTwo),
            "4x4" => Ok(TileGranularity::FourByFour),
            _ => Err(CutoutError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Top-material override for full tiles of one surface, size and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileOverride {
    pub surface: Surface,
    pub granularity: TileGranularity,
    pub color: SurfaceColor,
}

/// What a configured material is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MaterialRole {
    /// Sides of every tile and recoloured border faces.
    SquareBeams,
    /// Backing above ceiling sections.
    CeilingWalls,
    /// Backing under floor sections.
    FloorBase,
    /// Top of the thinner glue tiles.
    TileGlue,
    /// Player clip volume over the whole region.
    Clip,
    Override(TileOverride),
}

impl MaterialRole {
    pub const BASE_ROLES: [MaterialRole; 5] = [
        MaterialRole::SquareBeams,
        MaterialRole::CeilingWalls,
        MaterialRole::FloorBase,
        MaterialRole::TileGlue,
        MaterialRole::Clip,
    ];

    fn default_material(self) -> Option<&'static str> {
        match self {
            MaterialRole::SquareBeams => Some("anim_wp/framework/squarebeams"),
            MaterialRole::CeilingWalls => Some("anim_wp/framework/backpanels_cheap"),
            MaterialRole::FloorBase => Some("anim_wp/framework/backpanels"),
            MaterialRole::TileGlue => Some("concrete/concrete_modular_floor001e"),
            MaterialRole::Clip => Some("tools/toolsplayerclip"),
            MaterialRole::Override(_) => None,
        }
    }
}

impl fmt::Display for MaterialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialRole::SquareBeams => f.write_str("squarebeams"),
            MaterialRole::CeilingWalls => f.write_str("ceilingwalls"),
            MaterialRole::FloorBase => f.write_str("floorbase"),
            MaterialRole::TileGlue => f.write_str("tile_glue"),
            MaterialRole::Clip => f.write_str("clip"),
            MaterialRole::Override(o) => {
                let surface = match o.surface {
                    Surface::Floor => "floor",
                    Surface::Ceiling => "ceil",
                };
                write!(f, "{}{}{}", surface, o.granularity.as_str(), o.color)
            }
        }
    }
}

impl FromStr for MaterialRole {
    type Err = CutoutError;

    /// Accepts the base role names and overrides like `Floor4x4Black` or `Ceil2x2White`.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "squarebeams" => return Ok(MaterialRole::SquareBeams),
            "ceilingwalls" => return Ok(MaterialRole::CeilingWalls),
            "floorbase" => return Ok(MaterialRole::FloorBase),
            "tile_glue" => return Ok(MaterialRole::TileGlue),
            "clip" => return Ok(MaterialRole::Clip),
            _ => {}
        }

        let unknown = || CutoutError::UnknownMaterialRole(s.to_string());
        let (surface, rest) = if let Some(rest) = key.strip_prefix("floor") {
            (Surface::Floor, rest)
        } else if let Some(rest) = key.strip_prefix("ceiling") {
            (Surface::Ceiling, rest)
        } else if let Some(rest) = key.strip_prefix("ceil") {
            (Surface::Ceiling, rest)
        } else {
            return Err(unknown());
        };
        if rest.len() < 3 || !rest.is_char_boundary(3) {
            return Err(unknown());
        }
        let (size, color) = rest.split_at(3);
        let granularity = size.parse::<TileGranularity>().map_err(|_| unknown())?;
        let color = match color {
            "white" => SurfaceColor::White,
            "black" => SurfaceColor::Black,
            _ => return Err(unknown()),
        };
        Ok(MaterialRole::Override(TileOverride {
            surface,
            granularity,
            color,
        }))
    }
}

impl TryFrom<String> for MaterialRole {
    type Error = CutoutError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MaterialRole> for String {
    fn from(role: MaterialRole) -> String {
        role.to_string()
    }
}

/// Candidate materials per role. When a role has several, one is picked at random.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    roles: FxHashMap<MaterialRole, Vec<SmolStr>>,
}

impl MaterialTable {
    /// Table holding only the stock material for each base role.
    pub fn with_defaults() -> Self {
        let mut table = Self::default();
        table.fill_defaults();
        table
    }

    pub fn fill_defaults(&mut self) {
        for role in MaterialRole::BASE_ROLES {
            if let Some(mat) = role.default_material() {
                self.roles
                    .entry(role)
                    .or_insert_with(|| vec![SmolStr::new(mat)]);
            }
        }
    }

    pub fn push(&mut self, role: MaterialRole, material: impl Into<SmolStr>) {
        self.roles.entry(role).or_default().push(material.into());
    }

    /// Replace every candidate for `role`.
    pub fn set(&mut self, role: MaterialRole, materials: Vec<SmolStr>) {
        self.roles.insert(role, materials);
    }

    pub fn get(&self, role: MaterialRole) -> Option<&[SmolStr]> {
        self.roles.get(&role).map(|v| v.as_slice())
    }

    /// The first candidate for a role.
    pub fn first(&self, role: MaterialRole) -> Result<&SmolStr> {
        self.get(role)
            .and_then(|mats| mats.first())
            .ok_or(CutoutError::EmptyMaterialRole(role))
    }

    pub fn choose<R: Rng + ?Sized>(&self, role: MaterialRole, rng: &mut R) -> Result<&SmolStr> {
        self.get(role)
            .and_then(|mats| mats.choose(rng))
            .ok_or(CutoutError::EmptyMaterialRole(role))
    }

    fn validate(&self) -> Result<()> {
        for (role, mats) in &self.roles {
            if mats.is_empty() {
                return Err(CutoutError::EmptyMaterialRole(*role));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CutoutConfig {
    /// Instance files marking the corners of regions to tile.
    pub marker_item_ids: Vec<String>,
    /// Instance files of indicator panels whose tiles must survive.
    pub indicator_panel_files: Vec<String>,
    pub floor_tile_chance_percent: i32,
    pub ceiling_tile_chance_percent: i32,
    pub floor_glue_chance_percent: i32,
    pub ceiling_glue_chance_percent: i32,
    pub beam_prop_skin: String,
    /// Instance used to seal borders open to the void. Empty disables sealing instances.
    pub border_seal_template: String,
    pub floor_tile_granularity: TileGranularity,
    pub ceiling_tile_granularity: TileGranularity,
    pub materials: MaterialTable,
}

impl Default for CutoutConfig {
    fn default() -> Self {
        Self {
            marker_item_ids: Vec::new(),
            indicator_panel_files: Vec::new(),
            floor_tile_chance_percent: 100,
            ceiling_tile_chance_percent: 100,
            floor_glue_chance_percent: 0,
            ceiling_glue_chance_percent: 0,
            beam_prop_skin: "0".to_string(),
            border_seal_template: String::new(),
            floor_tile_granularity: TileGranularity::FourByFour,
            ceiling_tile_granularity: TileGranularity::FourByFour,
            materials: MaterialTable::with_defaults(),
        }
    }
}

impl CutoutConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: CutoutConfig = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load from a flat property list, as attached to a map condition.
    ///
    /// Recognised keys (case-insensitive): `MarkerItem`, `IndicatorPanel`,
    /// `FloorChance`, `CeilingChance`, `FloorGlueChance`, `CeilingGlueChance`,
    /// `SquarebeamsSkin`, `FloorEdgeInst`, `FloorSize`, `CeilingSize`, and
    /// `Material.<role>` (repeatable). Unparseable integers fall back to the
    /// default; other unknown keys are ignored with a warning.
    pub fn from_properties<K, V>(props: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = CutoutConfig {
            materials: MaterialTable::default(),
            ..CutoutConfig::default()
        };

        for (key, value) in props {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let value = value.as_ref().trim();
            match key.as_str() {
                "markeritem" => config.marker_item_ids.push(value.to_string()),
                "indicatorpanel" => config.indicator_panel_files.push(value.to_string()),
                "floorchance" => config.floor_tile_chance_percent = conv_int(value, 100),
                "ceilingchance" => config.ceiling_tile_chance_percent = conv_int(value, 100),
                "floorgluechance" => config.floor_glue_chance_percent = conv_int(value, 0),
                "ceilinggluechance" => config.ceiling_glue_chance_percent = conv_int(value, 0),
                "squarebeamsskin" => config.beam_prop_skin = value.to_string(),
                "flooredgeinst" => config.border_seal_template = value.to_string(),
                "floorsize" => config.floor_tile_granularity = value.parse()?,
                "ceilingsize" => config.ceiling_tile_granularity = value.parse()?,
                _ => match key.strip_prefix("material.") {
                    Some(role) => config.materials.push(role.parse()?, value),
                    None => log::warn!("Ignoring unknown cutout tile option '{}'", key),
                },
            }
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        for id in self
            .marker_item_ids
            .iter_mut()
            .chain(self.indicator_panel_files.iter_mut())
        {
            *id = id.to_ascii_lowercase();
        }
        self.materials.fill_defaults();
    }

    pub fn validate(&self) -> Result<()> {
        for (option, value) in [
            ("floorTileChancePercent", self.floor_tile_chance_percent),
            ("ceilingTileChancePercent", self.ceiling_tile_chance_percent),
            ("floorGlueChancePercent", self.floor_glue_chance_percent),
            ("ceilingGlueChancePercent", self.ceiling_glue_chance_percent),
        ] {
            if !(0..=100).contains(&value) {
                return Err(CutoutError::ChanceOutOfRange { option, value });
            }
        }
        self.materials.validate()
    }

    pub fn is_marker(&self, file: &str) -> bool {
        self.marker_item_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(file))
    }

    pub fn is_indicator_panel(&self, file: &str) -> bool {
        self.indicator_panel_files
            .iter()
            .any(|id| id.eq_ignore_ascii_case(file))
    }

    pub fn tile_chance(&self, surface: Surface) -> i32 {
        match surface {
            Surface::Floor => self.floor_tile_chance_percent,
            Surface::Ceiling => self.ceiling_tile_chance_percent,
        }
    }

    pub fn glue_chance(&self, surface: Surface) -> i32 {
        match surface {
            Surface::Floor => self.floor_glue_chance_percent,
            Surface::Ceiling => self.ceiling_glue_chance_percent,
        }
    }

    pub fn granularity(&self, surface: Surface) -> TileGranularity {
        match surface {
            Surface::Floor => self.floor_tile_granularity,
            Surface::Ceiling => self.ceiling_tile_granularity,
        }
    }
}

fn conv_int(value: &str, default: i32) -> i32 {
    value.parse().unwrap_or(default)
}
