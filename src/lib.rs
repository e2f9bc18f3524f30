//! Procedural "destroyed" tile generation for brush-based maps.
//!
//! [`CutoutTiler`] finds marker instances in a [`MapDocument`], replaces the
//! floor and ceiling blocks between them with a deterministic random pattern
//! of small tiles over a squarebeams framework, and patches up the borders and
//! overlays affected by the change.

pub mod config;
pub mod cutout;
pub mod document;
pub mod error;
pub mod vec;

pub use config::{CutoutConfig, MaterialRole, MaterialTable, TileGranularity, TileOverride};
pub use cutout::{CutoutTiler, GenerationReport};
pub use document::{
    Entity, EntityId, Face, FaceId, MapDocument, Output, Prism, Solid, SolidId, Surface,
    SurfaceBrush, SurfaceColor, TextureTable,
};
pub use error::{CutoutError, Result};
pub use vec::{Angles, Vec3};
