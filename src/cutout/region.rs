use super::beams::BeamGenerator;
use super::borders::BorderEdge;
use super::overlays::OverlayRemap;
use super::sampler::{block_seed, seeded_rng, CellKind, CellSampler, ForcedLocations, MATERIAL_SEED_PREFIX};
use super::tile::make_tile;
use super::GenerationReport;
use crate::config::{CutoutConfig, MaterialRole, TileGranularity, TileOverride};
use crate::document::{
    Entity, EntityId, MapDocument, SolidId, Surface, SurfaceBrush, TextureTable, INVISIBLE, NODRAW,
};
use crate::error::Result;
use crate::vec::{iter_grid, Angles, Vec3};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

pub const BLOCK_SIZE: i32 = 128;

/// A rectangular span of 128-unit blocks on one surface plane.
///
/// `min` and `max` are block centres on the surface, so a single-block
/// region has `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    pub min: Vec3,
    pub max: Vec3,
    pub surface: Surface,
}

impl TileRegion {
    /// Region spanned by two marker surface points. `None` if they are not on the same level.
    pub fn from_corners(a: Vec3, b: Vec3, surface: Surface) -> Option<Self> {
        let min = a.min(b);
        let max = a.max(b);
        if min.z != max.z {
            return None;
        }
        Some(Self { min, max, surface })
    }

    pub fn z(&self) -> i32 {
        self.min.z
    }

    /// Centre of every 128-unit block, X outermost.
    pub fn block_centers(&self) -> impl Iterator<Item = Vec3> {
        let z = self.z();
        iter_grid(
            self.min.x,
            self.max.x + 1,
            self.min.y,
            self.max.y + 1,
            BLOCK_SIZE,
        )
        .map(move |(x, y)| Vec3::new(x, y, z))
    }

    /// One record per 128-unit step along each outer edge, at the middle of
    /// the wall face that would border the hole, facing inward.
    pub fn border_edges(&self) -> Vec<BorderEdge> {
        let s = self.surface.sign();
        let z = self.z() - 64 * s;
        let roll = match self.surface {
            Surface::Floor => 0.0,
            Surface::Ceiling => 180.0,
        };
        let surface_z = self.z();
        // `(dx, dy)` points outward, from the last block centre to the edge.
        let edge = |x: i32, y: i32, dx: i32, dy: i32, yaw: f64| BorderEdge {
            location: Vec3::new(x + 64 * dx, y + 64 * dy, z),
            angles: Angles::new(0.0, yaw, roll),
            outside: Vec3::new(x + BLOCK_SIZE * dx, y + BLOCK_SIZE * dy, surface_z),
        };

        let mut edges = Vec::new();
        for x in (self.min.x..=self.max.x).step_by(BLOCK_SIZE as usize) {
            edges.push(edge(x, self.max.y, 0, 1, 270.0));
            edges.push(edge(x, self.min.y, 0, -1, 90.0));
        }
        for y in (self.min.y..=self.max.y).step_by(BLOCK_SIZE as usize) {
            edges.push(edge(self.max.x, y, 1, 0, 180.0));
            edges.push(edge(self.min.x, y, -1, 0, 0.0));
        }
        edges
    }
}

/// Surface brushes replaced by tiles, removed only once every region is generated.
///
/// Overlapping regions look blocks up in the surface index, so it must stay
/// intact for the whole pass.
#[derive(Debug, Default)]
pub struct DeferredRemovals {
    entries: Vec<(Vec3, SolidId)>,
    seen: FxHashSet<SolidId>,
}

impl DeferredRemovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a removal. Returns `false` if this solid was already staged.
    pub fn register(&mut self, location: Vec3, solid: SolidId) -> bool {
        if !self.seen.insert(solid) {
            return false;
        }
        self.entries.push((location, solid));
        true
    }

    pub fn contains(&self, solid: SolidId) -> bool {
        self.seen.contains(&solid)
    }

    /// Surface centres of every staged block.
    pub fn locations(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.entries.iter().map(|(location, _)| *location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete every staged brush from the surface index and the document.
    pub fn apply(self, doc: &mut MapDocument) -> usize {
        let mut removed = 0;
        for (location, solid) in self.entries {
            doc.remove_surface(location);
            if doc.remove_brush(solid).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

/// Mutable state shared by every region of one pass.
#[derive(Debug, Default)]
pub struct GenerationState {
    pub forced: ForcedLocations,
    pub remap: OverlayRemap,
    pub removals: DeferredRemovals,
    pub borders: Vec<BorderEdge>,
    pub report: GenerationReport,
}

impl GenerationState {
    pub fn new(forced: ForcedLocations) -> Self {
        Self {
            forced,
            ..Self::default()
        }
    }
}

pub struct RegionProcessor<'a> {
    config: &'a CutoutConfig,
    textures: &'a TextureTable,
}

impl<'a> RegionProcessor<'a> {
    pub fn new(config: &'a CutoutConfig, textures: &'a TextureTable) -> Self {
        Self { config, textures }
    }

    /// Generate beams, clip volumes and tiles for one region, and record its borders.
    pub fn process(
        &self,
        doc: &mut MapDocument,
        region: &TileRegion,
        state: &mut GenerationState,
    ) -> Result<()> {
        let s = region.surface.sign();
        let (min, max) = (region.min, region.max);
        let detail = doc.create_ent(Entity::new("func_detail"));

        let beams = BeamGenerator::new(&self.config.beam_prop_skin, region.surface).generate(
            doc,
            min + (-64, -64, 0),
            max + Vec3::new(64, 64, -8 * s),
        );
        state.report.beams.merge(&beams);

        // Player clip across the whole area.
        let clip = self.config.materials.first(MaterialRole::Clip)?;
        let clip = doc
            .make_prism(min - Vec3::new(64, 64, 8 * s), max + (64, 64, 0), clip)
            .into_solid();
        doc.add_brush(clip);

        // Stop one unit short of the sides so wall brushes are unaffected.
        let noportal = doc
            .make_prism(min - Vec3::new(63, 63, 9 * s), max + (63, 63, 0), INVISIBLE)
            .into_solid();
        let noportal_ent = doc.create_ent(
            Entity::new("func_noportal_volume").with_key("origin", min.join(" ")),
        );
        doc.attach_brush(noportal_ent, noportal);

        for center in region.block_centers() {
            if self.convert_block(doc, region.surface, center, detail, state)? {
                state.report.blocks += 1;
            }
        }

        state.borders.extend(region.border_edges());
        state.report.regions += 1;
        log::debug!(
            "Tiled {} region {} .. {} ({} blocks so far)",
            region.surface,
            min,
            max,
            state.report.blocks
        );
        Ok(())
    }

    /// Replace the surface brush at `center` with tiles. Returns `false` if
    /// there is no brush there or it was already converted.
    fn convert_block(
        &self,
        doc: &mut MapDocument,
        surface: Surface,
        center: Vec3,
        detail: EntityId,
        state: &mut GenerationState,
    ) -> Result<bool> {
        let Some(brush) = doc.surface_at(center) else {
            state.report.empty_footprints += 1;
            return Ok(false);
        };
        if !state.removals.register(center, brush.solid) {
            log::debug!("Block at {} already tiled by an overlapping region", center);
            return Ok(false);
        }

        let s = surface.sign();
        let corner = center - (64, 64, 0);
        let granularity = self.config.granularity(surface);
        let sampler = CellSampler::new(
            self.config.tile_chance(surface),
            self.config.glue_chance(surface),
        );
        let grid = sampler.sample(corner, granularity, &mut state.forced);
        let mut rng = seeded_rng(&block_seed(MATERIAL_SEED_PREFIX, corner));

        let size = granularity.tile_size();
        let half = size / 2;
        let mut replacements = Vec::new();

        for (x, y, kind) in grid.iter() {
            let tile_loc = corner + Vec3::new(x as i32 * size + half, y as i32 * size + half, 0);
            let (p1, visible) = match kind {
                CellKind::Full => (
                    tile_loc - (half, half, 0),
                    self.full_tile_material(&brush, surface, granularity, &mut rng)?,
                ),
                CellKind::Glue => (
                    tile_loc - Vec3::new(half, half, s),
                    self.config.materials.choose(MaterialRole::TileGlue, &mut rng)?,
                ),
                CellKind::Empty => continue,
            };
            let p2 = tile_loc + Vec3::new(half, half, -2 * s);
            let beam = self
                .config
                .materials
                .choose(MaterialRole::SquareBeams, &mut rng)?;
            let (top, bottom) = match surface {
                Surface::Floor => (visible.as_str(), NODRAW),
                Surface::Ceiling => (NODRAW, visible.as_str()),
            };

            let mut tile = make_tile(doc, p1, p2, top, bottom, beam)?;
            let face = match surface {
                Surface::Floor => tile.top().id,
                Surface::Ceiling => tile.bottom().id,
            };
            doc.attach_brush(detail, tile.into_solid());

            if kind == CellKind::Full {
                replacements.push(face);
                state.report.full_tiles += 1;
            } else {
                state.report.glue_tiles += 1;
            }
        }

        let mut base = doc.make_prism(
            corner + Vec3::new(0, 0, -9 * s),
            corner + Vec3::new(BLOCK_SIZE, BLOCK_SIZE, -8 * s),
            NODRAW,
        );
        match surface {
            Surface::Floor => {
                base.top().material = self
                    .config
                    .materials
                    .choose(MaterialRole::FloorBase, &mut rng)?
                    .clone()
            }
            Surface::Ceiling => {
                base.bottom().material = self
                    .config
                    .materials
                    .choose(MaterialRole::CeilingWalls, &mut rng)?
                    .clone()
            }
        }
        doc.add_brush(base.into_solid());
        state.report.base_prisms += 1;

        state.remap.insert(brush.face, replacements);
        Ok(true)
    }

    /// Top material for a full tile: a configured size/colour override, or the surface's own texture.
    fn full_tile_material(
        &self,
        brush: &SurfaceBrush,
        surface: Surface,
        granularity: TileGranularity,
        rng: &mut ChaCha8Rng,
    ) -> Result<&'a SmolStr> {
        let role = MaterialRole::Override(TileOverride {
            surface,
            granularity,
            color: brush.color,
        });
        if self.config.materials.get(role).is_some_and(|m| !m.is_empty()) {
            return self.config.materials.choose(role, rng);
        }
        self.textures.surface_material(brush.color, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SurfaceColor;

    fn floor_doc(centers: &[Vec3]) -> MapDocument {
        let mut doc = MapDocument::new();
        for c in centers {
            doc.add_surface_block(*c, Surface::Floor, SurfaceColor::White, "tile/white_floor");
        }
        doc
    }

    #[test]
    fn test_region_requires_same_level() {
        assert!(TileRegion::from_corners(Vec3::ZERO, Vec3::new(128, 0, 64), Surface::Floor).is_none());
        let r = TileRegion::from_corners(Vec3::new(256, 0, 0), Vec3::new(0, 128, 0), Surface::Floor)
            .unwrap();
        assert_eq!(r.min, Vec3::new(0, 0, 0));
        assert_eq!(r.max, Vec3::new(256, 128, 0));
        assert_eq!(r.block_centers().count(), 6);
    }

    #[test]
    fn test_border_edges() {
        let r = TileRegion::from_corners(Vec3::new(64, 64, 0), Vec3::new(192, 64, 0), Surface::Floor)
            .unwrap();
        let edges = r.border_edges();
        // 2 blocks wide, 1 deep: 2 * 2 + 1 * 2.
        assert_eq!(edges.len(), 6);
        assert!(edges
            .iter()
            .any(|e| e.location == Vec3::new(64, 128, -64) && e.angles.yaw == 270.0));
        assert!(edges.iter().any(|e| e.location == Vec3::new(256, 64, -64)
            && e.angles.yaw == 180.0
            && e.outside == Vec3::new(320, 64, 0)));
        assert!(edges
            .iter()
            .any(|e| e.location == Vec3::new(0, 64, -64) && e.angles.yaw == 0.0));

        let c = TileRegion::from_corners(Vec3::new(64, 64, 256), Vec3::new(64, 64, 256), Surface::Ceiling)
            .unwrap();
        assert!(c
            .border_edges()
            .iter()
            .all(|e| e.location.z == 320 && e.angles.roll == 180.0));
    }

    #[test]
    fn test_deferred_removals_are_unique() {
        let center = Vec3::new(64, 64, 0);
        let mut doc = floor_doc(&[center]);
        let brush = doc.surface_at(center).unwrap();

        let mut removals = DeferredRemovals::new();
        assert!(removals.register(center, brush.solid));
        assert!(!removals.register(center, brush.solid));
        assert_eq!(removals.len(), 1);

        assert_eq!(removals.apply(&mut doc), 1);
        assert!(doc.surface_at(center).is_none());
        assert!(doc.brush(brush.solid).is_none());
    }

    #[test]
    fn test_unoccupied_footprints_are_skipped() {
        let centers = [Vec3::new(64, 64, 0), Vec3::new(192, 64, 0)];
        let mut doc = floor_doc(&centers[..1]);
        let config = CutoutConfig::default();
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(centers[0], centers[1], Surface::Floor).unwrap();

        let mut state = GenerationState::default();
        RegionProcessor::new(&config, &textures)
            .process(&mut doc, &region, &mut state)
            .unwrap();
        assert_eq!(state.report.blocks, 1);
        assert_eq!(state.report.empty_footprints, 1);
        assert_eq!(state.report.full_tiles, 16);
        assert_eq!(state.removals.len(), 1);
        // Nothing is removed until the whole pass is done.
        assert!(doc.surface_at(centers[0]).is_some());
    }

    #[test]
    fn test_overlapping_regions_tile_once() {
        let center = Vec3::new(64, 64, 0);
        let mut doc = floor_doc(&[center]);
        let config = CutoutConfig::default();
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(center, center, Surface::Floor).unwrap();

        let mut state = GenerationState::default();
        let processor = RegionProcessor::new(&config, &textures);
        processor.process(&mut doc, &region, &mut state).unwrap();
        processor.process(&mut doc, &region, &mut state).unwrap();
        assert_eq!(state.report.blocks, 1);
        assert_eq!(state.report.full_tiles, 16);
        assert_eq!(state.report.base_prisms, 1);
    }

    #[test]
    fn test_full_tile_geometry_and_remap() {
        let center = Vec3::new(64, 64, 0);
        let mut doc = floor_doc(&[center]);
        let original_face = doc.surface_at(center).unwrap().face;
        let config = CutoutConfig::default();
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(center, center, Surface::Floor).unwrap();

        let mut state = GenerationState::default();
        RegionProcessor::new(&config, &textures)
            .process(&mut doc, &region, &mut state)
            .unwrap();

        let detail = doc.entity(doc.by_class("func_detail")[0]).unwrap();
        assert_eq!(detail.solids.len(), 16);
        for solid in &detail.solids {
            let (lo, hi) = solid.bounds();
            assert_eq!((hi.x - lo.x, hi.y - lo.y), (32, 32));
            assert_eq!((lo.z, hi.z), (-2, 0));
        }

        let replacements = state.remap.get(original_face).unwrap();
        assert_eq!(replacements.len(), 16);
        for face in replacements {
            let face = doc.face(*face).unwrap();
            assert_eq!(face.material, "tile/white_floor_tile002a");
            assert_eq!(face.origin().z, 0);
        }
    }

    #[test]
    fn test_glue_tiles_are_thinner() {
        let center = Vec3::new(64, 64, 0);
        let mut doc = floor_doc(&[center]);
        let config = CutoutConfig {
            floor_tile_chance_percent: 0,
            floor_glue_chance_percent: 100,
            ..CutoutConfig::default()
        };
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(center, center, Surface::Floor).unwrap();

        let mut state = GenerationState::default();
        RegionProcessor::new(&config, &textures)
            .process(&mut doc, &region, &mut state)
            .unwrap();
        assert_eq!(state.report.glue_tiles, 16);
        assert_eq!(state.report.full_tiles, 0);

        let detail = doc.entity(doc.by_class("func_detail")[0]).unwrap();
        for solid in &detail.solids {
            let (lo, hi) = solid.bounds();
            assert_eq!((lo.z, hi.z), (-2, -1));
        }
        // Glue tops do not replace the original face for overlays.
        assert!(state.remap.values().all(|v| v.is_empty()));
    }

    #[test]
    fn test_two_by_two_tiles_with_override() {
        let center = Vec3::new(64, 64, 0);
        let mut doc = floor_doc(&[center]);
        let mut config = CutoutConfig {
            floor_tile_granularity: TileGranularity::TwoByTwo,
            ..CutoutConfig::default()
        };
        config
            .materials
            .push("floor2x2white".parse().unwrap(), "tile/white_floor_2x2");
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(center, center, Surface::Floor).unwrap();

        let mut state = GenerationState::default();
        RegionProcessor::new(&config, &textures)
            .process(&mut doc, &region, &mut state)
            .unwrap();
        assert_eq!(state.report.full_tiles, 4);
        let detail = doc.entity(doc.by_class("func_detail")[0]).unwrap();
        for solid in &detail.solids {
            let (lo, hi) = solid.bounds();
            assert_eq!((hi.x - lo.x, hi.y - lo.y), (64, 64));
            assert_eq!(solid.faces[0].material, "tile/white_floor_2x2");
        }
    }

    #[test]
    fn test_ceiling_tiles_mirror_floor() {
        let center = Vec3::new(64, 64, 256);
        let mut doc = MapDocument::new();
        doc.add_surface_block(center, Surface::Ceiling, SurfaceColor::Black, "metal/black");
        let config = CutoutConfig::default();
        let textures = TextureTable::with_defaults();
        let region = TileRegion::from_corners(center, center, Surface::Ceiling).unwrap();

        let mut state = GenerationState::default();
        RegionProcessor::new(&config, &textures)
            .process(&mut doc, &region, &mut state)
            .unwrap();
        assert_eq!(state.report.full_tiles, 16);

        let detail = doc.entity(doc.by_class("func_detail")[0]).unwrap();
        for solid in &detail.solids {
            let (lo, hi) = solid.bounds();
            assert_eq!((lo.z, hi.z), (256, 258));
            // Bottom face is the visible one.
            assert_eq!(solid.faces[1].material, "metal/black_floor_metal_001c");
            assert_eq!(solid.faces[0].material, NODRAW);
        }
        let base = doc
            .world_brushes()
            .iter()
            .find(|s| s.bounds().0.z == 264)
            .unwrap();
        assert_eq!(base.faces[1].material, "anim_wp/framework/backpanels_cheap");
    }
}
