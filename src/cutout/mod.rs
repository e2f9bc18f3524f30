//! Cutout tile generation.
//!
//! Marker instances in the map define rectangular floor and ceiling regions.
//! Each 128-unit surface block inside a region is replaced with a random
//! pattern of small tiles over a squarebeams framework, and the edges of the
//! region are sealed so no void shows through.

pub mod beams;
pub mod borders;
pub mod markers;
pub mod overlays;
pub mod region;
pub mod sampler;
pub mod tile;

pub use beams::{BeamGenerator, BeamReport, BeamTier};
pub use borders::{BorderEdge, BorderReport, BorderSealer};
pub use markers::{collect_forced_locations, discover_regions, RegionPlan};
pub use overlays::{reallocate, OverlayRemap, OverlayReport};
pub use region::{DeferredRemovals, GenerationState, RegionProcessor, TileRegion};
pub use sampler::{CellKind, CellSampler, ForcedLocations, TileGrid};
pub use tile::{beam_offset, make_tile};

use crate::config::CutoutConfig;
use crate::document::{MapDocument, TextureTable};
use crate::error::Result;
use serde::Serialize;

/// Counts of everything one pass generated, changed or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Marker instances removed.
    pub markers: usize,
    pub regions: usize,
    /// Marker pairs on different levels.
    pub skipped_regions: usize,
    /// Entities removed because a marker was connected to them.
    pub dangling_removed: usize,
    /// Surface blocks replaced with tiles.
    pub blocks: usize,
    /// Block positions inside a region with no surface brush.
    pub empty_footprints: usize,
    pub full_tiles: usize,
    pub glue_tiles: usize,
    pub base_prisms: usize,
    pub beams: BeamReport,
    /// Original surface brushes deleted.
    pub removed_solids: usize,
    pub borders: BorderReport,
    pub overlays: OverlayReport,
}

/// Runs the whole cutout tile pass over a document.
pub struct CutoutTiler {
    config: CutoutConfig,
    textures: TextureTable,
}

impl CutoutTiler {
    pub fn new(config: CutoutConfig, textures: TextureTable) -> Self {
        Self { config, textures }
    }

    pub fn config(&self) -> &CutoutConfig {
        &self.config
    }

    /// Generate every region, then delete the replaced surfaces, seal borders
    /// and move overlays onto the new tiles, in that order.
    pub fn run(&self, doc: &mut MapDocument) -> Result<GenerationReport> {
        self.config.validate()?;
        let sealer = BorderSealer::new(&self.config)?;

        let forced = collect_forced_locations(doc, &self.config, &self.textures);
        let plan = discover_regions(doc, &self.config);

        let mut state = GenerationState::new(forced);
        state.report.markers = plan.markers;
        state.report.skipped_regions = plan.skipped;
        state.report.dangling_removed = plan.dangling;

        let processor = RegionProcessor::new(&self.config, &self.textures);
        for region in &plan.regions {
            processor.process(doc, region, &mut state)?;
        }

        let GenerationState {
            removals,
            remap,
            borders,
            mut report,
            forced,
        } = state;
        if !forced.is_empty() {
            log::debug!("{} forced tile locations were outside every region", forced.len());
        }

        // Junctions between tiled blocks must be known before the blocks go.
        let sealer = sealer.with_tiled_blocks(removals.locations());
        report.removed_solids = removals.apply(doc);
        report.borders = sealer.seal(doc, &borders);
        report.overlays = reallocate(doc, &remap);

        log::info!(
            "Cutout tiles: {} regions, {} blocks, {} full and {} glue tiles, {} beam props",
            report.regions,
            report.blocks,
            report.full_tiles,
            report.glue_tiles,
            report.beams.props()
        );
        Ok(report)
    }
}
