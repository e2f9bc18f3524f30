//! Finding regions and forced tiles in the map.

use super::region::TileRegion;
use super::sampler::ForcedLocations;
use crate::config::CutoutConfig;
use crate::document::{EntityId, MapDocument, Surface, TextureTable};
use crate::vec::{Angles, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

/// Basis normals of overlays lying flat on a floor or ceiling.
const FLAT_OVERLAY_NORMALS: [&str; 2] = ["0 0 1", "0 0 -1"];

/// A marker instance reduced to the surface point it sits on.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub location: Vec3,
    pub surface: Surface,
}

/// Regions to generate, floors first, plus what was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct RegionPlan {
    pub regions: Vec<TileRegion>,
    /// Marker instances removed from the document.
    pub markers: usize,
    /// Pairs whose markers were not on the same level.
    pub skipped: usize,
    /// Entities removed because a marker pointed at them.
    pub dangling: usize,
}

fn parse_angles(value: Option<&str>) -> Angles {
    value.and_then(|a| a.parse().ok()).unwrap_or_default()
}

fn parse_origin(value: Option<&str>) -> Vec3 {
    value.and_then(|o| o.parse().ok()).unwrap_or_default()
}

/// Read every marker instance, pair them up and remove them from the document.
///
/// Each output of a marker pairs it with the output's target. A marker with
/// no outputs and no connections at all pairs with itself, giving a single
/// 128x128 region. Pairs naming something other than a marker delete that
/// entity instead.
pub fn discover_regions(doc: &mut MapDocument, config: &CutoutConfig) -> RegionPlan {
    let mut plan = RegionPlan::default();
    let mut markers: FxHashMap<String, Marker> = FxHashMap::default();
    let mut floor_pairs = Vec::new();
    let mut ceiling_pairs = Vec::new();
    let mut to_remove = Vec::new();

    for id in doc.by_class("func_instance") {
        let Some(inst) = doc.entity(id) else {
            continue;
        };
        if !config.is_marker(inst.get_or("file", "")) {
            continue;
        }
        let orient = Vec3::UP.rotate_by_angles(parse_angles(inst.get("angles")));
        let surface = if orient == Vec3::UP {
            Surface::Floor
        } else {
            Surface::Ceiling
        };
        let name = inst.targetname().to_string();
        let location = parse_origin(inst.get("origin")) + orient * -64;

        let mut targets: Vec<&str> = Vec::new();
        for out in &inst.outputs {
            if !targets.contains(&out.target.as_str()) {
                targets.push(&out.target);
            }
        }
        let pairs = match surface {
            Surface::Floor => &mut floor_pairs,
            Surface::Ceiling => &mut ceiling_pairs,
        };
        for target in &targets {
            pairs.push((name.clone(), target.to_string()));
        }
        if targets.is_empty() && inst.fixup("$connectioncount") == Some("0") {
            pairs.push((name.clone(), name.clone()));
        }

        markers.insert(
            name.clone(),
            Marker {
                name,
                location,
                surface,
            },
        );
        to_remove.push(id);
    }

    for id in to_remove {
        doc.remove_ent(id);
        plan.markers += 1;
    }

    for (surface, pairs) in [(Surface::Floor, floor_pairs), (Surface::Ceiling, ceiling_pairs)] {
        let mut seen = FxHashSet::default();
        for (start, end) in pairs {
            let key = if start <= end {
                (start.clone(), end.clone())
            } else {
                (end.clone(), start.clone())
            };
            if !seen.insert(key) {
                continue;
            }
            let (Some(a), Some(b)) = (markers.get(&start), markers.get(&end)) else {
                plan.dangling += remove_dangling(doc, &start, &end);
                continue;
            };
            match TileRegion::from_corners(a.location, b.location, surface) {
                Some(region) => plan.regions.push(region),
                None => {
                    log::debug!(
                        "Cutout markers {} and {} are on different levels, skipping",
                        start,
                        end
                    );
                    plan.skipped += 1;
                }
            }
        }
    }
    plan
}

fn remove_dangling(doc: &mut MapDocument, start: &str, target: &str) -> usize {
    let stray: Vec<EntityId> = doc.by_target(target);
    log::warn!(
        "Cutout marker {} is connected to {}, which is not a marker; removing {} entities",
        start,
        target,
        stray.len()
    );
    for id in &stray {
        doc.remove_ent(*id);
    }
    stray.len()
}

/// Cell centres under indicator panels and protected signage overlays.
pub fn collect_forced_locations(
    doc: &MapDocument,
    config: &CutoutConfig,
    textures: &TextureTable,
) -> ForcedLocations {
    let mut forced = ForcedLocations::new();

    for id in doc.by_class("func_instance") {
        let Some(inst) = doc.entity(id) else {
            continue;
        };
        if !config.is_indicator_panel(inst.get_or("file", "")) {
            continue;
        }
        let loc = Vec3::new(0, 0, -64).rotate_by_angles(parse_angles(inst.get("angles")))
            + parse_origin(inst.get("origin"));
        forced.insert_around(loc);
    }

    let protected = textures.overlay_materials();
    for id in doc.by_class("info_overlay") {
        let Some(overlay) = doc.entity(id) else {
            continue;
        };
        let material = overlay.get_or("material", "").to_ascii_lowercase();
        let normal = overlay.get_or("basisnormal", "");
        if protected.contains(&material) && FLAT_OVERLAY_NORMALS.contains(&normal) {
            forced.insert_around(parse_origin(overlay.get("origin")));
        }
    }

    log::debug!("{} forced tile locations", forced.len());
    forced
}
