//! Seals the sides of tiled regions.
//!
//! Each region records one [`BorderEdge`] per 128 units of its outline. Where
//! a wall brush already fills the space, its nodraw face is retextured with
//! squarebeams. Where nothing does, a sealing instance is placed instead.

use super::sampler::seeded_rng;
use crate::config::{CutoutConfig, MaterialRole};
use crate::document::{Entity, MapDocument, NODRAW};
use crate::error::{CutoutError, Result};
use crate::vec::{Angles, Vec3};
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smol_str::SmolStr;

/// Horizontal texture offset lining the beam texture up with the tiles.
const BORDER_U_OFFSET: f64 = 48.0;

/// Centre of a wall face next to a region's outline, with the orientation
/// a sealing instance placed there should face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderEdge {
    pub location: Vec3,
    pub angles: Angles,
    /// Surface centre of the block on the far side of this edge.
    pub outside: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BorderReport {
    /// Existing nodraw faces given a squarebeams material.
    pub recolored: usize,
    /// Sealing instances added where no face was found.
    pub sealed: usize,
    /// Edge locations between two tiled blocks, left untouched.
    pub interior: usize,
}

/// Seed key for the material of the border face at `loc`.
pub fn border_seed(loc: Vec3) -> String {
    format!("floor_side_{}_{}_{}", loc.x, loc.y, loc.z)
}

pub struct BorderSealer<'a> {
    beam_materials: &'a [SmolStr],
    template: &'a str,
    tiled: FxHashSet<Vec3>,
}

impl<'a> BorderSealer<'a> {
    pub fn new(config: &'a CutoutConfig) -> Result<Self> {
        let beam_materials = config
            .materials
            .get(MaterialRole::SquareBeams)
            .filter(|mats| !mats.is_empty())
            .ok_or(CutoutError::EmptyMaterialRole(MaterialRole::SquareBeams))?;
        Ok(Self {
            beam_materials,
            template: &config.border_seal_template,
            tiled: FxHashSet::default(),
        })
    }

    /// Surface centres of every block replaced by tiles in this pass.
    ///
    /// An edge facing one of these blocks is a junction inside a larger tiled
    /// area, so it is neither recoloured nor sealed.
    pub fn with_tiled_blocks(mut self, tiled: impl IntoIterator<Item = Vec3>) -> Self {
        self.tiled = tiled.into_iter().collect();
        self
    }

    /// Handle every edge. When several records share a location the first one wins.
    pub fn seal(&self, doc: &mut MapDocument, edges: &[BorderEdge]) -> BorderReport {
        let mut report = BorderReport::default();
        let interior: FxHashSet<Vec3> = edges
            .iter()
            .filter(|e| self.tiled.contains(&e.outside))
            .map(|e| e.location)
            .collect();
        report.interior = interior.len();

        let mut locations = FxHashSet::default();
        let unique: Vec<BorderEdge> = edges
            .iter()
            .filter(|e| !interior.contains(&e.location) && locations.insert(e.location))
            .copied()
            .collect();

        let mut matched = FxHashSet::default();
        let mut recolored = Vec::new();
        for face in doc.world_faces_mut() {
            if !face.material.eq_ignore_ascii_case(NODRAW) {
                continue;
            }
            let origin = face.origin();
            if !locations.contains(&origin) {
                continue;
            }
            let mut rng = seeded_rng(&border_seed(origin));
            if let Some(mat) = self.beam_materials.choose(&mut rng) {
                face.material = mat.clone();
            }
            face.swap_axes();
            face.uaxis.offset = BORDER_U_OFFSET;
            recolored.push(face.id);
            matched.insert(origin);
        }
        report.recolored = recolored.len();
        for id in recolored {
            doc.ignore_face(id);
        }

        for edge in unique.iter().filter(|e| !matched.contains(&e.location)) {
            if self.template.is_empty() {
                log::debug!("No sealing instance configured for open edge at {}", edge.location);
                continue;
            }
            doc.create_ent(
                Entity::new("func_instance")
                    .with_key("file", self.template)
                    .with_key("origin", edge.location.join(" "))
                    .with_key("angles", edge.angles.to_string()),
            );
            report.sealed += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(x: i32, y: i32, z: i32, yaw: f64) -> BorderEdge {
        BorderEdge {
            location: Vec3::new(x, y, z),
            angles: Angles::new(0.0, yaw, 0.0),
            outside: Vec3::new(x, y, z + 64),
        }
    }

    fn config(template: &str) -> CutoutConfig {
        CutoutConfig {
            border_seal_template: template.to_string(),
            ..CutoutConfig::default()
        }
    }

    #[test]
    fn test_nodraw_wall_face_is_recolored() {
        let mut doc = MapDocument::new();
        // Wall block north of a region at y = 128, its south face centred on (64, 128, -64).
        let wall = doc
            .make_prism(Vec3::new(0, 128, -128), Vec3::new(128, 256, 0), NODRAW)
            .into_solid();
        let wall = doc.add_brush(wall);

        let config = config("instances/edge.vmf");
        let report = BorderSealer::new(&config)
            .unwrap()
            .seal(&mut doc, &[edge(64, 128, -64, 270.0)]);
        assert_eq!(report, BorderReport { recolored: 1, sealed: 0, interior: 0 });

        let face = doc
            .brush(wall)
            .unwrap()
            .faces
            .iter()
            .find(|f| f.origin() == Vec3::new(64, 128, -64))
            .unwrap();
        assert_eq!(face.material, "anim_wp/framework/squarebeams");
        assert_eq!(face.uaxis.offset, 48.0);
        // Axes were swapped from the stock (1 0 0)/(0 0 -1) side alignment.
        assert_eq!((face.uaxis.x, face.uaxis.z), (0.0, -1.0));
        assert!(doc.is_ignored(face.id));
        assert!(doc.by_class("func_instance").is_empty());
    }

    #[test]
    fn test_open_edges_get_instances() {
        let mut doc = MapDocument::new();
        let config = config("instances/edge.vmf");
        let edges = [
            edge(64, 128, -64, 270.0),
            edge(64, 128, -64, 90.0),
            edge(0, 64, -64, 0.0),
        ];
        let report = BorderSealer::new(&config).unwrap().seal(&mut doc, &edges);
        assert_eq!(report.sealed, 2);

        let inst = doc.entity(doc.by_class("func_instance")[0]).unwrap();
        assert_eq!(inst.get("file"), Some("instances/edge.vmf"));
        assert_eq!(inst.get("origin"), Some("64 128 -64"));
        assert_eq!(inst.get("angles"), Some("0 270 0"));
    }

    #[test]
    fn test_no_template_leaves_edges_open() {
        let mut doc = MapDocument::new();
        let config = config("");
        let report = BorderSealer::new(&config)
            .unwrap()
            .seal(&mut doc, &[edge(0, 64, -64, 0.0)]);
        assert_eq!(report, BorderReport::default());
        assert!(doc.entities().is_empty());
    }

    #[test]
    fn test_border_material_is_deterministic() {
        let mut config = config("");
        config.materials.set(
            MaterialRole::SquareBeams,
            vec!["beams/a".into(), "beams/b".into(), "beams/c".into()],
        );
        let pick = || {
            let mut doc = MapDocument::new();
            let wall = doc
                .make_prism(Vec3::new(0, 128, -128), Vec3::new(128, 256, 0), NODRAW)
                .into_solid();
            let wall = doc.add_brush(wall);
            BorderSealer::new(&config)
                .unwrap()
                .seal(&mut doc, &[edge(64, 128, -64, 270.0)]);
            doc.brush(wall)
                .unwrap()
                .faces
                .iter()
                .find(|f| f.origin() == Vec3::new(64, 128, -64))
                .unwrap()
                .material
                .clone()
        };
        assert_eq!(pick(), pick());
    }

    #[test]
    fn test_empty_beam_role_is_rejected() {
        let mut config = config("");
        config.materials.set(MaterialRole::SquareBeams, Vec::new());
        assert!(matches!(
            BorderSealer::new(&config),
            Err(CutoutError::EmptyMaterialRole(MaterialRole::SquareBeams))
        ));
    }

    #[test]
    fn test_edges_facing_tiled_blocks_are_interior() {
        let mut doc = MapDocument::new();
        // A nodraw face sits on the junction, as the neighbour's side would.
        let wall = doc
            .make_prism(Vec3::new(0, 128, -128), Vec3::new(128, 256, 0), NODRAW)
            .into_solid();
        doc.add_brush(wall);

        let config = config("instances/edge.vmf");
        let junction = BorderEdge {
            location: Vec3::new(64, 128, -64),
            angles: Angles::new(0.0, 270.0, 0.0),
            outside: Vec3::new(64, 192, 0),
        };
        let open = edge(0, 64, -64, 0.0);
        let report = BorderSealer::new(&config)
            .unwrap()
            .with_tiled_blocks([Vec3::new(64, 192, 0)])
            .seal(&mut doc, &[junction, open]);
        assert_eq!(report, BorderReport { recolored: 0, sealed: 1, interior: 1 });
        assert!(doc.world_faces().all(|f| f.material == NODRAW));
    }
}
