//! Moves overlays off replaced surface faces onto the tiles that replaced them.

use crate::document::{FaceId, MapDocument};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Original surface face -> top faces of the full tiles generated in its place.
///
/// An empty list means the face was replaced but no full tile survived.
#[derive(Debug, Clone, Default)]
pub struct OverlayRemap {
    faces: FxHashMap<FaceId, Vec<FaceId>>,
}

impl OverlayRemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the replacements for `face`, overwriting any earlier entry.
    pub fn insert(&mut self, face: FaceId, replacements: Vec<FaceId>) {
        self.faces.insert(face, replacements);
    }

    pub fn get(&self, face: FaceId) -> Option<&[FaceId]> {
        self.faces.get(&face).map(|v| v.as_slice())
    }

    pub fn values(&self) -> impl Iterator<Item = &[FaceId]> {
        self.faces.values().map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayReport {
    pub rewritten: usize,
    pub removed: usize,
}

/// Rewrite the face lists of every `info_overlay` that references a replaced face.
///
/// Face ids not in `remap` are kept as they are. An overlay left with no
/// faces at all is deleted, since the engine rejects an empty face list.
pub fn reallocate(doc: &mut MapDocument, remap: &OverlayRemap) -> OverlayReport {
    let mut report = OverlayReport::default();
    if remap.is_empty() {
        return report;
    }

    let mut empty = Vec::new();
    for id in doc.by_class("info_overlay") {
        let Some(overlay) = doc.entity_mut(id) else {
            continue;
        };
        let Some(sides) = overlay.get("sides") else {
            continue;
        };

        let mut changed = false;
        // Tile faces added so far; untouched entries are copied as they are.
        let mut inserted = FxHashSet::default();
        let mut new_sides = Vec::new();
        for token in sides.split_whitespace() {
            let replaced = token.parse::<FaceId>().ok().and_then(|f| remap.get(f));
            match replaced {
                Some(faces) => {
                    changed = true;
                    for face in faces {
                        if inserted.insert(*face) {
                            new_sides.push(face.to_string());
                        }
                    }
                }
                None => new_sides.push(token.to_string()),
            }
        }
        if !changed {
            continue;
        }

        if new_sides.is_empty() {
            empty.push(id);
        } else {
            overlay.set("sides", new_sides.join(" "));
            report.rewritten += 1;
        }
    }

    for id in empty {
        log::debug!("Removing overlay {} with no faces left", id);
        doc.remove_ent(id);
        report.removed += 1;
    }
    report
}
