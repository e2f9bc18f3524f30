//! In-memory brush map document.
//!
//! Holds world brushes, entities, the per-block surface index and the set of
//! faces later texturing passes must leave alone. Generation code reads and
//! mutates the map exclusively through [`MapDocument`].

mod entity;
mod ids;
mod solid;
mod textures;

pub use entity::{Entity, Output};
pub use ids::{EntityId, FaceId, SolidId};
pub use solid::{Face, Prism, Solid, UvAxis, INVISIBLE, NODRAW};
pub use textures::{Surface, SurfaceColor, TextureTable};

use crate::vec::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

/// A pre-existing 128x128 surface brush, indexed by the centre of its visible face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBrush {
    pub solid: SolidId,
    pub face: FaceId,
    pub color: SurfaceColor,
}

#[derive(Debug, Default)]
pub struct MapDocument {
    world: Vec<Solid>,
    entities: Vec<Entity>,
    surfaces: FxHashMap<Vec3, SurfaceBrush>,
    ignored_faces: FxHashSet<FaceId>,
    next_id: u32,
}

impl MapDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // -- Brushes --

    /// Build an axis-aligned box between two opposite corners, every face using `material`.
    pub fn make_prism(&mut self, p1: Vec3, p2: Vec3, material: &str) -> Prism {
        let solid_id = SolidId(self.alloc());
        let face_ids = [(); 6].map(|_| FaceId(self.alloc()));
        Prism::build(solid_id, face_ids, p1, p2, material)
    }

    pub fn add_brush(&mut self, solid: Solid) -> SolidId {
        let id = solid.id;
        self.world.push(solid);
        id
    }

    /// Remove a brush from the world or from whichever entity owns it.
    pub fn remove_brush(&mut self, id: SolidId) -> Option<Solid> {
        if let Some(pos) = self.world.iter().position(|s| s.id == id) {
            return Some(self.world.remove(pos));
        }
        for ent in &mut self.entities {
            if let Some(pos) = ent.solids.iter().position(|s| s.id == id) {
                return Some(ent.solids.remove(pos));
            }
        }
        None
    }

    pub fn world_brushes(&self) -> &[Solid] {
        &self.world
    }

    pub fn brush(&self, id: SolidId) -> Option<&Solid> {
        self.world
            .iter()
            .chain(self.entities.iter().flat_map(|e| e.solids.iter()))
            .find(|s| s.id == id)
    }

    /// Faces of world brushes only; brush entities are excluded.
    pub fn world_faces(&self) -> impl Iterator<Item = &Face> {
        self.world.iter().flat_map(|s| s.faces.iter())
    }

    pub fn world_faces_mut(&mut self) -> impl Iterator<Item = &mut Face> {
        self.world.iter_mut().flat_map(|s| s.faces.iter_mut())
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.world
            .iter()
            .chain(self.entities.iter().flat_map(|e| e.solids.iter()))
            .find_map(|s| s.face(id))
    }

    // -- Entities --

    pub fn create_ent(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.alloc());
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub fn remove_ent(&mut self, id: EntityId) -> Option<Entity> {
        let pos = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(pos))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Attach a brush to an existing entity. Returns `false` if the entity does not exist.
    pub fn attach_brush(&mut self, ent: EntityId, solid: Solid) -> bool {
        match self.entity_mut(ent) {
            Some(e) => {
                e.solids.push(solid);
                true
            }
            None => false,
        }
    }

    /// Ids of all entities with the given classname, in insertion order.
    pub fn by_class(&self, classname: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.classname.eq_ignore_ascii_case(classname))
            .map(|e| e.id)
            .collect()
    }

    /// Ids of all entities with the given targetname, in insertion order.
    pub fn by_target(&self, targetname: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.targetname() == targetname)
            .map(|e| e.id)
            .collect()
    }

    // -- Surface index --

    pub fn surface_at(&self, center: Vec3) -> Option<SurfaceBrush> {
        self.surfaces.get(&center).copied()
    }

    pub fn register_surface(&mut self, center: Vec3, surface: SurfaceBrush) {
        self.surfaces.insert(center, surface);
    }

    pub fn remove_surface(&mut self, center: Vec3) -> Option<SurfaceBrush> {
        self.surfaces.remove(&center)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Add a 128-unit cube behind a surface and index it.
    ///
    /// `center` is the centre of the visible face: the top face for floors,
    /// the bottom face for ceilings. Every other face is nodrawn.
    pub fn add_surface_block(
        &mut self,
        center: Vec3,
        surface: Surface,
        color: SurfaceColor,
        material: &str,
    ) -> SurfaceBrush {
        let depth = -128 * surface.sign();
        let mut prism = self.make_prism(
            center - (64, 64, 0),
            center + Vec3::new(64, 64, depth),
            NODRAW,
        );
        let solid = prism.solid.id;
        let face = match surface {
            Surface::Floor => prism.top(),
            Surface::Ceiling => prism.bottom(),
        };
        face.material = material.into();
        let brush = SurfaceBrush {
            solid,
            face: face.id,
            color,
        };
        self.add_brush(prism.into_solid());
        self.register_surface(center, brush);
        brush
    }

    // -- Texturing hints --

    pub fn ignore_face(&mut self, id: FaceId) {
        self.ignored_faces.insert(id);
    }

    pub fn is_ignored(&self, id: FaceId) -> bool {
        self.ignored_faces.contains(&id)
    }
}
