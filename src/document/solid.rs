use super::ids::{FaceId, SolidId};
use crate::vec::Vec3;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const NODRAW: &str = "tools/toolsnodraw";
pub const INVISIBLE: &str = "tools/toolsinvisible";

/// Texture axis of a face: direction, offset and scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvAxis {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub offset: f64,
    pub scale: f64,
}

impl UvAxis {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            offset: 0.0,
            scale: 0.25,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub id: FaceId,
    pub planes: [Vec3; 3],
    pub material: SmolStr,
    pub uaxis: UvAxis,
    pub vaxis: UvAxis,
}

impl Face {
    /// Centre of the face, taken from the bounding box of its plane points.
    ///
    /// Half-unit centres are rounded down onto the unit grid.
    pub fn origin(&self) -> Vec3 {
        let min = self.planes[0].min(self.planes[1]).min(self.planes[2]);
        let max = self.planes[0].max(self.planes[1]).max(self.planes[2]);
        let sum = min + max;
        Vec3::new(
            sum.x.div_euclid(2),
            sum.y.div_euclid(2),
            sum.z.div_euclid(2),
        )
    }

    pub fn swap_axes(&mut self) {
        std::mem::swap(&mut self.uaxis, &mut self.vaxis);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub id: SolidId,
    pub faces: Vec<Face>,
}

impl Solid {
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id == id)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().map(|f| f.id)
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut points = self.faces.iter().flat_map(|f| f.planes.iter().copied());
        let first = points.next().unwrap_or_default();
        points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)))
    }
}

/// Axis-aligned box solid with named access to each side.
///
/// Faces are stored in the order top, bottom, north, south, east, west.
#[derive(Debug, Clone)]
pub struct Prism {
    pub solid: Solid,
}

impl Prism {
    pub(crate) const TOP: usize = 0;
    pub(crate) const BOTTOM: usize = 1;
    pub(crate) const NORTH: usize = 2;
    pub(crate) const SOUTH: usize = 3;
    pub(crate) const EAST: usize = 4;
    pub(crate) const WEST: usize = 5;

    pub(crate) fn build(
        solid_id: SolidId,
        face_ids: [FaceId; 6],
        p1: Vec3,
        p2: Vec3,
        material: &str,
    ) -> Self {
        let lo = p1.min(p2);
        let hi = p1.max(p2);
        let v = Vec3::new;
        let planes = [
            // top
            [v(lo.x, hi.y, hi.z), v(hi.x, hi.y, hi.z), v(hi.x, lo.y, hi.z)],
            // bottom
            [v(lo.x, lo.y, lo.z), v(hi.x, lo.y, lo.z), v(hi.x, hi.y, lo.z)],
            // north
            [v(lo.x, hi.y, lo.z), v(hi.x, hi.y, lo.z), v(hi.x, hi.y, hi.z)],
            // south
            [v(lo.x, lo.y, hi.z), v(hi.x, lo.y, hi.z), v(hi.x, lo.y, lo.z)],
            // east
            [v(hi.x, lo.y, hi.z), v(hi.x, hi.y, hi.z), v(hi.x, hi.y, lo.z)],
            // west
            [v(lo.x, hi.y, hi.z), v(lo.x, lo.y, hi.z), v(lo.x, lo.y, lo.z)],
        ];
        let axes = [
            (UvAxis::new(1.0, 0.0, 0.0), UvAxis::new(0.0, -1.0, 0.0)),
            (UvAxis::new(1.0, 0.0, 0.0), UvAxis::new(0.0, -1.0, 0.0)),
            (UvAxis::new(1.0, 0.0, 0.0), UvAxis::new(0.0, 0.0, -1.0)),
            (UvAxis::new(1.0, 0.0, 0.0), UvAxis::new(0.0, 0.0, -1.0)),
            (UvAxis::new(0.0, 1.0, 0.0), UvAxis::new(0.0, 0.0, -1.0)),
            (UvAxis::new(0.0, 1.0, 0.0), UvAxis::new(0.0, 0.0, -1.0)),
        ];

        let faces = face_ids
            .into_iter()
            .zip(planes)
            .zip(axes)
            .map(|((id, planes), (uaxis, vaxis))| Face {
                id,
                planes,
                material: SmolStr::new(material),
                uaxis,
                vaxis,
            })
            .collect();

        Self {
            solid: Solid {
                id: solid_id,
                faces,
            },
        }
    }

    pub fn top(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::TOP]
    }

    pub fn bottom(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::BOTTOM]
    }

    pub fn north(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::NORTH]
    }

    pub fn south(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::SOUTH]
    }

    pub fn east(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::EAST]
    }

    pub fn west(&mut self) -> &mut Face {
        &mut self.solid.faces[Self::WEST]
    }

    /// The four side faces, north, south, east, west.
    pub fn sides(&mut self) -> &mut [Face] {
        &mut self.solid.faces[Self::NORTH..=Self::WEST]
    }

    pub fn into_solid(self) -> Solid {
        self.solid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prism(p1: Vec3, p2: Vec3) -> Prism {
        let ids = [1, 2, 3, 4, 5, 6].map(FaceId);
        Prism::build(SolidId(1), ids, p1, p2, NODRAW)
    }

    #[test]
    fn test_prism_face_origins() {
        let mut p = prism(Vec3::new(0, 0, -2), Vec3::new(32, 32, 0));
        assert_eq!(p.top().origin(), Vec3::new(16, 16, 0));
        assert_eq!(p.bottom().origin(), Vec3::new(16, 16, -2));
        assert_eq!(p.north().origin(), Vec3::new(16, 32, -1));
        assert_eq!(p.south().origin(), Vec3::new(16, 0, -1));
        assert_eq!(p.east().origin(), Vec3::new(32, 16, -1));
        assert_eq!(p.west().origin(), Vec3::new(0, 16, -1));
    }

    #[test]
    fn test_prism_normalizes_corners() {
        let a = prism(Vec3::new(32, 32, 0), Vec3::new(0, 0, -2)).into_solid();
        let b = prism(Vec3::new(0, 0, -2), Vec3::new(32, 32, 0)).into_solid();
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.bounds(), (Vec3::new(0, 0, -2), Vec3::new(32, 32, 0)));
    }

    #[test]
    fn test_swap_axes() {
        let mut p = prism(Vec3::ZERO, Vec3::new(128, 128, 128));
        let face = p.east();
        let (u, v) = (face.uaxis.clone(), face.vaxis.clone());
        face.swap_axes();
        assert_eq!(face.uaxis, v);
        assert_eq!(face.vaxis, u);
    }
}
