use crate::document::{MapDocument, Prism, UvAxis};
use crate::error::{CutoutError, Result};
use crate::vec::Vec3;

/// Height of the squarebeams texture in texels.
const BEAM_TEXTURE_HEIGHT: i32 = 512;
/// Texels per map unit at 0.25 scale.
const TEXELS_PER_UNIT: i32 = 4;

/// Vertical texture offset that puts the thin squarebeams line on a tile side.
///
/// Only 1 and 2 unit thick tiles are supported.
pub fn beam_offset(top_z: i32, thickness: i32) -> Result<i32> {
    let centering = match thickness {
        2 => 56,
        1 => 54,
        _ => return Err(CutoutError::InvalidThickness { thickness }),
    };
    Ok((top_z * TEXELS_PER_UNIT + centering).rem_euclid(BEAM_TEXTURE_HEIGHT))
}

/// Build a 1 or 2 unit thick tile between two opposite corners.
///
/// Sides get `beam_mat` aligned so beam lines continue across neighbouring
/// tiles. Every face is marked ignored so later retexturing leaves it alone.
/// The brush is not added to the document; the caller decides where it goes.
pub fn make_tile(
    doc: &mut MapDocument,
    p1: Vec3,
    p2: Vec3,
    top_mat: &str,
    bottom_mat: &str,
    beam_mat: &str,
) -> Result<Prism> {
    let thickness = (p1.z - p2.z).abs();
    let z_off = beam_offset(p1.z.max(p2.z), thickness)? as f64;

    let mut prism = doc.make_prism(p1, p2, beam_mat);
    prism.top().material = top_mat.into();
    prism.bottom().material = bottom_mat.into();

    let (north_south, east_west) = prism.sides().split_at_mut(2);
    for face in north_south {
        face.uaxis = UvAxis::new(0.0, 0.0, 1.0).with_offset(z_off);
        face.vaxis = UvAxis::new(1.0, 0.0, 0.0);
    }
    for face in east_west {
        face.uaxis = UvAxis::new(0.0, 0.0, 1.0).with_offset(z_off);
        face.vaxis = UvAxis::new(0.0, 1.0, 0.0);
    }

    for id in prism.solid.face_ids().collect::<Vec<_>>() {
        doc.ignore_face(id);
    }
    Ok(prism)
}
