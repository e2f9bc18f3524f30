//! Squarebeams support props and their collision lattice.

use crate::document::{Entity, MapDocument, Surface, NODRAW};
use crate::vec::{iter_grid, Vec3};
use serde::Serialize;

const MODEL_PREFIX: &str = "models/anim_wp/framework/squarebeam_off";

/// Prop size tier, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamTier {
    /// One prop per 512x512 cell.
    Large,
    /// One prop per 256x256 cell.
    Medium,
    /// One prop per 128x128 cell.
    Small,
    /// One prop per 64x64 cell.
    Fine,
}

impl BeamTier {
    pub fn spacing(self) -> i32 {
        match self {
            BeamTier::Large => 512,
            BeamTier::Medium => 256,
            BeamTier::Small => 128,
            BeamTier::Fine => 64,
        }
    }

    fn model_suffix(self) -> &'static str {
        match self {
            BeamTier::Large => "_8x8",
            BeamTier::Medium => "_4x4",
            BeamTier::Small => "_2x2",
            BeamTier::Fine => "",
        }
    }

    pub fn model(self) -> String {
        format!("{}{}.mdl", MODEL_PREFIX, self.model_suffix())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BeamReport {
    pub large: usize,
    pub medium: usize,
    pub small: usize,
    pub fine: usize,
    pub collision_strips: usize,
}

impl BeamReport {
    pub fn props(&self) -> usize {
        self.large + self.medium + self.small + self.fine
    }

    fn count(&mut self, tier: BeamTier) {
        match tier {
            BeamTier::Large => self.large += 1,
            BeamTier::Medium => self.medium += 1,
            BeamTier::Small => self.small += 1,
            BeamTier::Fine => self.fine += 1,
        }
    }

    pub fn merge(&mut self, other: &BeamReport) {
        self.large += other.large;
        self.medium += other.medium;
        self.small += other.small;
        self.fine += other.fine;
        self.collision_strips += other.collision_strips;
    }
}

/// Fills an area with squarebeams props, using big models where possible.
pub struct BeamGenerator<'a> {
    pub skin: &'a str,
    pub surface: Surface,
    pub with_collision: bool,
}

impl<'a> BeamGenerator<'a> {
    pub fn new(skin: &'a str, surface: Surface) -> Self {
        Self {
            skin,
            surface,
            with_collision: true,
        }
    }

    pub fn with_collision(mut self, enabled: bool) -> Self {
        self.with_collision = enabled;
        self
    }

    /// Fill the box between `p1` and `p2`, which should be a multiple of 64 in X and Y.
    ///
    /// Props sit 8 units inside the box from its back face: above the lowest
    /// Z for floors, below the highest Z for ceilings.
    pub fn generate(&self, doc: &mut MapDocument, p1: Vec3, p2: Vec3) -> BeamReport {
        let lo = p1.min(p2);
        let hi = p1.max(p2);
        let z = match self.surface {
            Surface::Floor => lo.z + 8,
            Surface::Ceiling => hi.z - 8,
        };
        let dist_x = hi.x - lo.x;
        let dist_y = hi.y - lo.y;

        let mut report = BeamReport::default();
        for (x, y) in iter_grid(0, dist_x, 0, dist_y, 64) {
            let tier = tier_at(x, y, dist_x, dist_y);
            let spacing = tier.spacing();
            if x % spacing != 0 || y % spacing != 0 {
                continue;
            }
            let half = spacing / 2;
            self.place_prop(doc, Vec3::new(lo.x + x + half, lo.y + y + half, z), tier);
            report.count(tier);
        }

        if self.with_collision {
            report.collision_strips = self.add_collision(doc, lo, hi, z);
        }

        log::debug!(
            "Placed {} squarebeams props ({} large) over {} .. {}",
            report.props(),
            report.large,
            lo,
            hi
        );
        report
    }

    fn place_prop(&self, doc: &mut MapDocument, origin: Vec3, tier: BeamTier) {
        let angles = match self.surface {
            Surface::Floor => "0 0 0",
            Surface::Ceiling => "0 0 180",
        };
        doc.create_ent(
            Entity::new("prop_static")
                .with_key("angles", angles)
                .with_key("origin", origin.join(" "))
                .with_key("model", tier.model())
                .with_key("skin", self.skin)
                .with_key("disableshadows", "1"),
        );
    }

    /// Thin nodraw strips along every inner 64-unit line, plus the four outer edges.
    fn add_collision(&self, doc: &mut MapDocument, lo: Vec3, hi: Vec3, z: i32) -> usize {
        let collision = doc.create_ent(
            Entity::new("func_brush")
                .with_key("disableshadows", "1")
                .with_key("disableflashlight", "1")
                .with_key("disablereceiveshadows", "1")
                .with_key("shadowdepthnocache", "1")
                .with_key("solidity", "2") // Always Solid
                .with_key("solidbsp", "1"),
        );
        let s = self.surface.sign();
        let (near, far) = (z - 2 * s, z - 8 * s);

        let mut strips = Vec::new();
        for x in (lo.x + 64..hi.x).step_by(64) {
            strips.push((Vec3::new(x - 2, lo.y + 2, near), Vec3::new(x + 2, hi.y - 2, far)));
        }
        for y in (lo.y + 64..hi.y).step_by(64) {
            strips.push((Vec3::new(lo.x + 2, y - 2, near), Vec3::new(hi.x - 2, y + 2, far)));
        }
        for (x1, y1, x2, y2) in [
            (lo.x, lo.y, hi.x, lo.y + 2),
            (lo.x, hi.y, hi.x, hi.y - 2),
            (lo.x, lo.y, lo.x + 2, hi.y),
            (hi.x, lo.y, hi.x - 2, hi.y),
        ] {
            strips.push((Vec3::new(x1, y1, near), Vec3::new(x2, y2, far)));
        }

        let count = strips.len();
        for (a, b) in strips {
            let solid = doc.make_prism(a, b, NODRAW).into_solid();
            doc.attach_brush(collision, solid);
        }
        count
    }
}

/// Which tier covers the 64-unit cell at offset `(x, y)` from the low corner.
///
/// Each tier covers the part of the area that still fits whole cells of its
/// spacing in both axes; whatever is left falls to the next smaller tier.
pub fn tier_at(x: i32, y: i32, dist_x: i32, dist_y: i32) -> BeamTier {
    for tier in [BeamTier::Large, BeamTier::Medium, BeamTier::Small] {
        let spacing = tier.spacing();
        let cutoff_x = dist_x / spacing * spacing;
        let cutoff_y = dist_y / spacing * spacing;
        if x < cutoff_x && y < cutoff_y {
            return tier;
        }
    }
    BeamTier::Fine
}
