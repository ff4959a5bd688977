//! CPU-side mesh generation for the cake primitives.
//!
//! Conventions follow the usual three-style primitives: cylinders and boxes
//! are centred on the origin with Y up, rings lie in the XY plane facing +Z,
//! extrusions run from z = 0 to z = depth.

use crate::constants::*;
use crate::outline::{fingerprint, Outline};
use fnv::{FnvHashMap, FnvHashSet};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(p: Vec3, n: Vec3) -> Self {
        Self {
            position: p.to_array(),
            normal: n.normalize_or_zero().to_array(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Identity of a generated mesh. Dimensions are stored in millimetres so the
/// key stays hashable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKey {
    TierRound,
    TierSquare,
    TierHeart,
    /// Extruded caller outline, keyed by the fingerprint of its points.
    TierCustom(u64),
    Sphere {
        radius_mm: u32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_mm: u32,
        height_mm: u32,
        segments: u32,
    },
    Cuboid {
        w_mm: u32,
        h_mm: u32,
        d_mm: u32,
    },
    SelectionRing,
}

#[inline]
pub fn mm(v: f32) -> u32 {
    (v * 1000.0).round().max(0.0) as u32
}

#[inline]
fn from_mm(v: u32) -> f32 {
    v as f32 / 1000.0
}

impl MeshKey {
    pub fn custom_tier(path: Option<&[[f32; 2]]>) -> MeshKey {
        MeshKey::TierCustom(fingerprint(path.unwrap_or(&[])))
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshKey {
        MeshKey::Sphere {
            radius_mm: mm(radius),
            width_segments,
            height_segments,
        }
    }

    pub fn cylinder(radius: f32, height: f32) -> MeshKey {
        MeshKey::Cylinder {
            radius_mm: mm(radius),
            height_mm: mm(height),
            segments: 16,
        }
    }

    pub fn cuboid(w: f32, h: f32, d: f32) -> MeshKey {
        MeshKey::Cuboid {
            w_mm: mm(w),
            h_mm: mm(h),
            d_mm: mm(d),
        }
    }

    /// Build the mesh for this key. `custom_path` is only read for `TierCustom`.
    pub fn build(&self, custom_path: Option<&[[f32; 2]]>) -> Mesh {
        match *self {
            MeshKey::TierRound => cylinder(ROUND_RADIUS, ROUND_RADIUS, LAYER_HEIGHT, ROUND_SEGMENTS),
            MeshKey::TierSquare => cuboid(SQUARE_SIDE, LAYER_HEIGHT, SQUARE_SIDE),
            MeshKey::TierHeart => extrude(&Outline::heart(), HEART_DEPTH),
            MeshKey::TierCustom(_) => extrude(&Outline::from_points(custom_path.unwrap_or(&[])), CUSTOM_DEPTH),
            MeshKey::Sphere {
                radius_mm,
                width_segments,
                height_segments,
            } => sphere(from_mm(radius_mm), width_segments, height_segments),
            MeshKey::Cylinder {
                radius_mm,
                height_mm,
                segments,
            } => {
                let r = from_mm(radius_mm);
                cylinder(r, r, from_mm(height_mm), segments)
            }
            MeshKey::Cuboid { w_mm, h_mm, d_mm } => cuboid(from_mm(w_mm), from_mm(h_mm), from_mm(d_mm)),
            MeshKey::SelectionRing => ring(SELECTION_RING_INNER, SELECTION_RING_OUTER, SELECTION_RING_SEGMENTS),
        }
    }
}

/// Drop cached custom-tier meshes that none of `live` uses. Every other key
/// comes from a fixed catalog and stays cached.
pub fn prune_custom_meshes<V>(cache: &mut FnvHashMap<MeshKey, V>, live: impl IntoIterator<Item = MeshKey>) -> usize {
    let live: FnvHashSet<MeshKey> = live.into_iter().collect();
    let before = cache.len();
    cache.retain(|key, _| !matches!(key, MeshKey::TierCustom(_)) || live.contains(key));
    before - cache.len()
}

impl Mesh {
    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec3::from_array(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }
}

pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height.max(1e-6);
    let mut m = Mesh::default();

    // side
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (s, c) = theta.sin_cos();
        let n = Vec3::new(s, slope, c);
        m.vertices.push(Vertex::new(Vec3::new(radius_top * s, half, radius_top * c), n));
        m.vertices.push(Vertex::new(Vec3::new(radius_bottom * s, -half, radius_bottom * c), n));
    }
    for i in 0..segments {
        let a = i * 2;
        m.push_quad(a, a + 1, a + 3, a + 2);
    }

    // caps
    for (y, r, up) in [(half, radius_top, 1.0_f32), (-half, radius_bottom, -1.0)] {
        let n = Vec3::new(0.0, up, 0.0);
        let center = m.base();
        m.vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), n));
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            m.vertices.push(Vertex::new(Vec3::new(r * s, y, r * c), n));
        }
        for i in 0..segments {
            let (a, b) = (center + 1 + i, center + 2 + i);
            if up > 0.0 {
                m.indices.extend_from_slice(&[center, a, b]);
            } else {
                m.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
    m
}

pub fn cuboid(w: f32, h: f32, d: f32) -> Mesh {
    let e = Vec3::new(w, h, d) * 0.5;
    let mut m = Mesh::default();
    // (normal, u axis, v axis) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    for (n, u, v) in faces {
        let base = m.base();
        let center = n * e;
        let du = u * e;
        let dv = v * e;
        for corner in [-du - dv, du - dv, du + dv, -du + dv] {
            m.vertices.push(Vertex::new(center + corner, n));
        }
        m.push_quad(base, base + 1, base + 2, base + 3);
    }
    m
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut m = Mesh::default();
    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let phi = v * PI;
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let theta = u * TAU;
            let n = Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            m.vertices.push(Vertex::new(n * radius, n));
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                m.indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                m.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    m
}

/// Flat annulus in the XY plane, emitted double-sided.
pub fn ring(inner: f32, outer: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let mut m = Mesh::default();
    for side in [1.0_f32, -1.0] {
        let base = m.base();
        let n = Vec3::new(0.0, 0.0, side);
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            m.vertices.push(Vertex::new(Vec3::new(inner * c, inner * s, 0.0), n));
            m.vertices.push(Vertex::new(Vec3::new(outer * c, outer * s, 0.0), n));
        }
        for i in 0..segments {
            let a = base + i * 2;
            if side > 0.0 {
                m.push_quad(a, a + 1, a + 3, a + 2);
            } else {
                m.push_quad(a, a + 2, a + 3, a + 1);
            }
        }
    }
    m
}

/// Extrude an outline along +Z. Caps are ear-clipped; side walls get flat
/// per-edge normals.
pub fn extrude(outline: &Outline, depth: f32) -> Mesh {
    let mut m = Mesh::default();
    let tris = outline.triangulate();
    let mut pts: Vec<Vec2> = outline.points.clone();
    if outline.signed_area2() < 0.0 {
        pts.reverse();
    }
    let ccw_tris = if outline.signed_area2() < 0.0 {
        // triangulate() indexes the original order; remap onto the reversed ring
        let n = pts.len() as u32;
        tris.iter()
            .map(|t| [n - 1 - t[0], n - 1 - t[1], n - 1 - t[2]])
            .collect::<Vec<_>>()
    } else {
        tris
    };

    // back cap (z = 0, facing -Z) and front cap (z = depth, facing +Z)
    for (z, nz) in [(0.0_f32, -1.0_f32), (depth, 1.0)] {
        let base = m.base();
        let n = Vec3::new(0.0, 0.0, nz);
        for p in &pts {
            m.vertices.push(Vertex::new(Vec3::new(p.x, p.y, z), n));
        }
        for t in &ccw_tris {
            if nz > 0.0 {
                m.indices.extend_from_slice(&[base + t[0], base + t[1], base + t[2]]);
            } else {
                m.indices.extend_from_slice(&[base + t[0], base + t[2], base + t[1]]);
            }
        }
    }

    // walls
    let n = pts.len();
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let edge = b - a;
        let normal = Vec3::new(edge.y, -edge.x, 0.0);
        let base = m.base();
        m.vertices.push(Vertex::new(Vec3::new(a.x, a.y, 0.0), normal));
        m.vertices.push(Vertex::new(Vec3::new(b.x, b.y, 0.0), normal));
        m.vertices.push(Vertex::new(Vec3::new(b.x, b.y, depth), normal));
        m.vertices.push(Vertex::new(Vec3::new(a.x, a.y, depth), normal));
        m.push_quad(base, base + 1, base + 2, base + 3);
    }
    m
}
