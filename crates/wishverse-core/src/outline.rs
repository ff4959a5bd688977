//! 2D outlines for extruded tiers: the fixed heart path and caller-supplied
//! polygons, plus ear-clipping triangulation for the extrusion caps.

use crate::constants::{CURVE_SEGMENTS, FALLBACK_TRIANGLE};
use fnv::FnvHasher;
use glam::Vec2;
use kurbo::{CubicBez, ParamCurve, Point};
use std::hash::Hasher;

const DUPLICATE_EPS: f32 = 1e-5;

#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    pub points: Vec<Vec2>,
}

impl Outline {
    /// The heart: six cubic segments starting and ending at (5, 5).
    pub fn heart() -> Outline {
        let p = |x: f64, y: f64| Point::new(x, y);
        let segments = [
            CubicBez::new(p(5.0, 5.0), p(5.0, 5.0), p(4.0, 0.0), p(0.0, 0.0)),
            CubicBez::new(p(0.0, 0.0), p(-6.0, 0.0), p(-6.0, 7.0), p(-6.0, 7.0)),
            CubicBez::new(p(-6.0, 7.0), p(-6.0, 11.0), p(-3.0, 15.4), p(5.0, 19.0)),
            CubicBez::new(p(5.0, 19.0), p(12.0, 15.4), p(16.0, 11.0), p(16.0, 7.0)),
            CubicBez::new(p(16.0, 7.0), p(16.0, 7.0), p(16.0, 0.0), p(10.0, 0.0)),
            CubicBez::new(p(10.0, 0.0), p(7.0, 0.0), p(5.0, 5.0), p(5.0, 5.0)),
        ];
        let mut points = vec![Vec2::new(5.0, 5.0)];
        for seg in &segments {
            for i in 1..=CURVE_SEGMENTS {
                let q = seg.eval(i as f64 / CURVE_SEGMENTS as f64);
                push_unique(&mut points, Vec2::new(q.x as f32, q.y as f32));
            }
        }
        close(&mut points);
        Outline { points }
    }

    /// Polygon from caller points. Fewer than three usable points yields the
    /// fixed fallback triangle.
    pub fn from_points(raw: &[[f32; 2]]) -> Outline {
        let mut points = Vec::with_capacity(raw.len());
        for p in raw.iter().filter(|p| p[0].is_finite() && p[1].is_finite()) {
            push_unique(&mut points, Vec2::new(p[0], p[1]));
        }
        close(&mut points);
        if points.len() < 3 {
            return Outline::fallback();
        }
        Outline { points }
    }

    pub fn fallback() -> Outline {
        Outline {
            points: FALLBACK_TRIANGLE.iter().map(|p| Vec2::new(p[0], p[1])).collect(),
        }
    }

    /// Twice the signed area; positive for counter-clockwise winding.
    pub fn signed_area2(&self) -> f32 {
        signed_area2(&self.points)
    }

    pub fn triangulate(&self) -> Vec<[u32; 3]> {
        triangulate(&self.points)
    }
}

/// Stable hash of caller points, used to key cached custom-tier meshes.
pub fn fingerprint(raw: &[[f32; 2]]) -> u64 {
    let mut h = FnvHasher::default();
    h.write_usize(raw.len());
    for p in raw {
        h.write_u32(p[0].to_bits());
        h.write_u32(p[1].to_bits());
    }
    h.finish()
}

fn push_unique(points: &mut Vec<Vec2>, p: Vec2) {
    if points.last().is_some_and(|last| last.distance(p) <= DUPLICATE_EPS) {
        return;
    }
    points.push(p);
}

// drop an explicit closing point equal to the first
fn close(points: &mut Vec<Vec2>) {
    if points.len() > 1 && points[0].distance(points[points.len() - 1]) <= DUPLICATE_EPS {
        points.pop();
    }
}

fn signed_area2(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

#[inline]
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    cross(a, b, p) > 0.0 && cross(b, c, p) > 0.0 && cross(c, a, p) > 0.0
}

/// Ear-clipping triangulation. Output triangles are counter-clockwise in the
/// outline's plane regardless of input winding. Self-intersecting input that
/// runs out of ears is finished with a fan.
pub fn triangulate(points: &[Vec2]) -> Vec<[u32; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let mut ring: Vec<usize> = if signed_area2(points) >= 0.0 {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };
    let mut tris = Vec::with_capacity(n - 2);

    while ring.len() > 3 {
        let m = ring.len();
        let ear = (0..m).find(|&i| {
            let (ia, ib, ic) = (ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]);
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            if cross(a, b, c) <= 1e-9 {
                return false;
            }
            ring.iter()
                .filter(|&&j| j != ia && j != ib && j != ic)
                .all(|&j| !point_in_triangle(points[j], a, b, c))
        });
        match ear {
            Some(i) => {
                tris.push([
                    ring[(i + m - 1) % m] as u32,
                    ring[i] as u32,
                    ring[(i + 1) % m] as u32,
                ]);
                ring.remove(i);
            }
            None => {
                for i in 1..ring.len() - 1 {
                    tris.push([ring[0] as u32, ring[i] as u32, ring[i + 1] as u32]);
                }
                return tris;
            }
        }
    }
    tris.push([ring[0] as u32, ring[1] as u32, ring[2] as u32]);
    tris
}
