//! Field bounds: the axis-aligned play area
//!
//! X and Z define where balls may roam. Y only supplies the floor that the
//! roaming plane height is measured from.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Axis-aligned play volume, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    min: Vec3,
    max: Vec3,
}

impl FieldBounds {
    /// Build from any two opposite corners
    pub fn from_corners(a: Vec3, b: Vec3) -> Result<Self, MatchError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(MatchError::DegenerateBounds {
                min: a.to_array(),
                max: b.to_array(),
            });
        }
        Ok(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Build from a placed box volume (center + half extents)
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Result<Self, MatchError> {
        let half = half_extents.abs();
        Self::from_corners(center - half, center + half)
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Roaming plane height: `offset` above the floor
    #[inline]
    pub fn spawn_height(&self, offset: f32) -> f32 {
        self.min.y + offset
    }

    /// Legal XZ interval after insetting by `margin`.
    ///
    /// An axis narrower than twice the margin collapses to its center.
    pub fn inner_xz(&self, margin: f32) -> (Vec2, Vec2) {
        let lo = Vec2::new(self.min.x, self.min.z) + Vec2::splat(margin);
        let hi = Vec2::new(self.max.x, self.max.z) - Vec2::splat(margin);
        let mid = (lo + hi) * 0.5;
        (lo.min(mid), hi.max(mid))
    }

    /// Whether `p` lies inside the inset XZ area (Y ignored)
    pub fn contains_xz(&self, p: Vec3, margin: f32) -> bool {
        let (lo, hi) = self.inner_xz(margin);
        (lo.x..=hi.x).contains(&p.x) && (lo.y..=hi.y).contains(&p.z)
    }

    /// Clamp X/Z of `p` into the inset area, leaving Y untouched
    pub fn clamp_xz(&self, p: Vec3, margin: f32) -> Vec3 {
        let (lo, hi) = self.inner_xz(margin);
        Vec3::new(p.x.clamp(lo.x, hi.x), p.y, p.z.clamp(lo.y, hi.y))
    }

    /// Uniform random point in the inset area at the given height
    pub fn sample_point<R: Rng + ?Sized>(&self, margin: f32, height: f32, rng: &mut R) -> Vec3 {
        let (lo, hi) = self.inner_xz(margin);
        let x = rng.random_range(lo.x..=hi.x);
        let z = rng.random_range(lo.y..=hi.y);
        Vec3::new(x, height, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> FieldBounds {
        FieldBounds::from_corners(Vec3::new(-20.0, 0.0, -30.0), Vec3::new(20.0, 4.0, 30.0)).unwrap()
    }

    #[test]
    fn test_corners_are_normalized() {
        let b = FieldBounds::from_corners(Vec3::new(5.0, 2.0, -1.0), Vec3::new(-5.0, 0.0, 1.0)).unwrap();
        assert_eq!(b.min(), Vec3::new(-5.0, 0.0, -1.0));
        assert_eq!(b.max(), Vec3::new(5.0, 2.0, 1.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = FieldBounds::from_corners(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE).unwrap_err();
        assert!(matches!(err, MatchError::DegenerateBounds { .. }));
    }

    #[test]
    fn test_center_extents() {
        let b = FieldBounds::from_center_extents(Vec3::new(0.0, 2.0, 0.0), Vec3::new(20.0, -2.0, 30.0)).unwrap();
        assert_eq!(b, field());
        assert_eq!(b.center(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(b.spawn_height(0.5), 0.5);
    }

    #[test]
    fn test_samples_stay_inside_margin() {
        let b = field();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..2000 {
            let p = b.sample_point(0.5, b.spawn_height(0.5), &mut rng);
            assert!((-19.5..=19.5).contains(&p.x), "x out of range: {}", p.x);
            assert!((-29.5..=29.5).contains(&p.z), "z out of range: {}", p.z);
            assert_eq!(p.y, 0.5);
        }
    }

    #[test]
    fn test_clamp_xz() {
        let b = field();
        let p = b.clamp_xz(Vec3::new(25.0, 3.0, -40.0), 0.5);
        assert_eq!(p, Vec3::new(19.5, 3.0, -29.5));
        assert!(b.contains_xz(p, 0.5));
        assert!(!b.contains_xz(Vec3::new(19.6, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_oversized_margin_collapses_to_center() {
        let b = FieldBounds::from_corners(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 10.0)).unwrap();
        let (lo, hi) = b.inner_xz(3.0);
        assert_eq!(lo.x, 1.0);
        assert_eq!(hi.x, 1.0);
        assert!(lo.y <= hi.y);

        let mut rng = Pcg32::seed_from_u64(1);
        let p = b.sample_point(3.0, 0.0, &mut rng);
        assert_eq!(p.x, 1.0);
    }
}
