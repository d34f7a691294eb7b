//! The disk (circle) shape.

use crate::collision::aabb::Aabb;
use crate::math::{Transformation, Vec2};
use crate::shape::massdata::MassData;
use crate::shape::proxy::DistanceProxy;

/// A disk shape: a circle of `radius` centered at `center` in local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    /// Local-space center.
    pub center: Vec2,
    /// Radius; also this shape's vertex radius (a disk is "all skin").
    pub radius: f64,
}

impl Disk {
    /// Construct a disk of the given radius at the local origin.
    pub fn new(radius: f64) -> Self {
        Self {
            center: Vec2::zero(),
            radius,
        }
    }

    /// Construct a disk of the given radius at a local-space center.
    pub fn with_center(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Always one child.
    pub fn child_count(&self) -> usize {
        1
    }

    /// The single distance proxy for this shape.
    pub fn proxy(&self) -> DistanceProxy {
        DistanceProxy::for_point(self.center, self.radius)
    }

    /// World-space AABB.
    pub fn compute_aabb(&self, xf: &Transformation) -> Aabb {
        let center = xf.transform(self.center);
        Aabb::new(
            center - Vec2::new(self.radius, self.radius),
            center + Vec2::new(self.radius, self.radius),
        )
    }

    /// Mass properties at the given density.
    pub fn compute_mass(&self, density: f64) -> MassData {
        let mass = density * std::f64::consts::PI * self.radius * self.radius;
        // I = m * r^2 / 2 about the centroid, then parallel-axis shifted
        // to the local origin.
        let rot_inertia =
            mass * (0.5 * self.radius * self.radius + self.center.dot(self.center));
        MassData {
            mass,
            center: self.center,
            rot_inertia,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_of_unit_disk() {
        let disk = Disk::new(1.0);
        let mass_data = disk.compute_mass(1.0);
        assert!((mass_data.mass - std::f64::consts::PI).abs() < 1e-9);
    }
}
