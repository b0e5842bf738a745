use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Common math types re-exported for convenience.
pub use glam::Vec2;

/// Position, orientation, and non-uniform scale of an actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builds a homogeneous matrix representation of the transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Maps a local-space point into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }
}

/// Sphere described by center and radius, used for coarse culls and
/// compound aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 0.0,
        }
    }
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere spanning the box `[min, max]`.
    pub fn from_box(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            radius: min.distance(max) * 0.5,
        }
    }

    /// Whether `other` lies entirely inside this sphere.
    pub fn contains(&self, other: &BoundingSphere) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius
    }

    /// Smallest sphere enclosing both inputs. When one sphere already
    /// contains the other, that sphere is returned unchanged.
    pub fn merge(&self, other: &BoundingSphere) -> BoundingSphere {
        let offset = other.center - self.center;
        let dist = offset.length();
        if self.radius >= dist + other.radius {
            return *self;
        }
        if other.radius >= dist + self.radius {
            return *other;
        }

        let radius = (dist + self.radius + other.radius) * 0.5;
        let center = self.center + offset * ((radius - self.radius) / dist);
        BoundingSphere { center, radius }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_matches_matrix_path() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_z(0.7),
            scale: Vec3::new(2.0, 1.0, 0.5),
        };
        let point = Vec3::new(-0.5, 4.0, 1.5);

        let direct = transform.transform_point(point);
        let via_matrix = transform.to_matrix().transform_point3(point);
        assert!((direct - via_matrix).length() < 1e-5);
    }

    #[test]
    fn merge_returns_container_when_nested() {
        let big = BoundingSphere::new(Vec3::ZERO, 5.0);
        let small = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);

        assert_eq!(big.merge(&small), big);
        assert_eq!(small.merge(&big), big);
    }

    #[test]
    fn merge_encloses_disjoint_spheres() {
        let a = BoundingSphere::new(Vec3::new(-3.0, 0.0, 0.0), 1.0);
        let b = BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 2.0);
        let merged = a.merge(&b);

        assert!(merged.contains(&a), "merged sphere lost {a:?}");
        assert!(merged.contains(&b), "merged sphere lost {b:?}");
        assert!((merged.radius - 5.0).abs() < 1e-5, "radius was {}", merged.radius);
    }

    #[test]
    fn merge_encloses_random_sphere_pairs() {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / (1u64 << 31) as f32) * 20.0 - 10.0
        };

        for _ in 0..200 {
            let a = BoundingSphere::new(
                Vec3::new(next(), next(), next()),
                next().abs() * 0.5 + 0.01,
            );
            let b = BoundingSphere::new(
                Vec3::new(next(), next(), next()),
                next().abs() * 0.5 + 0.01,
            );
            let merged = a.merge(&b);

            // Allow a whisker of float slop over exact containment.
            for sphere in [&a, &b] {
                let reach = merged.center.distance(sphere.center) + sphere.radius;
                assert!(
                    reach <= merged.radius + 1e-4,
                    "merge of {a:?} and {b:?} lost {sphere:?}"
                );
            }
        }
    }
}
