use nalgebra::Vector3;
use rand::Rng;
use std::f32::consts::PI;

pub type Vec3 = Vector3<f32>;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_center_radius(self.center, self.radius)
    }

    pub fn volume(&self) -> f32 {
        sphere_volume(self.radius)
    }

    pub fn distance_sq_to(&self, point: &Vec3) -> f32 {
        (self.center - point).norm_squared()
    }

    pub fn update(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Places a sphere of `radius` uniformly inside a ball of `container_radius` around the origin.
    pub fn random_inside<R: Rng>(container_radius: f32, radius: f32, rng: &mut R) -> Self {
        Self::new(random_in_unit_ball(rng) * container_radius, radius)
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: 0.0,
        }
    }
}

#[inline(always)]
pub fn sphere_volume(radius: f32) -> f32 {
    4.0 / 3.0 * PI * radius * radius * radius
}

pub fn random_in_unit_ball<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.norm_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// Unit vector with uniformly distributed direction.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = random_in_unit_ball(rng);
        let norm = candidate.norm();
        if norm > 1e-3 {
            return candidate / norm;
        }
    }
}

/// Axis-aligned box stored as min/max corners. `Aabb3::EMPTY` is the identity for `union`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub const EMPTY: Aabb3 = Aabb3 {
        min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_radius(center: Vec3, radius: f32) -> Self {
        let r = Vec3::repeat(radius);
        Self {
            min: center - r,
            max: center + r,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }

    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn expand_to_include(&mut self, other: &Aabb3) {
        *self = self.union(other);
    }

    /// Inclusive on every axis: boxes that only touch still overlap.
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        other.min.x <= self.max.x
            && other.max.x >= self.min.x
            && other.min.y <= self.max.y
            && other.max.y >= self.min.y
            && other.min.z <= self.max.z
            && other.max.z >= self.min.z
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb3) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.min.z >= self.min.z
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
            && other.max.z <= self.max.z
    }

    /// True when `other` reaches or passes this box's boundary on any axis.
    pub fn touches_boundary(&self, other: &Aabb3) -> bool {
        other.min.x <= self.min.x
            || other.min.y <= self.min.y
            || other.min.z <= self.min.z
            || other.max.x >= self.max.x
            || other.max.y >= self.max.y
            || other.max.z >= self.max.z
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::EMPTY
    }
}
