use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Quat, Vec3};

use crate::marker::MarkerSpec;

/// Modality-agnostic pick ray: the desktop pointer unproject and the VR
/// controller pose both reduce to this.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickConfig {
    /// Hit-test radius of a marker (markers are billboarded discs; a sphere
    /// of this radius is the intersection proxy).
    pub marker_radius: f64,
    pub max_distance: f64,
    /// Laser segment length to show when a controller ray hits nothing.
    pub laser_default_len: f64,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            marker_radius: 0.35,
            max_distance: 1.0e4,
            laser_default_len: 10.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    /// Index into the marker list that was tested.
    pub marker: usize,
    pub distance: f64,
    pub point: Vec3,
}

/// Deterministic ray picking over the current scene's markers.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - Equal distances tie-break on the lower marker index.
///
/// The panorama sphere is never part of `markers`, so it can't swallow hits.
pub fn pick(ray: Ray, markers: &[MarkerSpec], cfg: PickConfig) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;
    let ray = Ray::new(ray.origin, dir);

    let mut best: Option<PickHit> = None;
    for (index, marker) in markers.iter().enumerate() {
        let Some(t) = ray_sphere_hit_t(&ray, marker.position, cfg.marker_radius) else {
            continue;
        };
        if t > cfg.max_distance {
            continue;
        }

        let replace = match &best {
            None => true,
            Some(b) => stable_total_cmp_f64(t, b.distance).is_lt(),
        };
        if replace {
            best = Some(PickHit {
                marker: index,
                distance: t,
                point: ray.at(t),
            });
        }
    }
    best
}

/// Wrapper for pointer picking: the host supplies the deterministic
/// screen-to-ray mapping (camera unproject).
pub fn pick_pointer<F>(
    x_ndc: f64,
    y_ndc: f64,
    markers: &[MarkerSpec],
    cfg: PickConfig,
    mut make_ray: F,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_ndc, y_ndc)?;
    pick(ray, markers, cfg)
}

/// Ray for a tracked controller: from its grip position along local -Z.
pub fn controller_ray(position: Vec3, orientation: Quat) -> Ray {
    Ray::new(position, orientation.rotate(Vec3::new(0.0, 0.0, -1.0)))
}

/// Visible laser length for a controller: clipped to the hit, or the fixed
/// default when pointing at nothing.
pub fn laser_length(hit: Option<&PickHit>, cfg: PickConfig) -> f64 {
    hit.map(|h| h.distance).unwrap_or(cfg.laser_default_len)
}

fn ray_sphere_hit_t(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    // Near intersection first; fall back to the far one when the ray starts
    // inside the sphere. Behind-the-origin hits don't count.
    let t_near = -b - sqrt_disc;
    if t_near >= 0.0 {
        return Some(t_near);
    }
    let t_far = -b + sqrt_disc;
    if t_far >= 0.0 {
        return Some(t_far);
    }
    None
}
