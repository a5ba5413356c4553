use foundation::ids::LocationId;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::registry::LocationRegistry;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BeaconHit {
    pub location: LocationId,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Radius of the clickable sphere around each beacon.
    pub beacon_radius: f64,
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            beacon_radius: 0.75,
            max_distance: 1.0e6,
        }
    }
}

/// Deterministic ray picking against beacon spheres.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - Hits at the same distance go to the lower location id.
///
/// A ray starting inside a beacon hits it at distance 0.
pub fn pick_beacon(registry: &LocationRegistry, ray: Ray, opts: PickOptions) -> Option<BeaconHit> {
    let dir = ray.dir.normalized()?;
    let mut best: Option<(f64, LocationId)> = None;

    for location in registry.all() {
        let Some(t) = ray_sphere_hit_t(ray.origin, dir, location.position, opts.beacon_radius)
        else {
            continue;
        };
        if t > opts.max_distance {
            continue;
        }
        best = match best {
            None => Some((t, location.id)),
            Some((bt, bid)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| location.id.cmp(&bid));
                if ord.is_lt() {
                    Some((t, location.id))
                } else {
                    Some((bt, bid))
                }
            }
        };
    }

    let (t, location) = best?;
    Some(BeaconHit {
        location,
        distance: t,
        point: ray.origin + dir.scale(t),
    })
}

// `dir` must be unit length.
fn ray_sphere_hit_t(origin: Vec3, dir: Vec3, center: Vec3, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_beacon};
    use crate::location::{Category, Location, Status};
    use crate::registry::LocationRegistry;
    use foundation::ids::LocationId;
    use foundation::math::Vec3;

    fn line_of_beacons() -> LocationRegistry {
        LocationRegistry::from_locations(vec![
            Location::new(2, "far", Vec3::new(10.0, 0.0, 0.0), Status::Fresh, Category::Shop),
            Location::new(1, "near", Vec3::new(5.0, 0.0, 0.0), Status::Stale, Category::Cafe),
        ])
        .expect("registry")
    }

    #[test]
    fn ray_picks_nearest_beacon() {
        let reg = line_of_beacons();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let hit = pick_beacon(&reg, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.location, LocationId(1));
        assert!((hit.distance - 4.25).abs() < 1e-9);
        assert!((hit.point.x - 4.25).abs() < 1e-9);
    }

    #[test]
    fn tie_breaks_by_location_id() {
        let reg = LocationRegistry::from_locations(vec![
            Location::new(9, "b", Vec3::new(5.0, 0.0, 0.0), Status::Fresh, Category::Shop),
            Location::new(4, "a", Vec3::new(5.0, 0.0, 0.0), Status::Fresh, Category::Cafe),
        ])
        .expect("registry");
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_beacon(&reg, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.location, LocationId(4));
    }

    #[test]
    fn misses_and_degenerate_rays_return_none() {
        let reg = line_of_beacons();
        let away = Ray::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0));
        assert!(pick_beacon(&reg, away, PickOptions::default()).is_none());

        let zero = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(pick_beacon(&reg, zero, PickOptions::default()).is_none());

        let short = PickOptions {
            max_distance: 2.0,
            ..PickOptions::default()
        };
        let toward = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(pick_beacon(&reg, toward, short).is_none());
    }
}
