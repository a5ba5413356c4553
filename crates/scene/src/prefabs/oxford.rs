use foundation::math::Vec3;

use crate::location::{Category, Location, Status};

/// Data age given to the seeded stale location.
pub const SEED_STALE_AGE_DAYS: u32 = 400;

/// The default map: five Oxford points of interest laid out on the floor plane.
///
/// Only "The Grand Cafe" starts stale.
pub fn oxford_beacons() -> Vec<Location> {
    vec![
        Location::new(
            1,
            "The Grand Cafe",
            Vec3::new(-4.0, 0.0, -2.0),
            Status::Stale,
            Category::Cafe,
        )
        .with_days_since_verified(SEED_STALE_AGE_DAYS),
        Location::new(
            2,
            "Blackwell's Bookshop",
            Vec3::new(3.0, 0.0, -3.0),
            Status::Fresh,
            Category::Shop,
        )
        .with_days_since_verified(12),
        Location::new(
            3,
            "Radcliffe Camera",
            Vec3::new(0.0, 0.0, 4.0),
            Status::Fresh,
            Category::Landmark,
        )
        .with_days_since_verified(3),
        Location::new(
            4,
            "Covered Market",
            Vec3::new(-3.0, 0.0, 3.0),
            Status::Fresh,
            Category::Market,
        )
        .with_days_since_verified(30),
        Location::new(
            5,
            "Ashmolean Museum",
            Vec3::new(5.0, 0.0, 2.0),
            Status::Fresh,
            Category::Museum,
        )
        .with_days_since_verified(7),
    ]
}
