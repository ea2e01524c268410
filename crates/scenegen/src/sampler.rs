//! Primitive samplers.
//!
//! Every sampler returns exactly the requested number of points in the
//! object's local frame: origin on the ground below the object's center,
//! `+z` up. Points are drawn independently. Bounded axes use uniform
//! distributions; thin rods (poles, arms) use a zero-mean normal
//! cross-section. Intensity bands encode a visual class:
//!
//! | surface            | intensity    |
//! |--------------------|--------------|
//! | asphalt / concrete | 0.15 .. 0.40 |
//! | building material  | 0.30 .. 0.70 |
//! | painted metal      | 0.40 .. 0.80 |
//! | glass, lamps, paint| 0.80 .. 1.00 |

use std::f32::consts::TAU;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::types::{Point, VehicleClass};

pub const TRAFFIC_LIGHT_POINTS: usize = 180;
pub const LAMP_POST_POINTS: usize = 45;
pub const BENCH_POINTS: usize = 40;
pub const LIGHT_POLE_POINTS: usize = 80;

pub const LAMP_POST_HEIGHT: f32 = 4.0;
pub const BENCH_SIZE: [f32; 3] = [1.6, 0.4, 0.4];

/// Traffic light housing extents (the part annotated by its bounding box).
pub const TRAFFIC_LIGHT_HOUSING: [f32; 3] = [0.3, 0.2, 0.4];

/// Split `total` into parts proportional to `weights`. The parts always sum
/// to `total`; rounding remainder goes to the last part.
pub fn split_budget<const N: usize>(total: usize, weights: [usize; N]) -> [usize; N] {
    let mut parts = [0usize; N];
    let sum: usize = weights.iter().sum();
    if N == 0 || sum == 0 {
        return parts;
    }

    let mut used = 0usize;
    for i in 0..N - 1 {
        parts[i] = total * weights[i] / sum;
        used += parts[i];
    }
    parts[N - 1] = total - used;

    parts
}

#[inline]
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    rng.gen_range(lo..=hi)
}

#[inline]
fn rod<R: Rng + ?Sized>(rng: &mut R, sigma: f32) -> f32 {
    let n: f32 = rng.sample(StandardNormal);
    n * sigma
}

/// `base` plus a uniform draw in `[0, spread]`, kept inside `[0, 1]`.
#[inline]
fn intensity<R: Rng + ?Sized>(rng: &mut R, base: f32, spread: f32) -> f32 {
    (base + rng.gen_range(0.0..=spread)).clamp(0.0, 1.0)
}

/// Traffic light on a pole of height `height`: vertical pole, housing box
/// at the top and a horizontal mounting arm along local `-x`, 1:1:1.
pub fn traffic_light<R: Rng + ?Sized>(height: f32, count: usize, rng: &mut R) -> Vec<Point> {
    let [pole, housing, arm] = split_budget(count, [1, 1, 1]);
    let mut out = Vec::with_capacity(count);

    for _ in 0..pole {
        out.push([
            rod(rng, 0.03),
            rod(rng, 0.03),
            uniform(rng, 0.0, height),
            intensity(rng, 0.6, 0.2),
        ]);
    }

    let [hx, hy, hz] = TRAFFIC_LIGHT_HOUSING;
    for _ in 0..housing {
        out.push([
            uniform(rng, -hx / 2.0, hx / 2.0),
            uniform(rng, -hy / 2.0, hy / 2.0),
            height + uniform(rng, -hz / 2.0, hz / 2.0),
            intensity(rng, 0.8, 0.2),
        ]);
    }

    for _ in 0..arm {
        out.push([
            uniform(rng, -0.8, 0.0),
            rod(rng, 0.03),
            height + uniform(rng, -0.05, 0.05),
            intensity(rng, 0.7, 0.2),
        ]);
    }

    out
}

/// Vehicle body box for `class`, `count` points.
///
/// Points in the upper half near either end are windshield/window glass
/// (`|x| > 0.3 * length && z > 0.5 * height`), everything else is body panel.
pub fn vehicle<R: Rng + ?Sized>(class: VehicleClass, count: usize, rng: &mut R) -> Vec<Point> {
    let [length, width, height] = class.dimensions();

    (0..count)
        .map(|_| {
            let x = uniform(rng, -length / 2.0, length / 2.0);
            let y = uniform(rng, -width / 2.0, width / 2.0);
            let z = uniform(rng, 0.0, height);

            let i = if x.abs() > length * 0.3 && z > height * 0.5 {
                intensity(rng, 0.9, 0.1)
            } else {
                intensity(rng, 0.4, 0.3)
            };

            [x, y, z, i]
        })
        .collect()
}

/// Point count for a building volume: one point per two cubic meters.
#[inline]
pub fn building_density(size: [f32; 3]) -> usize {
    (size[0] * size[1] * size[2] / 2.0).max(0.0) as usize
}

/// Solid building volume `size = [length, width, height]`.
pub fn building<R: Rng + ?Sized>(size: [f32; 3], count: usize, rng: &mut R) -> Vec<Point> {
    let [length, width, height] = size;

    (0..count)
        .map(|_| {
            [
                uniform(rng, -length / 2.0, length / 2.0),
                uniform(rng, -width / 2.0, width / 2.0),
                uniform(rng, 0.0, height),
                intensity(rng, 0.3, 0.4),
            ]
        })
        .collect()
}

/// Street lamp: thin pole plus lamp housing at the top, 2:1.
pub fn lamp_post<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Point> {
    let [pole, lamp] = split_budget(count, [2, 1]);
    let mut out = Vec::with_capacity(count);

    for _ in 0..pole {
        out.push([
            rod(rng, 0.02),
            rod(rng, 0.02),
            uniform(rng, 0.0, LAMP_POST_HEIGHT),
            intensity(rng, 0.5, 0.3),
        ]);
    }

    for _ in 0..lamp {
        out.push([
            uniform(rng, -0.2, 0.2),
            uniform(rng, -0.2, 0.2),
            LAMP_POST_HEIGHT + uniform(rng, -0.1, 0.1),
            intensity(rng, 0.8, 0.2),
        ]);
    }

    out
}

pub fn bench<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Point> {
    let [length, width, height] = BENCH_SIZE;

    (0..count)
        .map(|_| {
            [
                uniform(rng, -length / 2.0, length / 2.0),
                uniform(rng, -width / 2.0, width / 2.0),
                uniform(rng, 0.0, height),
                intensity(rng, 0.4, 0.3),
            ]
        })
        .collect()
}

/// Parking lot light pole of height `height` with three fixtures spaced
/// 120 degrees apart at 0.5 m from the pole. Pole to fixtures is 5:1:1:1.
pub fn light_pole<R: Rng + ?Sized>(height: f32, count: usize, rng: &mut R) -> Vec<Point> {
    let [pole, f0, f1, f2] = split_budget(count, [5, 1, 1, 1]);
    let mut out = Vec::with_capacity(count);

    for _ in 0..pole {
        out.push([
            rod(rng, 0.03),
            rod(rng, 0.03),
            uniform(rng, 0.0, height),
            intensity(rng, 0.5, 0.3),
        ]);
    }

    for (k, n) in [f0, f1, f2].into_iter().enumerate() {
        let (s, c) = (k as f32 * TAU / 3.0).sin_cos();
        let (fx, fy) = (0.5 * c, 0.5 * s);

        for _ in 0..n {
            out.push([
                fx + uniform(rng, -0.1, 0.1),
                fy + uniform(rng, -0.1, 0.1),
                height + uniform(rng, -0.2, 0.2),
                intensity(rng, 0.9, 0.1),
            ]);
        }
    }

    out
}

/// Ground fillers that absorb whatever is left of a scene's point budget.
/// Surface points are sampled directly in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// 40x40 m intersection with bright center lines on both axes.
    RoadWithMarkings,
    /// 50x50 m street; raised sidewalks beyond `|x| > 12`.
    UrbanRoad,
    /// 50x50 m lot with painted space dividers.
    ParkingLot,
    /// Plain 40x30 m ground used by the fallback scene.
    GenericGround,
}

/// Painted divider lines of the parking surface (x positions, meters).
const PARKING_LINES_X: [f32; 6] = [-7.5, -4.5, -1.5, 1.5, 4.5, 7.5];

impl Surface {
    /// Label attached to every point of this surface.
    pub fn label(self) -> &'static str {
        match self {
            Surface::RoadWithMarkings | Surface::UrbanRoad => "road_surface",
            Surface::ParkingLot => "parking_surface",
            Surface::GenericGround => "ground",
        }
    }

    pub fn sample<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> Vec<Point> {
        (0..count).map(|_| self.sample_one(rng)).collect()
    }

    fn sample_one<R: Rng + ?Sized>(self, rng: &mut R) -> Point {
        match self {
            Surface::RoadWithMarkings => {
                let x = uniform(rng, -20.0, 20.0);
                let y = uniform(rng, -20.0, 20.0);
                let z = uniform(rng, -0.05, 0.05);
                let i = if x.abs() < 0.1 || y.abs() < 0.1 {
                    intensity(rng, 0.8, 0.2)
                } else {
                    intensity(rng, 0.15, 0.15)
                };
                [x, y, z, i]
            }
            Surface::UrbanRoad => {
                let x = uniform(rng, -25.0, 25.0);
                let y = uniform(rng, -25.0, 25.0);
                if x.abs() > 12.0 {
                    [x, y, uniform(rng, 0.15, 0.25), intensity(rng, 0.4, 0.2)]
                } else {
                    [x, y, uniform(rng, -0.05, 0.05), intensity(rng, 0.15, 0.15)]
                }
            }
            Surface::ParkingLot => {
                let x = uniform(rng, -25.0, 25.0);
                let y = uniform(rng, -25.0, 25.0);
                let z = uniform(rng, -0.02, 0.02);
                let on_line = PARKING_LINES_X.iter().any(|lx| (x - lx).abs() < 0.05);
                let i = if on_line {
                    intensity(rng, 0.9, 0.1)
                } else {
                    intensity(rng, 0.2, 0.2)
                };
                [x, y, z, i]
            }
            Surface::GenericGround => [
                uniform(rng, -20.0, 20.0),
                uniform(rng, -15.0, 15.0),
                uniform(rng, -0.1, 0.1),
                intensity(rng, 0.2, 0.2),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn split_budget_is_exact() {
        assert_eq!(split_budget(180, [1, 1, 1]), [60, 60, 60]);
        assert_eq!(split_budget(200, [1, 1, 1]), [66, 66, 68]);
        assert_eq!(split_budget(45, [2, 1]), [30, 15]);
        assert_eq!(split_budget(80, [5, 1, 1, 1]), [50, 10, 10, 10]);
        assert_eq!(split_budget(0, [5, 1, 1, 1]), [0, 0, 0, 0]);
        assert_eq!(split_budget(7, [1, 1, 1]).iter().sum::<usize>(), 7);
    }

    #[test]
    fn samplers_emit_exact_counts_including_zero() {
        let mut r = rng();
        for n in [0usize, 1, 2, 3, 17, 180] {
            assert_eq!(traffic_light(4.0, n, &mut r).len(), n);
            assert_eq!(vehicle(VehicleClass::Truck, n, &mut r).len(), n);
            assert_eq!(building([8.0, 20.0, 12.0], n, &mut r).len(), n);
            assert_eq!(lamp_post(n, &mut r).len(), n);
            assert_eq!(bench(n, &mut r).len(), n);
            assert_eq!(light_pole(3.0, n, &mut r).len(), n);
            assert_eq!(Surface::ParkingLot.sample(n, &mut r).len(), n);
        }
    }

    #[test]
    fn intensities_stay_in_unit_interval() {
        let mut r = rng();
        let mut all = Vec::new();
        all.extend(traffic_light(4.0, 600, &mut r));
        all.extend(vehicle(VehicleClass::Sedan, 600, &mut r));
        all.extend(building([8.0, 20.0, 12.0], 600, &mut r));
        all.extend(lamp_post(600, &mut r));
        all.extend(bench(600, &mut r));
        all.extend(light_pole(3.0, 600, &mut r));
        for s in [
            Surface::RoadWithMarkings,
            Surface::UrbanRoad,
            Surface::ParkingLot,
            Surface::GenericGround,
        ] {
            all.extend(s.sample(2000, &mut r));
        }

        assert!(all.iter().all(|p| (0.0..=1.0).contains(&p[3])));
    }

    #[test]
    fn vehicle_points_stay_inside_body_and_glass_is_bright() {
        let mut r = rng();
        let [l, w, h] = VehicleClass::Suv.dimensions();
        let pts = vehicle(VehicleClass::Suv, 2000, &mut r);

        for p in &pts {
            assert!(p[0].abs() <= l / 2.0 && p[1].abs() <= w / 2.0);
            assert!((0.0..=h).contains(&p[2]));
            if p[0].abs() > l * 0.3 && p[2] > h * 0.5 {
                assert!(p[3] >= 0.9);
            } else {
                assert!((0.4..=0.7 + 1e-6).contains(&p[3]));
            }
        }
    }

    #[test]
    fn building_density_follows_volume() {
        assert_eq!(building_density([8.0, 20.0, 12.0]), 960);
        assert_eq!(building_density([30.0, 6.0, 8.0]), 720);
        assert_eq!(building_density([0.0, 6.0, 8.0]), 0);
    }

    #[test]
    fn urban_sidewalk_is_raised() {
        let mut r = rng();
        for p in Surface::UrbanRoad.sample(3000, &mut r) {
            if p[0].abs() > 12.0 {
                assert!(p[2] >= 0.15);
            } else {
                assert!(p[2] <= 0.05);
            }
        }
    }

    #[test]
    fn surface_labels() {
        assert_eq!(Surface::RoadWithMarkings.label(), "road_surface");
        assert_eq!(Surface::UrbanRoad.label(), "road_surface");
        assert_eq!(Surface::ParkingLot.label(), "parking_surface");
        assert_eq!(Surface::GenericGround.label(), "ground");
    }
}
