//! Scene composition: fixed per-preset layouts plus an elastic surface fill.
//!
//! Objects are placed in layout order, each labeled with its own id. The
//! preset's surface filler then receives `requested - placed` points, clamped
//! at zero. Object points are never truncated, so a budget smaller than the
//! fixed footprint yields a scene larger than requested.

use std::f32::consts::{FRAC_PI_2, PI};

use log::{debug, info};
use rand::Rng;

use crate::preset::PresetKind;
use crate::sampler::{self, Surface};
use crate::transform::RigidTransform;
use crate::types::{
    BoundingBox, FurnitureKind, InfrastructureKind, ObjectKind, Point, Scene, SceneBounds,
    SceneMetadata, SceneObject, VehicleClass,
};

struct Slot<T> {
    id: &'static str,
    position: [f32; 3],
    yaw: f32,
    class: T,
}

const fn slot<T>(id: &'static str, position: [f32; 3], yaw: f32, class: T) -> Slot<T> {
    Slot {
        id,
        position,
        yaw,
        class,
    }
}

const TRAFFIC_LIGHTS: [Slot<()>; 4] = [
    slot("traffic_light_north", [8.0, -3.0, 4.0], 0.0, ()),
    slot("traffic_light_south", [-8.0, 3.0, 4.0], PI, ()),
    slot("traffic_light_east", [3.0, 8.0, 4.0], -FRAC_PI_2, ()),
    slot("traffic_light_west", [-3.0, -8.0, 4.0], FRAC_PI_2, ()),
];

const INTERSECTION_VEHICLES: [Slot<VehicleClass>; 6] = [
    slot("car_north_1", [5.0, -8.0, 0.8], 0.0, VehicleClass::Sedan),
    slot("car_north_2", [2.0, -8.0, 0.8], 0.0, VehicleClass::Suv),
    slot("car_south_1", [-5.0, 8.0, 0.8], PI, VehicleClass::Truck),
    slot("car_south_2", [-2.0, 8.0, 0.8], PI, VehicleClass::Sedan),
    slot("car_east_1", [8.0, 5.0, 0.8], -FRAC_PI_2, VehicleClass::Sedan),
    slot("car_west_1", [8.0, -5.0, 0.8], FRAC_PI_2, VehicleClass::Suv),
];

const BUILDINGS: [Slot<[f32; 3]>; 3] = [
    slot("building_east", [15.0, 0.0, 6.0], 0.0, [8.0, 20.0, 12.0]),
    slot("building_west", [-15.0, 0.0, 6.0], 0.0, [8.0, 20.0, 12.0]),
    slot("building_north", [0.0, 25.0, 4.0], 0.0, [30.0, 6.0, 8.0]),
];

const STREET_FURNITURE: [Slot<FurnitureKind>; 8] = [
    slot("lamp_1", [6.0, -5.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("lamp_2", [6.0, 0.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("lamp_3", [6.0, 5.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("lamp_4", [-6.0, -5.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("lamp_5", [-6.0, 0.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("lamp_6", [-6.0, 5.0, 1.0], 0.0, FurnitureKind::LampPost),
    slot("bench_1", [8.0, -8.0, 0.4], 0.0, FurnitureKind::Bench),
    slot("bench_2", [-8.0, 8.0, 0.4], 0.0, FurnitureKind::Bench),
];

const STREET_PARKED_CARS: [Slot<VehicleClass>; 3] = [
    slot("parked_car_1", [10.0, -10.0, 0.8], 0.0, VehicleClass::Sedan),
    slot("parked_car_2", [10.0, -5.0, 0.8], 0.0, VehicleClass::Sedan),
    slot("parked_car_3", [-10.0, 10.0, 0.8], PI, VehicleClass::Sedan),
];

const LIGHT_POLES: [Slot<InfrastructureKind>; 5] = [
    slot("pole_1", [0.0, -20.0, 3.0], 0.0, InfrastructureKind::LightPole),
    slot("pole_2", [10.0, -10.0, 3.0], 0.0, InfrastructureKind::LightPole),
    slot("pole_3", [-10.0, -10.0, 3.0], 0.0, InfrastructureKind::LightPole),
    slot("pole_4", [10.0, 10.0, 3.0], 0.0, InfrastructureKind::LightPole),
    slot("pole_5", [-10.0, 10.0, 3.0], 0.0, InfrastructureKind::LightPole),
];

pub const PARKING_ROWS: usize = 4;
pub const PARKING_SPACES_PER_ROW: usize = 6;
pub const PARKING_OCCUPANCY: f64 = 0.75;

/// Running point/label/object accumulators for one scene.
struct SceneBuilder {
    points: Vec<Point>,
    labels: Vec<String>,
    objects: Vec<SceneObject>,
}

impl SceneBuilder {
    fn with_capacity(num_points: usize) -> Self {
        Self {
            points: Vec::with_capacity(num_points),
            labels: Vec::with_capacity(num_points),
            objects: Vec::new(),
        }
    }

    /// Transform `local` into the world, label it with the object's id and
    /// record the object.
    fn place(&mut self, mut object: SceneObject, transform: &RigidTransform, local: &[Point]) {
        debug_assert!(
            self.objects.iter().all(|o| o.id != object.id),
            "duplicate object id {}",
            object.id
        );

        let world = transform.apply(local);
        object.num_points = world.len();

        debug!(
            "placed {} ({:?}) at ({:.2}, {:.2}, {:.2}) yaw={:.3}: {} pts",
            object.id,
            object.kind,
            object.position[0],
            object.position[1],
            object.position[2],
            object.rotation,
            world.len()
        );

        self.labels
            .extend(std::iter::repeat(object.id.clone()).take(world.len()));
        self.points.extend(world);
        self.objects.push(object);
    }

    /// Fill the rest of the budget with surface points. A footprint already
    /// at or over budget adds nothing.
    fn fill<R: Rng + ?Sized>(&mut self, surface: Surface, requested: usize, rng: &mut R) {
        let remaining = requested.saturating_sub(self.points.len());
        if remaining == 0 && requested < self.points.len() {
            debug!(
                "fixed layout ({} pts) exceeds requested budget ({}); no surface fill",
                self.points.len(),
                requested
            );
        }

        let pts = surface.sample(remaining, rng);
        self.labels
            .extend(std::iter::repeat(surface.label().to_owned()).take(pts.len()));
        self.points.extend(pts);
    }

    fn finish(self, scene_type: &str) -> Scene {
        debug_assert_eq!(self.points.len(), self.labels.len());

        let metadata = SceneMetadata {
            total_points: self.points.len(),
            num_objects: self.objects.len(),
            scene_bounds: SceneBounds::from_points(&self.points),
        };

        Scene {
            scene_type: scene_type.to_owned(),
            points: self.points,
            labels: self.labels,
            scene_objects: self.objects,
            metadata,
        }
    }
}

fn object(
    kind: ObjectKind,
    id: &str,
    position: [f32; 3],
    rotation: f32,
    size: [f32; 3],
    bounding_box: BoundingBox,
) -> SceneObject {
    SceneObject {
        kind,
        id: id.to_owned(),
        vehicle_type: None,
        furniture_type: None,
        infrastructure_type: None,
        parked: false,
        position,
        rotation,
        size,
        bounding_box,
        num_points: 0,
    }
}

fn place_traffic_light<R: Rng + ?Sized>(
    b: &mut SceneBuilder,
    id: &str,
    position: [f32; 3],
    yaw: f32,
    rng: &mut R,
) {
    let [x, y, height] = position;
    let t = RigidTransform::new(yaw, [x, y, 0.0]);
    let size = sampler::TRAFFIC_LIGHT_HOUSING;
    let bbox = t.bounding_box([0.0, 0.0, height], size);

    let local = sampler::traffic_light(height, sampler::TRAFFIC_LIGHT_POINTS, rng);
    b.place(
        object(ObjectKind::TrafficLight, id, position, yaw, size, bbox),
        &t,
        &local,
    );
}

fn place_vehicle<R: Rng + ?Sized>(
    b: &mut SceneBuilder,
    id: &str,
    position: [f32; 3],
    yaw: f32,
    class: VehicleClass,
    parked: bool,
    rng: &mut R,
) {
    let size = class.dimensions();
    let t = RigidTransform::new(yaw, position);
    let bbox = t.bounding_box([0.0, 0.0, size[2] / 2.0], size);

    let local = sampler::vehicle(class, class.point_density(), rng);
    let obj = SceneObject {
        vehicle_type: Some(class),
        parked,
        ..object(ObjectKind::Vehicle, id, position, yaw, size, bbox)
    };
    b.place(obj, &t, &local);
}

fn place_building<R: Rng + ?Sized>(
    b: &mut SceneBuilder,
    id: &str,
    position: [f32; 3],
    size: [f32; 3],
    rng: &mut R,
) {
    let [x, y, z] = position;
    let t = RigidTransform::new(0.0, [x, y, 0.0]);
    let bbox = t.bounding_box([0.0, 0.0, z], size);

    let local = sampler::building(size, sampler::building_density(size), rng);
    b.place(
        object(ObjectKind::Building, id, position, 0.0, size, bbox),
        &t,
        &local,
    );
}

fn place_furniture<R: Rng + ?Sized>(
    b: &mut SceneBuilder,
    id: &str,
    position: [f32; 3],
    kind: FurnitureKind,
    rng: &mut R,
) {
    let [x, y, _] = position;
    let (t, size, local_center, local) = match kind {
        FurnitureKind::LampPost => {
            let h = sampler::LAMP_POST_HEIGHT;
            (
                RigidTransform::new(0.0, [x, y, 0.0]),
                [0.4, 0.4, h],
                [0.0, 0.0, h / 2.0],
                sampler::lamp_post(sampler::LAMP_POST_POINTS, rng),
            )
        }
        FurnitureKind::Bench => {
            let size = sampler::BENCH_SIZE;
            (
                RigidTransform::new(0.0, position),
                size,
                [0.0, 0.0, size[2] / 2.0],
                sampler::bench(sampler::BENCH_POINTS, rng),
            )
        }
    };

    let bbox = t.bounding_box(local_center, size);
    let obj = SceneObject {
        furniture_type: Some(kind),
        ..object(ObjectKind::StreetFurniture, id, position, 0.0, size, bbox)
    };
    b.place(obj, &t, &local);
}

fn place_light_pole<R: Rng + ?Sized>(
    b: &mut SceneBuilder,
    id: &str,
    position: [f32; 3],
    rng: &mut R,
) {
    let [x, y, height] = position;
    let t = RigidTransform::new(0.0, [x, y, 0.0]);
    let size = [1.0, 1.0, height];
    let bbox = t.bounding_box([0.0, 0.0, height / 2.0], size);

    let local = sampler::light_pole(height, sampler::LIGHT_POLE_POINTS, rng);
    let obj = SceneObject {
        infrastructure_type: Some(InfrastructureKind::LightPole),
        ..object(ObjectKind::Infrastructure, id, position, 0.0, size, bbox)
    };
    b.place(obj, &t, &local);
}

fn traffic_intersection<R: Rng + ?Sized>(num_points: usize, rng: &mut R) -> SceneBuilder {
    let mut b = SceneBuilder::with_capacity(num_points);

    for s in &TRAFFIC_LIGHTS {
        place_traffic_light(&mut b, s.id, s.position, s.yaw, rng);
    }

    for s in &INTERSECTION_VEHICLES {
        place_vehicle(&mut b, s.id, s.position, s.yaw, s.class, false, rng);
    }

    b.fill(Surface::RoadWithMarkings, num_points, rng);
    b
}

fn urban_street<R: Rng + ?Sized>(num_points: usize, rng: &mut R) -> SceneBuilder {
    let mut b = SceneBuilder::with_capacity(num_points);

    for s in &BUILDINGS {
        place_building(&mut b, s.id, s.position, s.class, rng);
    }

    for s in &STREET_FURNITURE {
        place_furniture(&mut b, s.id, s.position, s.class, rng);
    }

    for s in &STREET_PARKED_CARS {
        place_vehicle(&mut b, s.id, s.position, s.yaw, s.class, true, rng);
    }

    b.fill(Surface::UrbanRoad, num_points, rng);
    b
}

fn parking_lot<R: Rng + ?Sized>(num_points: usize, rng: &mut R) -> SceneBuilder {
    let mut b = SceneBuilder::with_capacity(num_points);

    // Each space is occupied independently; this is the only random
    // placement in any preset.
    for row in 0..PARKING_ROWS {
        for space in 0..PARKING_SPACES_PER_ROW {
            if !rng.gen_bool(PARKING_OCCUPANCY) {
                continue;
            }

            let x = (space as f32 - PARKING_SPACES_PER_ROW as f32 / 2.0) * 3.0;
            let y = (row as f32 - PARKING_ROWS as f32 / 2.0) * 8.0;
            let class = VehicleClass::ALL[rng.gen_range(0..VehicleClass::ALL.len())];
            let id = format!("parked_car_r{row}_s{space}");

            place_vehicle(&mut b, &id, [x, y, 0.8], 0.0, class, true, rng);
        }
    }

    for s in &LIGHT_POLES {
        place_light_pole(&mut b, s.id, s.position, rng);
    }

    b.fill(Surface::ParkingLot, num_points, rng);
    b
}

fn random_scene<R: Rng + ?Sized>(num_points: usize, rng: &mut R) -> SceneBuilder {
    let mut b = SceneBuilder::with_capacity(num_points);
    b.fill(Surface::GenericGround, num_points, rng);
    b
}

/// Compose one scene for `preset` with a budget of `num_points`.
pub fn generate<R: Rng + ?Sized>(preset: PresetKind, num_points: usize, rng: &mut R) -> Scene {
    let builder = match preset {
        PresetKind::TrafficScene => traffic_intersection(num_points, rng),
        PresetKind::UrbanStreet => urban_street(num_points, rng),
        PresetKind::ParkingLot => parking_lot(num_points, rng),
        PresetKind::Fallback => random_scene(num_points, rng),
    };

    let scene = builder.finish(preset.scene_type());
    info!(
        "generated {} scene: {} pts, {} objects (requested {})",
        preset,
        scene.metadata.total_points,
        scene.metadata.num_objects,
        num_points
    );

    scene
}

/// Like [`generate`], resolving the preset by name. Unknown names produce
/// the fallback scene instead of an error.
pub fn generate_named<R: Rng + ?Sized>(name: &str, num_points: usize, rng: &mut R) -> Scene {
    let preset = PresetKind::parse(name);
    if preset == PresetKind::Fallback {
        info!("unknown preset {name:?}; using fallback scene");
    }
    generate(preset, num_points, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn footprint(scene: &Scene) -> usize {
        scene.scene_objects.iter().map(|o| o.num_points).sum()
    }

    #[test]
    fn traffic_scene_layout() {
        let scene = generate(PresetKind::TrafficScene, 12_000, &mut rng(1));

        let lights = scene
            .scene_objects
            .iter()
            .filter(|o| o.kind == ObjectKind::TrafficLight)
            .count();
        let vehicles = scene
            .scene_objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Vehicle)
            .count();
        assert_eq!((lights, vehicles), (4, 6));

        let ids: HashSet<_> = scene.scene_objects.iter().map(|o| &o.id).collect();
        assert_eq!(ids.len(), scene.scene_objects.len());

        assert_eq!(scene.scene_type, "traffic_intersection");
        assert_eq!(footprint(&scene), 4 * 180 + 250 + 300 + 400 + 250 + 250 + 300);
        assert_eq!(scene.len(), 12_000);
        assert_eq!(
            scene.points_labeled("road_surface").count(),
            12_000 - footprint(&scene)
        );
    }

    #[test]
    fn labels_follow_object_ids_in_order() {
        let scene = generate(PresetKind::UrbanStreet, 20_000, &mut rng(2));
        assert_eq!(scene.points.len(), scene.labels.len());

        let mut offset = 0;
        for obj in &scene.scene_objects {
            let run = &scene.labels[offset..offset + obj.num_points];
            assert!(run.iter().all(|l| *l == obj.id), "labels of {}", obj.id);
            offset += obj.num_points;
        }
        assert!(scene.labels[offset..].iter().all(|l| l == "road_surface"));
    }

    #[test]
    fn budget_below_footprint_keeps_all_object_points() {
        for preset in PresetKind::NAMED {
            let scene = generate(preset, 0, &mut rng(3));
            assert_eq!(scene.len(), footprint(&scene));
            assert_eq!(scene.metadata.total_points, scene.len());
            assert!(scene
                .labels
                .iter()
                .all(|l| l != "road_surface" && l != "parking_surface"));
        }
    }

    #[test]
    fn budget_above_footprint_is_met_exactly() {
        for preset in PresetKind::NAMED {
            let scene = generate(preset, 25_000, &mut rng(4));
            assert_eq!(scene.len(), 25_000);
            assert_eq!(scene.metadata.total_points, 25_000);
            assert_eq!(scene.metadata.num_objects, scene.scene_objects.len());
        }
    }

    #[test]
    fn bounds_contain_every_point() {
        for preset in PresetKind::NAMED {
            let scene = generate(preset, 8_000, &mut rng(5));
            let b = scene.metadata.scene_bounds;
            assert!(b.x_min <= b.x_max && b.y_min <= b.y_max && b.z_min <= b.z_max);
            assert!(scene.points.iter().all(|p| b.contains(p)));
        }
    }

    #[test]
    fn boxes_are_seed_independent_but_points_are_not() {
        let a = generate(PresetKind::UrbanStreet, 5_000, &mut rng(10));
        let b = generate(PresetKind::UrbanStreet, 5_000, &mut rng(11));

        for (oa, ob) in a.scene_objects.iter().zip(b.scene_objects.iter()) {
            assert_eq!(oa.id, ob.id);
            assert_eq!(oa.bounding_box, ob.bounding_box);
        }
        assert_ne!(a.points, b.points);
    }

    #[test]
    fn vehicle_boxes_sit_on_their_position() {
        let scene = generate(PresetKind::TrafficScene, 0, &mut rng(6));
        let car = scene.object("car_south_1").unwrap();

        assert_eq!(car.vehicle_type, Some(VehicleClass::Truck));
        assert_eq!(car.size, [6.5, 2.4, 2.5]);
        assert!((car.bounding_box.center[0] + 5.0).abs() < 1e-5);
        assert!((car.bounding_box.center[1] - 8.0).abs() < 1e-5);
        assert!((car.bounding_box.center[2] - 2.05).abs() < 1e-5);
        assert_eq!(car.bounding_box.rotation, PI);
    }

    #[test]
    fn parking_lot_spaces_are_unique_and_on_the_grid() {
        let scene = generate(PresetKind::ParkingLot, 18_000, &mut rng(7));
        let cars: Vec<_> = scene
            .scene_objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Vehicle)
            .collect();

        assert!(cars.len() <= PARKING_ROWS * PARKING_SPACES_PER_ROW);
        assert!(cars.iter().all(|c| c.parked && c.vehicle_type.is_some()));
        for c in &cars {
            assert!(c.id.starts_with("parked_car_r"));
            assert_eq!(c.position[0] % 3.0, 0.0);
            assert_eq!(c.position[1] % 8.0, 0.0);
        }

        let poles = scene
            .scene_objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Infrastructure)
            .count();
        assert_eq!(poles, 5);

        let ids: HashSet<_> = scene.scene_objects.iter().map(|o| &o.id).collect();
        assert_eq!(ids.len(), scene.scene_objects.len());
        assert!(scene.labels.iter().any(|l| l == "parking_surface"));
    }

    #[test]
    fn unknown_preset_falls_back_to_requested_count() {
        let scene = generate_named("moon_base", 3_000, &mut rng(8));
        assert_eq!(scene.len(), 3_000);
        assert!(scene.scene_objects.is_empty());
        assert_eq!(scene.scene_type, "random_scene");
        assert!(scene.labels.iter().all(|l| l == "ground"));
    }

    #[test]
    fn empty_fallback_scene_has_zero_bounds() {
        let scene = generate(PresetKind::Fallback, 0, &mut rng(9));
        assert!(scene.is_empty());
        assert_eq!(scene.metadata.scene_bounds, SceneBounds::default());
    }
}
