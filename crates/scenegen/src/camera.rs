//! Static front-camera model shared by every preset.
//!
//! ISO 8855 vehicle frame: x forward, y left, z up. Rotation is
//! roll/pitch/yaw in radians; fields of view are in degrees.

use serde::{Deserialize, Serialize};

pub const CAMERA_MODEL: &str = "pinhole_with_distortion";
pub const COORDINATE_SYSTEM: &str = "ISO_8855";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub p1: f64,
    pub p2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrinsics {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub horizontal_fov: f64,
    pub vertical_fov: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub intrinsics: Intrinsics,
    pub extrinsics: Extrinsics,
    pub preset: String,
    pub camera_model: String,
    pub coordinate_system: String,
}

pub const FRONT_INTRINSICS: Intrinsics = Intrinsics {
    width: 3840,
    height: 1920,
    fx: 1920.0,
    fy: 1920.0,
    cx: 1920.0,
    cy: 960.0,
    k1: -0.1,
    k2: 0.02,
    k3: -0.001,
    p1: 0.0001,
    p2: 0.0002,
};

pub const FRONT_EXTRINSICS: Extrinsics = Extrinsics {
    position: [2.0, 0.0, 2.0],
    rotation: [0.0, 0.0, 0.0],
    horizontal_fov: 115.0,
    vertical_fov: 57.5,
};

impl CameraParameters {
    /// The parameters do not depend on the preset; the id is only echoed.
    pub fn for_preset(preset: &str) -> Self {
        Self {
            intrinsics: FRONT_INTRINSICS,
            extrinsics: FRONT_EXTRINSICS,
            preset: preset.to_owned(),
            camera_model: CAMERA_MODEL.to_owned(),
            coordinate_system: COORDINATE_SYSTEM.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_point_is_the_image_center() {
        let c = CameraParameters::for_preset("parking_lot");
        assert_eq!(c.intrinsics.cx * 2.0, f64::from(c.intrinsics.width));
        assert_eq!(c.intrinsics.cy * 2.0, f64::from(c.intrinsics.height));
        assert_eq!(c.preset, "parking_lot");
    }

    #[test]
    fn serialized_layout() {
        let v = serde_json::to_value(CameraParameters::for_preset("x")).unwrap();
        assert_eq!(v["intrinsics"]["width"], 3840);
        assert_eq!(v["intrinsics"]["k1"], -0.1);
        assert_eq!(v["extrinsics"]["position"], serde_json::json!([2.0, 0.0, 2.0]));
        assert_eq!(v["extrinsics"]["vertical_fov"], 57.5);
        assert_eq!(v["camera_model"], "pinhole_with_distortion");
        assert_eq!(v["coordinate_system"], "ISO_8855");
    }
}
