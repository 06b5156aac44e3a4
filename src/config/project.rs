//! Configuration file parser for the `project` tool

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, de};

use geometry::EulerAngles;

use crate::error::Result;
use crate::phantom::Phantom;
use crate::types::{EPS, Index3};
use crate::volume::VoxelVolume;

fn deserialize_positive<'d, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'d>,
{
    let x = f64::deserialize(deserializer)?;
    if x > 0.0 { Ok(x) }
    else       { Err(de::Error::custom(format!("expected a positive number, found {x}"))) }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub volume: VolumeConfig,

    #[serde(default)]
    pub phantom: Phantom,

    pub projection: ProjectionConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VolumeConfig {

    /// Number of voxels along x, y and z
    pub size: [usize; 3],

    /// Logical index of the first voxel. Centred on the origin if absent.
    #[serde(default)]
    pub origin: Option<Index3>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {

    /// Number of pixels along x and y
    pub size: [usize; 2],

    /// Explicit orientations, each `[rot, tilt, psi]` in degrees
    #[serde(default)]
    pub angles: Vec<[f64; 3]>,

    pub tilt_series: Option<TiltSeries>,
}

/// Orientations sharing `rot` and `psi`, with `tilt` stepping from
/// `tilt_min` up to and including `tilt_max`. All in degrees.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TiltSeries {
    #[serde(default)]
    pub rot: f64,
    #[serde(default)]
    pub psi: f64,
    pub tilt_min: f64,
    pub tilt_max: f64,
    #[serde(deserialize_with = "deserialize_positive")]
    pub tilt_step: f64,
}

impl TiltSeries {
    pub fn tilts(&self) -> impl Iterator<Item = f64> {
        let Self { tilt_min, tilt_max, tilt_step, .. } = *self;
        let n = if tilt_max < tilt_min { 0 }
                else { ((tilt_max - tilt_min) / tilt_step + EPS).floor() as usize + 1 };
        (0..n).map(move |i| tilt_min + i as f64 * tilt_step)
    }

    pub fn orientations(&self) -> impl Iterator<Item = EulerAngles> {
        let Self { rot, psi, .. } = *self;
        self.tilts().map(move |tilt| EulerAngles::from_degrees(rot, tilt, psi))
    }
}

impl VolumeConfig {
    /// Zeroed volume with the configured size and placement
    pub fn empty_volume(&self) -> VoxelVolume {
        match self.origin {
            Some(origin) => VoxelVolume::with_starting(self.size, origin),
            None         => VoxelVolume::zeros(self.size),
        }
    }
}

impl ProjectionConfig {
    pub fn xdim(&self) -> usize { self.size[0] }
    pub fn ydim(&self) -> usize { self.size[1] }

    /// The explicit orientations, followed by those of the tilt series
    pub fn orientations(&self) -> Vec<EulerAngles> {
        self.angles.iter()
            .map(|&[rot, tilt, psi]| EulerAngles::from_degrees(rot, tilt, psi))
            .chain(self.tilt_series.iter().flat_map(TiltSeries::orientations))
            .collect()
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config: String = fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use float_eq::assert_float_eq;

    // ----- Test an example on-disk config file -----------------------------------------
    #[test]
    fn test_config_file() {
        let config = read_config_file("project-config.toml".as_ref()).unwrap();
        assert_eq!(config.volume.size, [64, 64, 64]);
        assert_eq!(config.volume.origin, None);
        assert_eq!(config.phantom.sphere.len(), 3);
        assert_eq!(config.phantom.cuboid.len(), 1);
        assert_eq!(config.projection.size, [64, 64]);
        assert_eq!(config.projection.orientations().len(), 2 + 41);
    }

    // ----- Some helpers to make the tests more concise ---------------------------------
    //  ---  Parse string as TOML  -------------------------
    fn parse<'d, D: Deserialize<'d>>(input: &'d str) -> D {
        toml::from_str(input).unwrap()
    }
    //  ---  Parse string as TOML, with explicit error reporting -------------------------
    fn parse_carefully<'d, D: Deserialize<'d>>(input: &'d str) -> std::result::Result<D, toml::de::Error> {
        toml::from_str(input)
    }
    //  ---  Macro for concise assertions about vlues of parsed fields -------------------
    macro_rules! check {
        ($type:ident($text:expr).$field:ident = $expected:expr) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            assert_eq!(config.$field, $expected);
        };
        ($type:ident($text:expr) fields: $($field:ident = $expected:expr);+$(;)?) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            $(assert_eq!(config.$field, $expected);)*
        }
    }
    // ----- Test deserializing of individual aspects of the Config type ----------------
    #[test]
    fn config_volume() {
        check!{VolumeConfig("size = [10, 20, 30]") fields:
               size   = [10, 20, 30];
               origin = None
        }
        check!{VolumeConfig(r#"
                 size   = [4, 4, 4]
                 origin = [0, -1, 2]
               "#) fields:
               size   = [4, 4, 4];
               origin = Some([0, -1, 2])
        }
        let v = parse::<VolumeConfig>("size = [4, 5, 6]\norigin = [1, 1, 1]").empty_volume();
        assert_eq!((v.starting(), v.finishing()), ([1, 1, 1], [4, 5, 6]));
    }

    #[test]
    fn config_projection_angles() {
        check!{ProjectionConfig(r#"
                 size = [32, 16]
                 angles = [[0.0, 0.0, 0.0], [10.0, 20.0, 30.0]]
               "#) fields:
               size        = [32, 16];
               angles      = vec![[0.0, 0.0, 0.0], [10.0, 20.0, 30.0]];
               tilt_series = None
        }
        let p = parse::<ProjectionConfig>("size = [32, 16]");
        assert_eq!((p.xdim(), p.ydim()), (32, 16));
        assert!(p.orientations().is_empty());
    }

    #[test]
    fn config_tilt_series() {
        let p: ProjectionConfig = parse(r#"
            size = [8, 8]
            angles = [[1.0, 2.0, 3.0]]
            [tilt_series]
            rot = 90.0
            tilt_min = -60.0
            tilt_max = 60.0
            tilt_step = 3.0
        "#);
        let orientations = p.orientations();
        assert_eq!(orientations.len(), 1 + 41);
        assert_eq!(orientations[0], EulerAngles::from_degrees(1.0, 2.0, 3.0));
        let tilts: Vec<f64> = p.tilt_series.unwrap().tilts().collect();
        assert_float_eq!(tilts[0], -60.0, abs <= 1e-12);
        assert_float_eq!(tilts[20], 0.0, abs <= 1e-12);
        assert_float_eq!(*tilts.last().unwrap(), 60.0, abs <= 1e-12);
        assert_eq!(orientations[1], EulerAngles::from_degrees(90.0, -60.0, 0.0));
    }

    #[test]
    fn tilt_series_endpoints() {
        let series = |min, max, step| TiltSeries { rot: 0.0, psi: 0.0, tilt_min: min, tilt_max: max, tilt_step: step };
        assert_eq!(series(0.0, 0.0, 1.0).tilts().count(), 1);
        assert_eq!(series(0.0, 0.9, 1.0).tilts().count(), 1);
        assert_eq!(series(0.0, 0.3, 0.1).tilts().count(), 4);
        assert_eq!(series(1.0, 0.0, 1.0).tilts().count(), 0);
    }

    // ----- Make sure that invalid input is not accepted -------------------------------
    #[test]
    #[should_panic]
    fn config_reject_unknown_field() {
        parse::<VolumeConfig>("size = [1, 1, 1]\nunknown_field = 666");
    }

    #[test]
    fn config_reject_non_positive_step() {
        let text = "tilt_min = 0.0\ntilt_max = 10.0\ntilt_step = 0.0";
        assert!(parse_carefully::<TiltSeries>(text).is_err());
        let text = "tilt_min = 0.0\ntilt_max = 10.0\ntilt_step = 2.5";
        assert_eq!(parse_carefully::<TiltSeries>(text).unwrap().tilts().count(), 5);
    }
}
