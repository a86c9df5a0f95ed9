//! Augmentation parameter mapping and its randomisation.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Valid rotation range in degrees.
pub const ROTATE_RANGE: (f32, f32) = (-180.0, 180.0);
/// Valid brightness multiplier range.
pub const BRIGHTEN_RANGE: (f32, f32) = (0.5, 1.5);
/// Valid zoom factor range.
pub const ZOOM_RANGE: (f32, f32) = (0.5, 5.0);
/// Valid translation range in pixels, per axis.
pub const TRANSLATE_RANGE: (i32, i32) = (-10, 10);
/// Blur kernel chosen by [`AugmentationParams::randomize`].
pub const DEFAULT_BLUR: (u32, u32) = (2, 2);

/// Instrument channel a frame was recorded with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Extreme ultraviolet imager.
    #[default]
    Euv,
    /// Magnetogram.
    Mag,
}

impl Instrument {
    /// Transform names that may be applied to frames from this instrument.
    ///
    /// Magnetograms hold signed flux values, so they are never brightened.
    #[must_use]
    pub const fn transforms(self) -> &'static [&'static str] {
        match self {
            Self::Euv => &["rotate", "v_flip", "h_flip", "blur", "brighten", "zoom", "translate"],
            Self::Mag => &["rotate", "v_flip", "h_flip", "blur", "zoom", "translate"],
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euv => f.write_str("euv"),
            Self::Mag => f.write_str("mag"),
        }
    }
}

impl FromStr for Instrument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euv" => Ok(Self::Euv),
            "mag" => Ok(Self::Mag),
            other => Err(Error::InvalidParameter {
                name: "instrument".to_string(),
                reason: format!("unknown instrument '{other}' (expected euv or mag)"),
            }),
        }
    }
}

/// Mapping of transform name to parameter value.
///
/// Serialises to a JSON object holding only the transforms that are enabled,
/// e.g. `{"rotate": 12.5, "h_flip": true, "translate": [3, -2]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentationParams {
    /// Rotation about the block centre, degrees counter-clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f32>,

    /// Flip top to bottom.
    #[serde(default, skip_serializing_if = "is_false")]
    pub v_flip: bool,

    /// Flip left to right.
    #[serde(default, skip_serializing_if = "is_false")]
    pub h_flip: bool,

    /// Box blur kernel `(width, height)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<(u32, u32)>,

    /// Brightness multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brighten: Option<f32>,

    /// Zoom factor about the block centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f32>,

    /// Shift `(dx, dy)` in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<(i32, i32)>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl AugmentationParams {
    /// Draw a random set of transforms allowed for `instrument`.
    ///
    /// Each allowed transform is enabled with probability one half.
    pub fn randomize<R: Rng + ?Sized>(instrument: Instrument, rng: &mut R) -> Self {
        let allowed = instrument.transforms();
        let mut params = Self::default();

        if allowed.contains(&"rotate") && rng.random_bool(0.5) {
            params.rotate = Some(rng.random_range(ROTATE_RANGE.0..=ROTATE_RANGE.1));
        }
        if allowed.contains(&"v_flip") && rng.random_bool(0.5) {
            params.v_flip = true;
        }
        if allowed.contains(&"h_flip") && rng.random_bool(0.5) {
            params.h_flip = true;
        }
        if allowed.contains(&"blur") && rng.random_bool(0.5) {
            params.blur = Some(DEFAULT_BLUR);
        }
        if allowed.contains(&"brighten") && rng.random_bool(0.5) {
            params.brighten = Some(rng.random_range(BRIGHTEN_RANGE.0..=BRIGHTEN_RANGE.1));
        }
        if allowed.contains(&"zoom") && rng.random_bool(0.5) {
            params.zoom = Some(rng.random_range(ZOOM_RANGE.0..=ZOOM_RANGE.1));
        }
        if allowed.contains(&"translate") && rng.random_bool(0.5) {
            params.translate = Some((
                rng.random_range(TRANSLATE_RANGE.0..=TRANSLATE_RANGE.1),
                rng.random_range(TRANSLATE_RANGE.0..=TRANSLATE_RANGE.1),
            ));
        }

        params
    }

    /// Whether no transform is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the enabled transforms, in application order.
    #[must_use]
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.rotate.is_some() {
            names.push("rotate");
        }
        if self.zoom.is_some() {
            names.push("zoom");
        }
        if self.translate.is_some() {
            names.push("translate");
        }
        if self.v_flip {
            names.push("v_flip");
        }
        if self.h_flip {
            names.push("h_flip");
        }
        if self.brighten.is_some() {
            names.push("brighten");
        }
        if self.blur.is_some() {
            names.push("blur");
        }
        names
    }

    /// Validate parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of its valid range.
    pub fn validate(&self) -> Result<()> {
        check_range("rotate", self.rotate, ROTATE_RANGE)?;
        check_range("brighten", self.brighten, BRIGHTEN_RANGE)?;
        check_range("zoom", self.zoom, ZOOM_RANGE)?;

        if let Some((dx, dy)) = self.translate {
            let range = TRANSLATE_RANGE.0..=TRANSLATE_RANGE.1;
            if !range.contains(&dx) || !range.contains(&dy) {
                return Err(Error::InvalidParameter {
                    name: "translate".to_string(),
                    reason: format!(
                        "each offset must be between {} and {}",
                        TRANSLATE_RANGE.0, TRANSLATE_RANGE.1
                    ),
                });
            }
        }

        if let Some((kx, ky)) = self.blur {
            if kx == 0 || ky == 0 {
                return Err(Error::InvalidParameter {
                    name: "blur".to_string(),
                    reason: "kernel dimensions must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Load and validate a parameter mapping from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let params: Self =
            serde_json::from_str(&text).map_err(|source| Error::AugmentationParams {
                path: path.to_path_buf(),
                source,
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Save the parameter mapping as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).map_err(|source| Error::AugmentationParams {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn check_range(name: &str, value: Option<f32>, (min, max): (f32, f32)) -> Result<()> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(Error::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be between {min} and {max}"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_json_keys_are_transform_names() {
        let params = AugmentationParams {
            rotate: Some(12.5),
            h_flip: true,
            translate: Some((3, -2)),
            ..AugmentationParams::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, serde_json::json!({"rotate": 12.5, "h_flip": true, "translate": [3, -2]}));
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        assert!(serde_json::from_str::<AugmentationParams>(r#"{"shear": 2.0}"#).is_err());
    }

    #[test]
    fn test_randomize_is_reproducible_with_seed() {
        let a = AugmentationParams::randomize(Instrument::Euv, &mut StdRng::seed_from_u64(7));
        let b = AugmentationParams::randomize(Instrument::Euv, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_randomized_values_are_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let params = AugmentationParams::randomize(Instrument::Euv, &mut rng);
            params.validate().unwrap();
            if let Some(blur) = params.blur {
                assert_eq!(blur, DEFAULT_BLUR);
            }
        }
    }

    #[test]
    fn test_magnetogram_never_brightened() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(AugmentationParams::randomize(Instrument::Mag, &mut rng)
                .brighten
                .is_none());
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let params = AugmentationParams {
            zoom: Some(6.0),
            ..AugmentationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParameter { ref name, .. }) if name == "zoom"
        ));

        let params = AugmentationParams {
            blur: Some((0, 2)),
            ..AugmentationParams::default()
        };
        assert!(params.validate().is_err());

        let params = AugmentationParams {
            translate: Some((0, 11)),
            ..AugmentationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("augment.json");
        let params = AugmentationParams {
            brighten: Some(1.25),
            v_flip: true,
            blur: Some((2, 2)),
            ..AugmentationParams::default()
        };

        params.save(&path).unwrap();
        assert_eq!(AugmentationParams::load(&path).unwrap(), params);
    }

    #[test]
    fn test_malformed_file_is_a_params_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("augment.json");
        fs::write(&path, r#"{"rotate": "left"}"#).unwrap();

        let err = AugmentationParams::load(&path).unwrap_err();
        assert!(matches!(&err, Error::AugmentationParams { path: p, .. } if *p == path));
        assert!(err.to_string().starts_with("failed to process augmentation parameters"));
    }

    #[test]
    fn test_enabled_names() {
        let params = AugmentationParams {
            blur: Some((2, 2)),
            rotate: Some(5.0),
            ..AugmentationParams::default()
        };
        assert_eq!(params.enabled(), vec!["rotate", "blur"]);
        assert!(AugmentationParams::default().is_empty());
    }

    #[test]
    fn test_instrument_parsing() {
        assert_eq!("MAG".parse::<Instrument>().unwrap(), Instrument::Mag);
        assert!("hmi".parse::<Instrument>().is_err());
    }
}
