use crate::{
    skin::Algorithm,
    sn_error::SnError,
    types::{DEFAULT_TICKS_PER_SECOND, RIGID_EPSILON},
};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for skinning and playback. Fields missing from a YAML document
/// take their default value.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct SkinOptions {
    pub algorithm: Algorithm,
    pub default_ticks_per_second: f32, // For tracks that report zero
    pub validate_rigid: bool,
    pub rigid_epsilon: f32,
}

impl Default for SkinOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            validate_rigid: false,
            rigid_epsilon: RIGID_EPSILON,
        }
    }
}

impl SkinOptions {
    /// Parses options from a YAML string
    ///
    /// # Errors
    /// May return `SnError`
    pub fn from_yaml(text: &str) -> Result<Self, SnError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads options from a YAML file
    ///
    /// # Errors
    /// May return `SnError`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_yaml(&text)?;
        info!("Loaded {:?} from {:?}", options, path.as_ref());
        Ok(options)
    }

    /// Converts options to a YAML string
    ///
    /// # Errors
    /// May return `SnError`
    pub fn to_yaml(&self) -> Result<String, SnError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::SkinOptions;
    use crate::{skin::Algorithm, sn_error::SnError};

    #[test]
    fn partial_yaml() {
        let options =
            SkinOptions::from_yaml("algorithm: StretchTwist\nvalidate_rigid: true\n")
                .unwrap();
        assert_eq!(options.algorithm, Algorithm::StretchTwist);
        assert!(options.validate_rigid);
        assert_eq!(
            options.default_ticks_per_second,
            SkinOptions::default().default_ticks_per_second
        );
    }

    #[test]
    fn yaml_round_trip() {
        let options = SkinOptions {
            algorithm: Algorithm::DualQuaternion,
            default_ticks_per_second: 30.0,
            ..Default::default()
        };
        let text = options.to_yaml().unwrap();
        assert_eq!(SkinOptions::from_yaml(&text).unwrap(), options);
    }

    #[test]
    fn bad_yaml() {
        assert!(matches!(
            SkinOptions::from_yaml("algorithm: Sideways\n"),
            Err(SnError::SerdeYamlError(_))
        ));
        assert!(matches!(
            SkinOptions::load("no/such/options.yaml"),
            Err(SnError::StdIoError(_))
        ));
    }
}
