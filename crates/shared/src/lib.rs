//! Types shared between the viewer and the asset server.

pub mod color;
pub mod parameters;
pub mod paths;

pub use color::Color;
pub use parameters::{ParamValue, ParameterError, Parameters};
pub use paths::ModelPaths;

/// Reserved parameter key holding the model color
pub const COLOR_KEY: &str = "kleur";

/// Color injected when the parameter file has no color key
pub const DEFAULT_COLOR: &str = "#00aaff";

/// Parameter driving the model's X scale
pub const WIDTH_KEY: &str = "breedte";

/// Parameter driving the model's Y scale
pub const HEIGHT_KEY: &str = "Hoogte";

/// Parameter driving the model's Z scale
pub const LENGTH_KEY: &str = "Lengte";

/// Parameter values are percentages of the asset's native size
pub const SCALE_DIVISOR: f64 = 100.0;

/// Model axis driven by a scale parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAxis {
    X,
    Y,
    Z,
}

impl ScaleAxis {
    pub const ALL: [ScaleAxis; 3] = [ScaleAxis::X, ScaleAxis::Y, ScaleAxis::Z];

    /// Parameter key for this axis (case-sensitive)
    pub fn key(self) -> &'static str {
        match self {
            ScaleAxis::X => WIDTH_KEY,
            ScaleAxis::Y => HEIGHT_KEY,
            ScaleAxis::Z => LENGTH_KEY,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ScaleAxis::X => 0,
            ScaleAxis::Y => 1,
            ScaleAxis::Z => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_keys_are_case_sensitive() {
        assert_eq!(ScaleAxis::X.key(), "breedte");
        assert_eq!(ScaleAxis::Y.key(), "Hoogte");
        assert_eq!(ScaleAxis::Z.key(), "Lengte");
    }

    #[test]
    fn test_default_color_parses() {
        let c: Color = DEFAULT_COLOR.parse().unwrap();
        assert_eq!(c, Color::rgb(0x00, 0xaa, 0xff));
    }
}
