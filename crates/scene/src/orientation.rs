use serde::{Deserialize, Serialize};

/// Which direction is up on the map.
///
/// Used both for the user's preference and for the orientation actually in
/// effect, which may be forced to north-up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapOrientation {
    #[default]
    NorthUp,
    TrackUp,
    HeadingUp,
}

/// Airplane angle that drives map rotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RotationSource {
    GroundTrack,
    Heading,
}

impl MapOrientation {
    pub fn rotation_source(self) -> Option<RotationSource> {
        match self {
            MapOrientation::NorthUp => None,
            MapOrientation::TrackUp => Some(RotationSource::GroundTrack),
            MapOrientation::HeadingUp => Some(RotationSource::Heading),
        }
    }
}

/// Switch to north-up once the range index exceeds `range_index`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoNorthUp {
    pub active: bool,
    pub range_index: usize,
}

impl Default for AutoNorthUp {
    fn default() -> Self {
        Self {
            active: true,
            range_index: 27,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrientationInputs {
    pub setting: MapOrientation,
    pub heading_valid: bool,
    pub auto_north_up: AutoNorthUp,
    pub range_index: usize,
    pub on_ground: bool,
}

/// Resolves the orientation in effect.
///
/// North-up wins when heading data is invalid, when it is the user's choice,
/// or when auto north-up applies at the current range. Track-up is only
/// honored in the air; on the ground the track is unreliable and heading-up
/// is used instead.
pub fn resolve_orientation(inputs: &OrientationInputs) -> MapOrientation {
    if !inputs.heading_valid {
        return MapOrientation::NorthUp;
    }

    let auto = inputs.auto_north_up;
    if inputs.setting == MapOrientation::NorthUp
        || (auto.active && inputs.range_index > auto.range_index)
    {
        MapOrientation::NorthUp
    } else if inputs.setting == MapOrientation::TrackUp && !inputs.on_ground {
        MapOrientation::TrackUp
    } else {
        MapOrientation::HeadingUp
    }
}
