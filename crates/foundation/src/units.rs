use serde::{Deserialize, Serialize};

/// Meters per great-arc radian (mean earth radius used by the map engine).
pub const METERS_PER_GA_RADIAN: f64 = 6_378_100.0;
/// Meters per international nautical mile.
pub const METERS_PER_NMILE: f64 = 1852.0;
/// Meters per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Meter,
    Foot,
    NauticalMile,
    GaRadian,
}

impl DistanceUnit {
    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meter => 1.0,
            DistanceUnit::Foot => METERS_PER_FOOT,
            DistanceUnit::NauticalMile => METERS_PER_NMILE,
            DistanceUnit::GaRadian => METERS_PER_GA_RADIAN,
        }
    }
}

/// A distance tagged with its unit, e.g. a nominal map range.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub const fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub const fn feet(value: f64) -> Self {
        Self::new(value, DistanceUnit::Foot)
    }

    pub const fn nautical_miles(value: f64) -> Self {
        Self::new(value, DistanceUnit::NauticalMile)
    }

    pub const fn meters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Meter)
    }

    pub const fn ga_radians(value: f64) -> Self {
        Self::new(value, DistanceUnit::GaRadian)
    }

    pub fn as_unit(self, unit: DistanceUnit) -> f64 {
        self.value * self.unit.meters_per_unit() / unit.meters_per_unit()
    }

    pub fn as_meters(self) -> f64 {
        self.as_unit(DistanceUnit::Meter)
    }

    pub fn as_ga_radians(self) -> f64 {
        self.as_unit(DistanceUnit::GaRadian)
    }
}
