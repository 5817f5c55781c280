//! Unit conversions and display formatting for activity data.

/// Meters in a statute mile (display only; goal math uses the factor below).
const METERS_PER_MILE: f64 = 1609.34;

/// Miles per meter.
pub const MILES_PER_METER: f64 = 0.000621371;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28084;

pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

pub fn meters_to_kilometers(meters: f64) -> f64 {
    meters / 1000.0
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / 3600.0
}

/// Distance unit for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }

    fn meters_per_unit(&self) -> f64 {
        match self {
            DistanceUnit::Miles => METERS_PER_MILE,
            DistanceUnit::Kilometers => 1000.0,
        }
    }
}

/// Format seconds as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format pace as minutes per unit. Zero or invalid speed renders `--:--`.
pub fn format_pace(meters_per_second: f64, unit: DistanceUnit) -> String {
    if !meters_per_second.is_finite() || meters_per_second <= 0.0 {
        return "--:--".to_string();
    }

    let seconds_per_unit = unit.meters_per_unit() / meters_per_second;
    let minutes = (seconds_per_unit / 60.0).floor() as u32;
    let seconds = (seconds_per_unit % 60.0).floor() as u32;

    format!("{}:{:02}", minutes, seconds)
}

/// Format a distance with two decimals and unit suffix.
pub fn format_distance(meters: f64, unit: DistanceUnit) -> String {
    let value = match unit {
        DistanceUnit::Miles => meters_to_miles(meters),
        DistanceUnit::Kilometers => meters_to_kilometers(meters),
    };
    format!("{:.2} {}", value, unit.abbreviation())
}
