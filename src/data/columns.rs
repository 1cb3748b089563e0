//! Column names the air-quality tables are expected to carry.

pub const WIND_DIRECTION: &str = "wd";
pub const STATION: &str = "station";

/// Continuous pollutant and meteorological readings.
pub const NUMERIC_COLUMNS: [&str; 11] = [
    "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "WSPM",
];

/// Label columns of the raw table.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [WIND_DIRECTION, STATION];

/// Pollutants averaged per wind direction.
pub const WIND_GROUP_COLUMNS: [&str; 6] = ["PM2.5", "PM10", "SO2", "NO2", "CO", "O3"];

/// Readings averaged per station and summed for the pie chart.
pub const STATION_COLUMNS: [&str; 10] = [
    "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN",
];
