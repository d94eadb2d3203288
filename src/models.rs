use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub device_id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub device_name: String,
    pub status: DeviceStatus,
    #[serde(default)]
    pub last_read_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default, rename = "inserted_at", alias = "timestamp")]
    pub timestamp: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub vibration: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub rpm: Option<f64>,
    pub power_watts: Option<f64>,
    pub noise_db: Option<f64>,
}

/// One charted sensor channel of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Temperature,
    Humidity,
    Vibration,
    Voltage,
    Current,
    Rpm,
    PowerWatts,
    NoiseDb,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Vibration,
        Metric::Voltage,
        Metric::Current,
        Metric::Rpm,
        Metric::PowerWatts,
        Metric::NoiseDb,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Vibration => "Vibration",
            Metric::Voltage => "Voltage",
            Metric::Current => "Current",
            Metric::Rpm => "RPM",
            Metric::PowerWatts => "Power",
            Metric::NoiseDb => "Noise",
        }
    }

    /// Decimal places used when displaying a value
    pub fn decimals(&self) -> usize {
        match self {
            Metric::Temperature | Metric::Humidity => 1,
            Metric::Vibration | Metric::Voltage | Metric::Current => 2,
            Metric::Rpm => 0,
            Metric::PowerWatts | Metric::NoiseDb => 1,
        }
    }

    pub fn value(&self, reading: &Reading) -> Option<f64> {
        match self {
            Metric::Temperature => reading.temperature,
            Metric::Humidity => reading.humidity,
            Metric::Vibration => reading.vibration,
            Metric::Voltage => reading.voltage,
            Metric::Current => reading.current,
            Metric::Rpm => reading.rpm,
            Metric::PowerWatts => reading.power_watts,
            Metric::NoiseDb => reading.noise_db,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorStat {
    pub min: f64,
    pub max: f64,
    pub trend: Trend,
}

/// Device list filter selected in the grid toolbar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
}

impl StatusFilter {
    pub fn matches(&self, status: DeviceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Online => status == DeviceStatus::Online,
            StatusFilter::Offline => status == DeviceStatus::Offline,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "online" => Ok(StatusFilter::Online),
            "offline" => Ok(StatusFilter::Offline),
            other => Err(format!("unknown status filter '{}'", other)),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
