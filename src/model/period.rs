use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar period accepted by the period-based quote and history endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Period {
    #[serde(rename = "1")]
    OneMinute,
    #[serde(rename = "5")]
    FiveMinutes,
    #[serde(rename = "10")]
    TenMinutes,
    #[serde(rename = "15")]
    FifteenMinutes,
    #[serde(rename = "30")]
    ThirtyMinutes,
    #[serde(rename = "h")]
    Hour,
    #[default]
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "m")]
    Month,
}

impl Period {
    pub const ALL: [Period; 9] = [
        Period::OneMinute,
        Period::FiveMinutes,
        Period::TenMinutes,
        Period::FifteenMinutes,
        Period::ThirtyMinutes,
        Period::Hour,
        Period::Day,
        Period::Week,
        Period::Month,
    ];

    /// Wire token for the `Period` request parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMinute => "1",
            Period::FiveMinutes => "5",
            Period::TenMinutes => "10",
            Period::FifteenMinutes => "15",
            Period::ThirtyMinutes => "30",
            Period::Hour => "h",
            Period::Day => "d",
            Period::Week => "w",
            Period::Month => "m",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Period::OneMinute => "One minute",
            Period::FiveMinutes => "Five minutes",
            Period::TenMinutes => "Ten minutes",
            Period::FifteenMinutes => "Fifteen minutes",
            Period::ThirtyMinutes => "Thirty minutes",
            Period::Hour => "Hour",
            Period::Day => "Day",
            Period::Week => "Week",
            Period::Month => "Month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid period '{}'. Expected one of: 1, 5, 10, 15, 30, h, d, w, m.",
                    s
                )
            })
    }
}
