//! Form state for the scoring dashboard.
//!
//! Field updates are local and independent: there is no cross-field
//! validation, and ranges shown in the UI (year, minimum area) are hints
//! only. The proxy performs the authoritative coercion.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Years offered by the yield-estimation input.
pub const YEAR_RANGE: RangeInclusive<i64> = 2022..=2030;

/// Minimum and step of the land-area input, in hectares.
pub const LAND_AREA_MIN: f64 = 0.1;
pub const LAND_AREA_STEP: f64 = 0.1;

/// Step of the coordinate inputs, in degrees.
pub const COORDINATE_STEP: f64 = 0.000_001;

/// Administrative regions offered by the region select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Afar,
    Amhara,
    Oromia,
    Tigray,
    Somali,
    Snnpr,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Self::Afar,
        Self::Amhara,
        Self::Oromia,
        Self::Tigray,
        Self::Somali,
        Self::Snnpr,
    ];

    /// Wire name, as sent to the scoring service.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Afar => "afar",
            Self::Amhara => "amhara",
            Self::Oromia => "oromia",
            Self::Tigray => "tigray",
            Self::Somali => "somali",
            Self::Snnpr => "snnpr",
        }
    }

    /// Display name for the select.
    pub fn label(self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| FormError::UnknownRegion(s.to_string()))
    }
}

/// Crops offered by the crop select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    #[default]
    Potato,
    Maize,
    Wheat,
    Coffee,
    Teff,
    Barley,
    Sorghum,
}

impl CropType {
    pub const ALL: [CropType; 7] = [
        Self::Potato,
        Self::Maize,
        Self::Wheat,
        Self::Coffee,
        Self::Teff,
        Self::Barley,
        Self::Sorghum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Potato => "potato",
            Self::Maize => "maize",
            Self::Wheat => "wheat",
            Self::Coffee => "coffee",
            Self::Teff => "teff",
            Self::Barley => "barley",
            Self::Sorghum => "sorghum",
        }
    }

    pub fn label(self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| FormError::UnknownCrop(s.to_string()))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error("unknown crop type '{0}'")]
    UnknownCrop(String),
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

/// The scoring form, serialized as the body of `POST /api/agrifinance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub region: Region,
    pub latitude: f64,
    pub longitude: f64,
    pub land_area: f64,
    pub crop_type: CropType,
    pub yield_estimation_year: i64,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            region: Region::Afar,
            latitude: 8.6,
            longitude: 36.5,
            land_area: 2.0,
            crop_type: CropType::Potato,
            yield_estimation_year: 2025,
        }
    }
}

/// A single field edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Region(Region),
    CropType(CropType),
    Latitude(f64),
    Longitude(f64),
    LandArea(f64),
    YieldEstimationYear(i64),
}

impl FormField {
    /// Build an edit from an input name and its raw text.
    pub fn parse(name: &str, raw: &str) -> Result<Self, FormError> {
        match name {
            "region" => raw.parse().map(Self::Region),
            "crop_type" => raw.parse().map(Self::CropType),
            "latitude" => parse_number("latitude", raw).map(Self::Latitude),
            "longitude" => parse_number("longitude", raw).map(Self::Longitude),
            "land_area" => parse_number("land_area", raw).map(Self::LandArea),
            "yield_estimation_year" => raw
                .trim()
                .parse::<i64>()
                .map(Self::YieldEstimationYear)
                .map_err(|_| FormError::NotANumber {
                    field: "yield_estimation_year",
                    value: raw.to_string(),
                }),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| FormError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

impl FormState {
    /// Apply one field edit.
    pub fn apply(&mut self, field: FormField) {
        match field {
            FormField::Region(region) => self.region = region,
            FormField::CropType(crop) => self.crop_type = crop,
            FormField::Latitude(v) => self.latitude = v,
            FormField::Longitude(v) => self.longitude = v,
            FormField::LandArea(v) => self.land_area = v,
            FormField::YieldEstimationYear(v) => self.yield_estimation_year = v,
        }
    }
}
