//! Geographical values stored in location fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GlaiveError, Result};

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GlaiveError::invalid_argument(format!(
                "Invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GlaiveError::invalid_argument(format!(
                "Invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Calculate the Haversine distance to another point in kilometers.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Check if this point is within a rectangular bounding box.
    pub fn within_bounds(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> bool {
        self.lat >= min_lat && self.lat <= max_lat && self.lon >= min_lon && self.lon <= max_lon
    }

    /// Parse a coordinate string like "lat,lon" or "lat lon".
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (lat_str, lon_str) = match input.split_once(',') {
            Some(parts) => parts,
            None => {
                let parts: Vec<&str> = input.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(GlaiveError::invalid_argument(format!(
                        "Invalid coordinate format: '{input}'. Expected 'lat,lon' or 'lat lon'"
                    )));
                }
                (parts[0], parts[1])
            }
        };

        let lat = lat_str
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                GlaiveError::invalid_argument(format!("Invalid latitude: '{}'", lat_str.trim()))
            })?;
        let lon = lon_str
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                GlaiveError::invalid_argument(format!("Invalid longitude: '{}'", lon_str.trim()))
            })?;

        GeoPoint::new(lat, lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A geographical bounding box defined by its upper-left and lower-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    /// Top-left corner
    pub top_left: GeoPoint,
    /// Bottom-right corner
    pub bottom_right: GeoPoint,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self> {
        if top_left.lat < bottom_right.lat {
            return Err(GlaiveError::invalid_argument(
                "Top-left latitude must be greater than bottom-right latitude",
            ));
        }
        if top_left.lon > bottom_right.lon {
            return Err(GlaiveError::invalid_argument(
                "Top-left longitude must be less than bottom-right longitude",
            ));
        }

        Ok(GeoBoundingBox {
            top_left,
            bottom_right,
        })
    }

    /// Check if a point is within this bounding box.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.within_bounds(
            self.bottom_right.lat,
            self.top_left.lat,
            self.top_left.lon,
            self.bottom_right.lon,
        )
    }
}
