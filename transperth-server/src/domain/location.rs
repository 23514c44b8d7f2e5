//! Journey endpoints.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::DomainError;

/// Location type used by the planner for street addresses.
pub const DEFAULT_LOCATION_TYPE: &str = "psma_addresses";

/// A latitude/longitude pair in decimal degrees.
///
/// The planner exchanges positions as `"lat,lon"` strings. This type
/// guarantees both components are finite and in range.
///
/// # Examples
///
/// ```
/// use transperth_server::domain::Coordinates;
///
/// let pos: Coordinates = "-31.9505, 115.8605".parse().unwrap();
/// assert_eq!(pos.to_string(), "-31.9505,115.8605");
///
/// assert!("-31.9505".parse::<Coordinates>().is_err());
/// assert!("-95,115".parse::<Coordinates>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create coordinates, validating the ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let invalid = |reason| DomainError::InvalidCoordinates {
            value: format!("{lat},{lon}"),
            reason,
        };

        if !lat.is_finite() || !lon.is_finite() {
            return Err(invalid("components must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be between -180 and 180"));
        }

        Ok(Self { lat, lon })
    }
}

impl FromStr for Coordinates {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| DomainError::InvalidCoordinates {
            value: s.to_string(),
            reason,
        };

        let (lat, lon) = s.trim().split_once(',').ok_or_else(|| invalid("expected lat,lon"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| invalid("latitude is not a number"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| invalid("longitude is not a number"))?;

        Coordinates::new(lat, lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// One end of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Display name, as typed into the planner (e.g. a street address)
    pub name: String,

    /// Planner location type (e.g. `psma_addresses`, `stops`)
    pub kind: String,

    /// Geographic position
    pub position: Coordinates,

    /// Suburb, if known
    pub locality: Option<String>,
}

impl Location {
    /// Build a location from raw form values.
    ///
    /// Blank `kind` falls back to [`DEFAULT_LOCATION_TYPE`] and blank
    /// `locality` is treated as absent.
    pub fn new(
        name: &str,
        kind: Option<&str>,
        position: &str,
        locality: Option<&str>,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::MissingField("location name"));
        }
        if position.trim().is_empty() {
            return Err(DomainError::MissingField("location position"));
        }

        let kind = kind
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_LOCATION_TYPE);
        let locality = locality
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            kind: kind.to_string(),
            position: position.parse()?,
            locality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coordinates() {
        let pos: Coordinates = "-31.95,115.86".parse().unwrap();
        assert_eq!(pos.lat, -31.95);
        assert_eq!(pos.lon, 115.86);

        let pos: Coordinates = " -32.0 , 115.75 ".parse().unwrap();
        assert_eq!(pos.lat, -32.0);
        assert_eq!(pos.lon, 115.75);
    }

    #[test]
    fn reject_bad_coordinates() {
        assert!("".parse::<Coordinates>().is_err());
        assert!("-31.95".parse::<Coordinates>().is_err());
        assert!("north,east".parse::<Coordinates>().is_err());
        assert!("91,0".parse::<Coordinates>().is_err());
        assert!("0,181".parse::<Coordinates>().is_err());
        assert!("NaN,0".parse::<Coordinates>().is_err());
    }

    #[test]
    fn location_defaults() {
        let loc = Location::new(" 1 Main St ", None, "-31.9,115.8", Some("  ")).unwrap();
        assert_eq!(loc.name, "1 Main St");
        assert_eq!(loc.kind, DEFAULT_LOCATION_TYPE);
        assert_eq!(loc.locality, None);
    }

    #[test]
    fn location_keeps_explicit_values() {
        let loc =
            Location::new("Perth Stn", Some("stops"), "-31.95,115.86", Some("Perth")).unwrap();
        assert_eq!(loc.kind, "stops");
        assert_eq!(loc.locality.as_deref(), Some("Perth"));
    }

    #[test]
    fn location_requires_name_and_position() {
        assert_eq!(
            Location::new("", None, "-31.9,115.8", None),
            Err(DomainError::MissingField("location name"))
        );
        assert_eq!(
            Location::new("Home", None, " ", None),
            Err(DomainError::MissingField("location position"))
        );
    }
}
