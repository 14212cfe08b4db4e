//! Coordinate reference system handling for imported map coordinates.
//!
//! Map points are always stored as WGS84 latitude/longitude. Imported rows may
//! use another system, named by a descriptor string such as `"EPSG:32632"`,
//! `"WGS84 UTM 32N"` or a Proj4 definition. A descriptor is resolved once per
//! import into a [`SourceProjection`], and a [`Projector`] backend prepares
//! the actual transform.

mod proj_backend;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub use proj_backend::ProjProjector;

/// Descriptor of the canonical reference.
pub const WGS84: &str = "EPSG:4326";

/// Errors raised while resolving or applying a coordinate system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrsError {
    /// The descriptor does not name a coordinate system the backend can use
    #[error("Unresolvable projection: '{descriptor}'")]
    UnresolvableProjection {
        /// The descriptor as given
        descriptor: String,
    },

    /// The backend failed to transform a coordinate
    #[error("Transform from '{descriptor}' failed: {message}")]
    Transform {
        /// Definition of the source system
        descriptor: String,
        /// Backend error message
        message: String,
    },
}

impl CrsError {
    /// Create an unresolvable projection error.
    pub fn unresolvable(descriptor: impl Into<String>) -> Self {
        Self::UnresolvableProjection {
            descriptor: descriptor.into(),
        }
    }

    /// Create a transform error.
    pub fn transform(descriptor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            descriptor: descriptor.into(),
            message: message.into(),
        }
    }
}

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A WGS84 UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    /// Zone number, 1 to 60
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl UtmZone {
    /// Create a zone. Returns None outside 1..=60.
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Option<Self> {
        (1..=60).contains(&zone).then_some(Self { zone, hemisphere })
    }

}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.hemisphere {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        };
        write!(f, "WGS84 UTM {}{}", self.zone, h)
    }
}

/// Proj4 definition of a WGS84 UTM zone.
pub fn utm_proj4(zone: u8, hemisphere: Hemisphere) -> String {
    let south = match hemisphere {
        Hemisphere::North => "",
        Hemisphere::South => " +south",
    };
    format!("+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs", zone, south)
}

static CANONICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:EPSG:4326|CRS:84|WGS\s*-?\s*84|\+proj=(?:longlat|latlong)\b.*\bWGS84\b.*)$")
        .expect("valid regex")
});

static UTM_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:WGS\s*-?\s*84\s*/?\s*)?(?:UTM\s*(?:zone\s*)?)?(\d{1,2})\s*([NS])$")
        .expect("valid regex")
});

static UTM_EPSG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^EPSG:\s*32([67])(\d{2})$").expect("valid regex"));

static PROJ4_UTM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\+proj=utm\b").expect("valid regex"));

static PROJ4_ZONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\+zone=(\d{1,2})\b").expect("valid regex"));

static PROJ4_SOUTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\+south\b").expect("valid regex"));

static PROJ4_DATUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\+(?:datum|ellps)=(\S+)").expect("valid regex"));

/// A resolved source coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceProjection {
    /// Already WGS84 longitude/latitude; no transform needed
    Wgs84,
    /// A WGS84 UTM zone
    Utm(UtmZone),
    /// Any other definition, left to a backend that understands it
    Definition(String),
}

impl SourceProjection {
    /// Parse a descriptor. Empty descriptors are unresolvable; descriptors
    /// that are neither canonical nor UTM are kept as opaque definitions.
    pub fn parse(descriptor: &str) -> Result<Self, CrsError> {
        let text = descriptor.trim();
        if text.is_empty() {
            return Err(CrsError::unresolvable(descriptor));
        }

        if CANONICAL.is_match(text) {
            return Ok(SourceProjection::Wgs84);
        }

        if let Some(zone) = parse_utm_descriptor(text) {
            return Ok(SourceProjection::Utm(zone));
        }

        if PROJ4_UTM.is_match(text) || UTM_TEXT.is_match(text) || UTM_EPSG.is_match(text) {
            // Looks like UTM but the zone is out of range or the datum is foreign.
            if !is_foreign_datum(text) {
                return Err(CrsError::unresolvable(descriptor));
            }
        }

        Ok(SourceProjection::Definition(text.to_string()))
    }

    /// Check if no transform is needed.
    pub fn is_canonical(&self) -> bool {
        matches!(self, SourceProjection::Wgs84)
    }

    /// Definition string suitable for a Proj backend.
    pub fn definition(&self) -> String {
        match self {
            SourceProjection::Wgs84 => WGS84.to_string(),
            SourceProjection::Utm(zone) => utm_proj4(zone.zone, zone.hemisphere),
            SourceProjection::Definition(text) => text.clone(),
        }
    }
}

impl fmt::Display for SourceProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceProjection::Wgs84 => f.write_str(WGS84),
            SourceProjection::Utm(zone) => write!(f, "{}", zone),
            SourceProjection::Definition(text) => f.write_str(text),
        }
    }
}

fn is_foreign_datum(text: &str) -> bool {
    PROJ4_DATUM
        .captures(text)
        .is_some_and(|caps| !caps[1].eq_ignore_ascii_case("WGS84"))
}

/// Parse a UTM zone out of a textual, EPSG or Proj4 descriptor.
///
/// Returns None for anything that is not a WGS84 UTM zone.
pub fn parse_utm_descriptor(descriptor: &str) -> Option<UtmZone> {
    let text = descriptor.trim();

    if let Some(caps) = UTM_TEXT.captures(text) {
        let zone: u8 = caps[1].parse().ok()?;
        let hemisphere = if caps[2].eq_ignore_ascii_case("S") {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        return UtmZone::new(zone, hemisphere);
    }

    if let Some(caps) = UTM_EPSG.captures(text) {
        let zone: u8 = caps[2].parse().ok()?;
        let hemisphere = if &caps[1] == "7" {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        return UtmZone::new(zone, hemisphere);
    }

    if PROJ4_UTM.is_match(text) && !is_foreign_datum(text) {
        let zone: u8 = PROJ4_ZONE.captures(text)?[1].parse().ok()?;
        let hemisphere = if PROJ4_SOUTH.is_match(text) {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        return UtmZone::new(zone, hemisphere);
    }

    None
}

/// A transform out of one source system, prepared once and reused per row.
pub trait Transform {
    /// Transform `(x, y)` into WGS84 `(lng, lat)`.
    fn to_wgs84(&self, x: f64, y: f64) -> Result<(f64, f64), CrsError>;
}

/// Backend that builds transforms from a source system into WGS84.
pub trait Projector: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Prepare the transform out of `source`. Fails when the backend cannot
    /// interpret the definition.
    fn prepare(&self, source: &SourceProjection) -> Result<Box<dyn Transform>, CrsError>;
}

/// A source projection resolved against a backend, ready to transform rows.
pub struct Normalizer {
    source: SourceProjection,
    /// None for canonical sources
    transform: Option<Box<dyn Transform>>,
}

impl Normalizer {
    /// Resolve `descriptor` (None means WGS84) against `projector`.
    pub fn resolve(descriptor: Option<&str>, projector: &dyn Projector) -> Result<Self, CrsError> {
        let source = match descriptor {
            Some(text) => SourceProjection::parse(text)?,
            None => SourceProjection::Wgs84,
        };

        let transform = if source.is_canonical() {
            None
        } else {
            let prepared = projector.prepare(&source).map_err(|e| {
                log::warn!(
                    "Projection backend '{}' cannot resolve '{}': {}",
                    projector.name(),
                    source,
                    e
                );
                CrsError::unresolvable(descriptor.unwrap_or(WGS84))
            })?;
            Some(prepared)
        };

        log::debug!("Resolved source projection {} via {}", source, projector.name());
        Ok(Self { source, transform })
    }

    pub fn source(&self) -> &SourceProjection {
        &self.source
    }

    /// Transform a `[lng, lat]`-ordered pair (easting, northing for projected
    /// systems) into WGS84 `[lng, lat]`.
    pub fn normalize(&self, pair: [f64; 2]) -> Result<[f64; 2], CrsError> {
        let Some(transform) = &self.transform else {
            return Ok(pair);
        };
        let (lng, lat) = transform.to_wgs84(pair[0], pair[1])?;
        if !lng.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
            return Err(CrsError::transform(
                self.source.definition(),
                format!("({}, {}) has no WGS84 position", pair[0], pair[1]),
            ));
        }
        Ok([lng, lat])
    }
}

/// Resolve `descriptor` and transform one `[lng, lat]` pair into WGS84.
pub fn normalize(
    descriptor: &str,
    pair: [f64; 2],
    projector: &dyn Projector,
) -> Result<[f64; 2], CrsError> {
    Normalizer::resolve(Some(descriptor), projector)?.normalize(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_descriptors() {
        for d in ["EPSG:4326", "epsg:4326", " WGS84 ", "WGS 84", "+proj=longlat +datum=WGS84 +no_defs"] {
            assert_eq!(SourceProjection::parse(d), Ok(SourceProjection::Wgs84), "{d}");
        }
    }

    #[test]
    fn test_utm_descriptors() {
        let north = UtmZone::new(32, Hemisphere::North).unwrap();
        let south = UtmZone::new(17, Hemisphere::South).unwrap();
        for (d, zone) in [
            ("WGS84 UTM 32N", north),
            ("UTM 32N", north),
            ("utm zone 32n", north),
            ("32N", north),
            ("WGS 84 / UTM zone 32N", north),
            ("EPSG:32632", north),
            ("+proj=utm +zone=32 +datum=WGS84 +units=m +no_defs", north),
            ("WGS84 UTM 17S", south),
            ("EPSG:32717", south),
            ("+proj=utm +zone=17 +south +ellps=WGS84", south),
        ] {
            assert_eq!(SourceProjection::parse(d), Ok(SourceProjection::Utm(zone)), "{d}");
        }
    }

    #[test]
    fn test_out_of_range_zone_is_unresolvable() {
        for d in ["UTM 61N", "EPSG:32600", "+proj=utm +zone=0", ""] {
            assert!(
                matches!(
                    SourceProjection::parse(d),
                    Err(CrsError::UnresolvableProjection { .. })
                ),
                "{d}"
            );
        }
    }

    #[test]
    fn test_other_definitions_are_opaque() {
        let p = SourceProjection::parse("EPSG:3857").unwrap();
        assert_eq!(p, SourceProjection::Definition("EPSG:3857".into()));
        let p = SourceProjection::parse("+proj=utm +zone=32 +ellps=intl").unwrap();
        assert!(matches!(p, SourceProjection::Definition(_)));
    }

    #[test]
    fn test_utm_proj4_definition() {
        assert_eq!(
            utm_proj4(17, Hemisphere::South),
            "+proj=utm +zone=17 +south +datum=WGS84 +units=m +no_defs"
        );
        let zone = UtmZone::new(10, Hemisphere::North).unwrap();
        assert_eq!(zone.to_string(), "WGS84 UTM 10N");
        assert_eq!(
            SourceProjection::Utm(zone).definition(),
            "+proj=utm +zone=10 +datum=WGS84 +units=m +no_defs"
        );
    }

    /// Backend that understands nothing.
    struct NoBackend;

    impl Projector for NoBackend {
        fn name(&self) -> &'static str {
            "none"
        }

        fn prepare(&self, source: &SourceProjection) -> Result<Box<dyn Transform>, CrsError> {
            Err(CrsError::unresolvable(source.definition()))
        }
    }

    #[test]
    fn test_canonical_passes_through() {
        let projector = NoBackend;
        let out = normalize("EPSG:4326", [-122.123456789, 45.987654321], &projector).unwrap();
        assert_eq!(out, [-122.123456789, 45.987654321]);
        let n = Normalizer::resolve(None, &projector).unwrap();
        assert_eq!(n.normalize([1.5, 2.5]).unwrap(), [1.5, 2.5]);
    }

    #[test]
    fn test_unsupported_definition_fails_to_resolve() {
        let err = Normalizer::resolve(Some(" EPSG:3857"), &NoBackend).err();
        assert_eq!(err, Some(CrsError::unresolvable(" EPSG:3857")));
    }
}
