//! Device capabilities
//!
//! Location and QR scanning sit behind small traits so the session never
//! touches hardware directly. The terminal build uses a fixed position from
//! the command line and a scanner fed by typed input.

use crate::data::LocationConstraint;
use std::cell::RefCell;
use std::rc::Rc;

/// Mean earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>, // Meters, when the source reports one
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    /// Parse "LAT,LON" as given on the command line
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lon) = text.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lon.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,

    #[error("QR scan failed: {0}")]
    ScanFailed(String),
}

pub trait LocationProvider {
    fn current_position(&self) -> Result<Position, DeviceError>;
}

pub trait QrScanner {
    /// Read one code and return its text
    fn scan_once(&mut self) -> Result<String, DeviceError>;
}

/// Great-circle distance between two fixes, in meters
pub fn distance_meters(a: &Position, b: &Position) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Result of checking a fix against a mission location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub distance_meters: f64,
    pub radius_meters: f64,
}

impl Proximity {
    pub fn is_within(&self) -> bool {
        self.distance_meters <= self.radius_meters
    }
}

pub fn proximity(position: &Position, target: &LocationConstraint) -> Proximity {
    let center = Position::new(target.latitude, target.longitude);
    Proximity {
        distance_meters: distance_meters(position, &center),
        radius_meters: target.radius_meters,
    }
}

/// Location fixed at start-up, or absent
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    position: Option<Position>,
}

impl FixedLocation {
    pub fn new(position: Option<Position>) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Position, DeviceError> {
        self.position
            .ok_or_else(|| DeviceError::Unavailable("no location configured (use --location LAT,LON)".to_string()))
    }
}

/// Scanner that hands over whatever the player typed as the code's text.
///
/// Clones share one pending slot, so the UI can keep a handle and feed the
/// scanner the session owns.
#[derive(Debug, Clone, Default)]
pub struct ManualQrScanner {
    pending: Rc<RefCell<Option<String>>>,
}

impl ManualQrScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_payload(&self, payload: impl Into<String>) {
        *self.pending.borrow_mut() = Some(payload.into());
    }
}

impl QrScanner for ManualQrScanner {
    fn scan_once(&mut self) -> Result<String, DeviceError> {
        match self.pending.borrow_mut().take() {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(DeviceError::ScanFailed("no code read".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_francisco() -> LocationConstraint {
        LocationConstraint {
            latitude: 37.7749,
            longitude: -122.4194,
            radius_meters: 100.0,
            label: "Mission Location".to_string(),
        }
    }

    #[test]
    fn zero_distance_to_self() {
        let p = Position::new(37.7749, -122.4194);
        assert!(distance_meters(&p, &p).abs() < 1e-6);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        let d = distance_meters(&a, &b);
        assert!((d - 111_195.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn nearby_fix_is_within_radius() {
        // About 55m north
        let near = Position::new(37.7754, -122.4194);
        assert!(proximity(&near, &san_francisco()).is_within());

        let far = Position::new(37.7800, -122.4194);
        let result = proximity(&far, &san_francisco());
        assert!(!result.is_within());
        assert!(result.distance_meters > 500.0);
    }

    #[test]
    fn parses_command_line_coordinates() {
        assert_eq!(Position::parse("37.7749,-122.4194"), Some(Position::new(37.7749, -122.4194)));
        assert_eq!(Position::parse(" 1.5 , 2 "), Some(Position::new(1.5, 2.0)));
        assert!(Position::parse("91,0").is_none());
        assert!(Position::parse("north").is_none());
    }

    #[test]
    fn unset_location_is_unavailable() {
        let provider = FixedLocation::default();
        assert!(matches!(provider.current_position(), Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn manual_scanner_reads_once() {
        let mut scanner = ManualQrScanner::new();
        assert!(matches!(scanner.scan_once(), Err(DeviceError::ScanFailed(_))));

        scanner.set_payload("  HELLO  ");
        assert_eq!(scanner.scan_once().unwrap(), "HELLO");
        assert!(scanner.scan_once().is_err());

        scanner.set_payload("   ");
        assert!(scanner.scan_once().is_err());
    }

    #[test]
    fn clones_feed_the_same_scanner() {
        let feed = ManualQrScanner::new();
        let mut scanner = feed.clone();
        feed.set_payload("RTAJ");
        assert_eq!(scanner.scan_once().unwrap(), "RTAJ");
    }
}
