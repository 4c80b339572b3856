//! QR codes for field missions
//!
//! Renders mission payloads, or any text, as a QR code drawn with unicode
//! half blocks so it can be scanned straight off the terminal.

use crate::data::MissionRecord;
use crate::game::Catalog;
use qrcode::render::unicode;
use qrcode::QrCode;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QrImageError {
    #[error("Nothing to encode")]
    Empty,

    #[error("Cannot encode QR code: {0}")]
    Encode(String),

    #[error("Mission {0} has no QR code")]
    NoPayload(u32),
}

/// Draw `text` as a QR code, two modules per character cell vertically.
///
/// Dark modules come out as blank cells and light ones as filled blocks,
/// which scans correctly on a dark terminal background.
pub fn render_qr(text: &str) -> Result<String, QrImageError> {
    if text.is_empty() {
        return Err(QrImageError::Empty);
    }
    let code = QrCode::new(text.as_bytes()).map_err(|e| QrImageError::Encode(e.to_string()))?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Missions that carry a known QR payload, in catalog order
pub fn qr_missions(catalog: &Catalog) -> Vec<&MissionRecord> {
    catalog
        .missions()
        .iter()
        .filter(|m| mission_payload(m).is_some())
        .collect()
}

pub fn mission_payload(mission: &MissionRecord) -> Option<&str> {
    mission.qr.as_ref()?.payload.as_deref()
}

/// The code for a mission's payload
pub fn render_mission_qr(mission: &MissionRecord) -> Result<String, QrImageError> {
    let payload = mission_payload(mission).ok_or(QrImageError::NoPayload(mission.id))?;
    render_qr(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_thirty_renders() {
        let catalog = Catalog::embedded().unwrap();
        let mission = catalog.get(30).unwrap();
        let image = render_mission_qr(mission).unwrap();

        let widths: Vec<usize> = image.lines().map(|l| l.chars().count()).collect();
        assert!(widths.len() > 10);
        assert!(widths.iter().all(|w| *w == widths[0]));
        // Version 1 is 21 modules wide, plus the quiet zone
        assert!(widths[0] > 21);
        assert!(image.chars().any(|c| matches!(c, '█' | '▀' | '▄')));
    }

    #[test]
    fn same_text_same_code() {
        assert_eq!(render_qr("PIER NINE").unwrap(), render_qr("PIER NINE").unwrap());
        assert_ne!(render_qr("PIER NINE").unwrap(), render_qr("PIER TEN").unwrap());
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(render_qr(""), Err(QrImageError::Empty));
    }

    #[test]
    fn lists_only_missions_with_payloads() {
        let catalog = Catalog::embedded().unwrap();
        let ids: Vec<u32> = qr_missions(&catalog).iter().map(|m| m.id).collect();
        assert!(ids.contains(&30));
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&29));

        let plain = catalog.get(1).unwrap();
        assert_eq!(render_mission_qr(plain), Err(QrImageError::NoPayload(1)));
    }
}
