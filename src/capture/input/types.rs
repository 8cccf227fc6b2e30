use serde::{Deserialize, Serialize};

/// Stable identity of one physical contact for as long as it touches the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lifecycle stage of a contact as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Cancelled,
    RegionEntered,
    RegionMoved,
    RegionExited,
    #[serde(other)]
    Unknown,
}

impl TouchPhase {
    /// Short code used in diagnostic lines
    pub fn code(&self) -> &'static str {
        match self {
            TouchPhase::Began => "B",
            TouchPhase::Moved => "M",
            TouchPhase::Stationary => "S",
            TouchPhase::Ended => "E",
            TouchPhase::Cancelled => "C",
            TouchPhase::RegionEntered => "REN",
            TouchPhase::RegionMoved => "RM",
            TouchPhase::RegionExited => "REX",
            TouchPhase::Unknown => "U",
        }
    }
}

/// A single contact inside a touch event. Read-only to the visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchContact {
    pub id: ContactId,
    pub phase: TouchPhase,
    /// Location in screen space; surfaces convert it to their local space
    pub location: Point,
    /// `None` when the environment cannot report a radius (e.g. emulators)
    #[serde(default)]
    pub radius: Option<f64>,
}

impl TouchContact {
    pub fn new(id: u64, phase: TouchPhase, x: f64, y: f64) -> Self {
        Self {
            id: ContactId(id),
            phase,
            location: Point::new(x, y),
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// Everything the host's dispatch path can hand to an observer
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// One touch event with every contact it carries, in host order
    Touches(Vec<TouchContact>),
    /// Device orientation flipped; marker coordinates are stale
    OrientationChanged,
    /// Presses, motion, remote control and anything else that is not touch input
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_codes() {
        let codes: Vec<&str> = [
            TouchPhase::Began,
            TouchPhase::Moved,
            TouchPhase::Stationary,
            TouchPhase::Ended,
            TouchPhase::Cancelled,
            TouchPhase::RegionEntered,
            TouchPhase::RegionMoved,
            TouchPhase::RegionExited,
            TouchPhase::Unknown,
        ]
        .iter()
        .map(TouchPhase::code)
        .collect();

        assert_eq!(codes, vec!["B", "M", "S", "E", "C", "REN", "RM", "REX", "U"]);
    }

    #[test]
    fn test_contact_deserializes_unknown_phase() {
        let contact: TouchContact = serde_json::from_str(
            r#"{"id": 7, "phase": "hovering", "location": {"x": 1.0, "y": 2.0}}"#,
        )
        .unwrap();

        assert_eq!(contact.id, ContactId(7));
        assert_eq!(contact.phase, TouchPhase::Unknown);
        assert_eq!(contact.radius, None);
    }
}
