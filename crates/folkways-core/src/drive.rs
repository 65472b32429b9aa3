//! Emotional drives and their natural growth over time.

use serde::{Deserialize, Serialize};

/// Closed set of emotional pressures motivating agent behaviour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DriveKind {
    Belonging,
    Grief,
    Curiosity,
    Sustenance,
    Shelter,
    Pride,
}

impl DriveKind {
    /// Stable human-readable name used in traces and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Belonging => "Belonging",
            Self::Grief => "Grief",
            Self::Curiosity => "Curiosity",
            Self::Sustenance => "Sustenance",
            Self::Shelter => "Shelter",
            Self::Pride => "Pride",
        }
    }
}

/// A drive level (clamped to `[0, 100]`) or a signed impact delta, depending
/// on context. Negative deltas mean relief.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Drive {
    pub kind: DriveKind,
    pub intensity: f32,
}

impl Drive {
    /// Construct a new drive value.
    #[must_use]
    pub const fn new(kind: DriveKind, intensity: f32) -> Self {
        Self { kind, intensity }
    }
}

/// Parameters controlling natural drive growth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveParameters {
    /// Base rate at which drives increase per tick.
    pub base_growth_rate: f32,
    /// How much faster high drives grow compared to low ones.
    pub intensity_factor: f32,
    /// Per-kind growth modifiers; kinds not listed use 1.0.
    pub growth_modifiers: Vec<(DriveKind, f32)>,
}

impl Default for DriveParameters {
    fn default() -> Self {
        Self {
            base_growth_rate: 0.1,
            intensity_factor: 0.5,
            growth_modifiers: Vec::new(),
        }
    }
}

impl DriveParameters {
    /// Growth modifier for a drive kind, defaulting to 1.0 when absent.
    #[must_use]
    pub fn growth_modifier(&self, kind: DriveKind) -> f32 {
        self.growth_modifiers
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map_or(1.0, |(_, modifier)| *modifier)
    }
}

/// Advance a single drive by natural growth over `ticks_elapsed` ticks.
///
/// Intensity never decreases here; higher-intensity drives grow faster, with
/// the runaway bounded only by the clamp to 100.
#[must_use]
pub fn update_drive(drive: Drive, params: &DriveParameters, ticks_elapsed: u64) -> Drive {
    let increase_rate = params.base_growth_rate * params.growth_modifier(drive.kind);
    let intensity_multiplier = 1.0 + (drive.intensity / 100.0) * params.intensity_factor;
    let increase = increase_rate * intensity_multiplier * ticks_elapsed as f32;
    Drive::new(drive.kind, (drive.intensity + increase).min(100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_matches_formula() {
        let params = DriveParameters {
            base_growth_rate: 0.2,
            intensity_factor: 0.5,
            growth_modifiers: Vec::new(),
        };
        let drive = Drive::new(DriveKind::Sustenance, 50.0);
        let updated = update_drive(drive, &params, 10);
        assert_eq!(updated.kind, DriveKind::Sustenance);
        assert!((updated.intensity - 52.5).abs() < 1e-5);
    }

    #[test]
    fn growth_clamps_at_hundred() {
        let params = DriveParameters {
            base_growth_rate: 5.0,
            ..DriveParameters::default()
        };
        let updated = update_drive(Drive::new(DriveKind::Pride, 99.0), &params, 100);
        assert_eq!(updated.intensity, 100.0);
    }

    #[test]
    fn modifier_applies_per_kind() {
        let params = DriveParameters {
            base_growth_rate: 1.0,
            intensity_factor: 0.0,
            growth_modifiers: vec![(DriveKind::Grief, 0.0), (DriveKind::Curiosity, 2.0)],
        };
        let grief = update_drive(Drive::new(DriveKind::Grief, 10.0), &params, 1);
        assert_eq!(grief.intensity, 10.0);
        let curiosity = update_drive(Drive::new(DriveKind::Curiosity, 10.0), &params, 1);
        assert!((curiosity.intensity - 12.0).abs() < 1e-6);
        let pride = update_drive(Drive::new(DriveKind::Pride, 10.0), &params, 1);
        assert!((pride.intensity - 11.0).abs() < 1e-6);
    }

    #[test]
    fn zero_ticks_leaves_intensity_unchanged() {
        let params = DriveParameters::default();
        let drive = Drive::new(DriveKind::Shelter, 42.0);
        assert_eq!(update_drive(drive, &params, 0).intensity, 42.0);
    }
}
