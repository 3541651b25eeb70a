use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Perceived-effort scale. The multiplier is fixed per step; load maths
/// elsewhere rely on these exact values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum Intensity {
    #[strum(serialize = "Very Light")]
    VeryLight,
    Light,
    Moderate,
    Hard,
    Maximum,
}

impl Intensity {
    pub fn multiplier(&self) -> u8 {
        match self {
            Intensity::VeryLight => 2,
            Intensity::Light => 4,
            Intensity::Moderate => 6,
            Intensity::Hard => 8,
            Intensity::Maximum => 10,
        }
    }

    /// Reverse lookup from the stored multiplier.
    pub fn from_multiplier(value: u8) -> Option<Self> {
        match value {
            2 => Some(Intensity::VeryLight),
            4 => Some(Intensity::Light),
            6 => Some(Intensity::Moderate),
            8 => Some(Intensity::Hard),
            10 => Some(Intensity::Maximum),
            _ => None,
        }
    }

    pub const ALL: [Intensity; 5] = [
        Intensity::VeryLight,
        Intensity::Light,
        Intensity::Moderate,
        Intensity::Hard,
        Intensity::Maximum,
    ];
}

/// A logged workout as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub date: NaiveDate,
    pub duration_min: f64,
    pub intensity: Intensity,
    pub load: f64,
}

/// A workout about to be inserted; the store assigns the id and derives
/// the load so a stale value can never be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub duration_min: f64,
    pub intensity: Intensity,
}

impl NewWorkout {
    pub fn new(date: NaiveDate, duration_min: f64, intensity: Intensity) -> Self {
        Self {
            date,
            duration_min,
            intensity,
        }
    }

    /// Load = duration (minutes) x intensity multiplier.
    pub fn load(&self) -> f64 {
        self.duration_min * f64::from(self.intensity.multiplier())
    }
}
