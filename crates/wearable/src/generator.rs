//! Simulated wearable readings.
//!
//! [`ReadingGenerator`] random-walks a heart rate and an SpO2 level so
//! consecutive readings look like a real sensor rather than noise. Each
//! value is classified on the producer side with the shared threshold
//! table before it is sent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use wardwatch_core::measurement_names::{
    MEASUREMENT_HEART_RATE, MEASUREMENT_SPO2, UNIT_BPM, UNIT_PERCENT,
};
use wardwatch_core::types::{DbId, Timestamp};
use wardwatch_core::vitals::{classify, VitalStatus};

/// Bounds for the simulated heart rate, in bpm.
pub const HEART_RATE_RANGE: (f64, f64) = (35.0, 180.0);
/// Bounds for the simulated SpO2, in percent.
pub const SPO2_RANGE: (f64, f64) = (80.0, 100.0);

const START_HEART_RATE: f64 = 75.0;
const START_SPO2: f64 = 98.0;

/// Largest change per tick.
const HEART_RATE_STEP: f64 = 4.0;
const SPO2_STEP: f64 = 0.6;

/// One reading as sent over the relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingEnvelope {
    pub patient_id: DbId,
    pub measurement_type: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub status: VitalStatus,
    pub measured_at: Timestamp,
}

/// Random-walk generator for heart rate and SpO2.
pub struct ReadingGenerator<R = StdRng> {
    rng: R,
    heart_rate: f64,
    spo2: f64,
}

impl ReadingGenerator<StdRng> {
    /// Generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> ReadingGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            heart_rate: START_HEART_RATE,
            spo2: START_SPO2,
        }
    }

    /// Current heart rate, before the next step.
    pub fn heart_rate(&self) -> f64 {
        self.heart_rate
    }

    /// Current SpO2, before the next step.
    pub fn spo2(&self) -> f64 {
        self.spo2
    }

    /// Advance both walks one step and return one envelope per measurement.
    pub fn next_batch(&mut self, patient_id: DbId, now: Timestamp) -> [ReadingEnvelope; 2] {
        self.heart_rate =
            step(&mut self.rng, self.heart_rate, HEART_RATE_STEP, HEART_RATE_RANGE).round();
        self.spo2 = round_tenth(step(&mut self.rng, self.spo2, SPO2_STEP, SPO2_RANGE));

        [
            envelope(patient_id, MEASUREMENT_HEART_RATE, self.heart_rate, UNIT_BPM, now),
            envelope(patient_id, MEASUREMENT_SPO2, self.spo2, UNIT_PERCENT, now),
        ]
    }
}

fn step<R: Rng>(rng: &mut R, current: f64, max_step: f64, (lo, hi): (f64, f64)) -> f64 {
    let delta = rng.random_range(-max_step..=max_step);
    (current + delta).clamp(lo, hi)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn envelope(
    patient_id: DbId,
    measurement_type: &'static str,
    value: f64,
    unit: &'static str,
    measured_at: Timestamp,
) -> ReadingEnvelope {
    ReadingEnvelope {
        patient_id,
        measurement_type,
        value,
        unit,
        status: classify(measurement_type, value),
        measured_at,
    }
}
