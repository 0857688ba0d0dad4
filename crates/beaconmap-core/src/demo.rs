//! Demo Mode - Synthetic session generator
//!
//! Produces session files in the same layout a beacon recorder writes, so the
//! pipeline can be tried without real data. Each beacon does a random walk
//! around a common origin while its signal value drifts through the default
//! threshold range. Some samples lose their GPS fix and carry no longitude.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;

use crate::telemetry::{COL_AZIMUTH, COL_BEACON_ID, COL_DATA, COL_LATITUDE, COL_LONGITUDE, COL_TIMESTAMP};

/// Synthetic session builder
pub struct DemoSession {
    /// Number of beacons
    beacons: usize,
    /// Samples written per beacon
    samples_per_beacon: usize,
    /// Every n-th sample of a beacon has no GPS fix (0 disables dropouts)
    dropout_every: usize,
    /// Starting point of every walk, `[lat, lng]`
    origin: [f64; 2],
    /// Timestamp of the first sample
    start: NaiveDateTime,
    /// Random number generator
    rng: StdRng,
}

impl Default for DemoSession {
    fn default() -> Self {
        Self::new(0x6265_6163)
    }
}

/// Beacon walk state
#[derive(Debug, Clone, Copy)]
struct Walker {
    position: [f64; 2],
    heading: f64,
    phase: f64,
}

impl DemoSession {
    /// Create a generator; the same seed always yields the same session
    pub fn new(seed: u64) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap_or_default();

        Self {
            beacons: 3,
            samples_per_beacon: 500,
            dropout_every: 50,
            origin: [40.4168, -3.7038],
            start,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set the number of beacons
    pub fn beacons(mut self, beacons: usize) -> Self {
        self.beacons = beacons;
        self
    }

    /// Set the samples written per beacon
    pub fn samples_per_beacon(mut self, samples: usize) -> Self {
        self.samples_per_beacon = samples;
        self
    }

    /// Every n-th sample loses its fix; 0 disables dropouts
    pub fn dropout_every(mut self, n: usize) -> Self {
        self.dropout_every = n;
        self
    }

    /// Set the walk origin
    pub fn origin(mut self, latitude: f64, longitude: f64) -> Self {
        self.origin = [latitude, longitude];
        self
    }

    /// Generate a full session text: two preamble lines, header, rows
    pub fn generate(&mut self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{{\"device\":\"beaconmap-demo\",\"beacons\":{}}}",
            self.beacons
        );
        let _ = writeln!(
            out,
            "{{\"started\":\"{}\"}}",
            self.start.format("%Y-%m-%dT%H:%M:%S")
        );
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            COL_BEACON_ID, COL_TIMESTAMP, COL_LATITUDE, COL_LONGITUDE, COL_DATA, COL_AZIMUTH
        );

        let mut walkers: Vec<Walker> = (0..self.beacons)
            .map(|_| Walker {
                position: self.origin,
                heading: self.rng.gen_range(0.0..360.0),
                phase: self.rng.gen_range(0.0..std::f64::consts::TAU),
            })
            .collect();

        // Samples are interleaved across beacons, as a recorder would write them
        for step in 0..self.samples_per_beacon {
            let timestamp = self.start + Duration::seconds(step as i64);
            for (beacon, walker) in walkers.iter_mut().enumerate() {
                let (data, azimuth) = Self::advance(&mut self.rng, walker, step);
                let lost_fix = self.dropout_every > 0 && step % self.dropout_every == self.dropout_every - 1;
                let longitude = if lost_fix {
                    String::new()
                } else {
                    format!("{:.6}", walker.position[1])
                };

                let _ = writeln!(
                    out,
                    "B{:02},{},{:.6},{},{:.0},{:.2}",
                    beacon + 1,
                    timestamp.format("%Y-%m-%d %H:%M:%S"),
                    walker.position[0],
                    longitude,
                    data,
                    azimuth
                );
            }
        }

        out
    }

    /// Move one walker a step; returns `(data, azimuth)`
    fn advance(rng: &mut StdRng, walker: &mut Walker, step: usize) -> (f64, f64) {
        walker.heading = (walker.heading + rng.gen_range(-20.0..20.0)).rem_euclid(360.0);
        let distance = rng.gen_range(0.00002..0.00012);
        let rad = walker.heading.to_radians();
        walker.position[0] += distance * rad.cos();
        walker.position[1] += distance * rad.sin();

        // Drift through roughly 0..2300 so the default thresholds show the full range
        let t = step as f64 / 40.0 + walker.phase;
        let data = (1150.0 + 900.0 * t.sin() + rng.gen_range(-120.0..120.0)).max(0.0);

        (data, walker.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::BatchReader;
    use crate::telemetry::strip_header_lines;

    #[test]
    fn test_same_seed_same_session() {
        let a = DemoSession::new(7).samples_per_beacon(20).generate();
        let b = DemoSession::new(7).samples_per_beacon(20).generate();
        let c = DemoSession::new(8).samples_per_beacon(20).generate();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_session_parses() {
        let text = DemoSession::new(1)
            .beacons(4)
            .samples_per_beacon(100)
            .dropout_every(10)
            .generate();
        let body = strip_header_lines(&text, 2).to_string();

        let rows: Vec<_> = BatchReader::from_string(body, 64)
            .unwrap()
            .flat_map(|batch| batch.unwrap())
            .collect();

        assert_eq!(rows.len(), 400);
        assert_eq!(rows.iter().filter(|r| !r.is_located()).count(), 40);
        assert_eq!(rows[0].beacon_id, "B01");
        assert_eq!(rows[3].beacon_id, "B04");
        assert_eq!(rows[0].localized_timestamp, "2024-05-01 10:00:00");
        assert!(rows.iter().all(|r| r.data >= 0.0));
    }
}
