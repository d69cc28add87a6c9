use crate::config::SimConfig;
use crate::constants::NUM_SENSORS;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// One range sensor: where it points relative to the heading, how far it
/// reaches, and how strongly the robot turns when it fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorGene {
    /// Offset from the robot heading, in `[0, 2π)`.
    pub angle: f32,
    /// Ray length, in `[0, max_sensor_range]`.
    pub range: f32,
    /// Turn weight applied when the sensor fires, in `[-1, 1]`.
    pub action: f32,
}

/// Evolvable behaviour parameters of one robot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Forward speed (units/s).
    pub linear_velocity: f32,
    /// Turn magnitude scaling every sensor action.
    pub angular_velocity: f32,
    pub sensors: [SensorGene; NUM_SENSORS],
}

/// Sampling ranges for random genes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneLimits {
    pub max_linear_velocity: f32,
    pub max_angular_velocity: f32,
    pub max_sensor_range: f32,
}

impl GeneLimits {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            max_linear_velocity: config.max_linear_velocity,
            max_angular_velocity: config.max_angular_velocity,
            max_sensor_range: config.max_sensor_range,
        }
    }
}

impl Default for GeneLimits {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl Gene {
    /// Draw every parameter independently and uniformly within `limits`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, limits: &GeneLimits) -> Self {
        let linear_velocity = rng.random_range(0.0..=limits.max_linear_velocity);
        let angular_velocity = rng.random_range(0.0..=limits.max_angular_velocity);
        let sensors = std::array::from_fn(|_| SensorGene {
            angle: rng.random_range(0.0..TAU),
            range: rng.random_range(0.0..=limits.max_sensor_range),
            action: rng.random_range(-1.0..=1.0),
        });
        Self {
            linear_velocity,
            angular_velocity,
            sensors,
        }
    }

    /// Element-wise average of two genes.
    pub fn blend(&self, other: &Gene) -> Gene {
        let avg = |a: f32, b: f32| (a + b) / 2.0;
        Gene {
            linear_velocity: avg(self.linear_velocity, other.linear_velocity),
            angular_velocity: avg(self.angular_velocity, other.angular_velocity),
            sensors: std::array::from_fn(|i| SensorGene {
                angle: avg(self.sensors[i].angle, other.sensors[i].angle),
                range: avg(self.sensors[i].range, other.sensors[i].range),
                action: avg(self.sensors[i].action, other.sensors[i].action),
            }),
        }
    }

    /// Move halfway toward the elite gene.
    pub fn cross_with(&mut self, elite: &Gene) {
        *self = self.blend(elite);
    }

    /// Move halfway toward a freshly drawn random gene.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, limits: &GeneLimits) {
        let random = Gene::random(rng, limits);
        *self = self.blend(&random);
    }

    /// Flattened parameter view, in declaration order.
    pub fn values(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(2 + 3 * NUM_SENSORS);
        out.push(self.linear_velocity);
        out.push(self.angular_velocity);
        for s in &self.sensors {
            out.extend_from_slice(&[s.angle, s.range, s.action]);
        }
        out
    }

    /// Whether every parameter lies within `limits`.
    pub fn is_within(&self, limits: &GeneLimits) -> bool {
        (0.0..=limits.max_linear_velocity).contains(&self.linear_velocity)
            && (0.0..=limits.max_angular_velocity).contains(&self.angular_velocity)
            && self.sensors.iter().all(|s| {
                (0.0..TAU).contains(&s.angle)
                    && (0.0..=limits.max_sensor_range).contains(&s.range)
                    && (-1.0..=1.0).contains(&s.action)
            })
    }
}
