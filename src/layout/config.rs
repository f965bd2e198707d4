use std::collections::HashMap;

use thiserror::Error;

use crate::graph::CourseId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Node id -> coordinate, in graph space.
pub type Positions = HashMap<CourseId, Point>;

/// Node attribute used to group nodes onto rings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKey {
	Faculty,
	Subject,
	Level,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
	Grid,
	Hierarchical,
	Concentric(CategoryKey),
	Force,
}

impl LayoutKind {
	pub fn is_deterministic(self) -> bool {
		!matches!(self, LayoutKind::Force)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub width: f64,
	pub height: f64,
	pub kind: LayoutKind,
	/// Spring strength along edges.
	pub strength: f64,
	/// Spring rest length, also the grid/row spacing of deterministic layouts.
	pub distance: f64,
	pub iterations: u32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
			kind: LayoutKind::Force,
			strength: 0.1,
			distance: 80.0,
			iterations: 300,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
	#[error("layout config field `{field}` must be {expected}, got {value}")]
	InvalidConfig {
		field: &'static str,
		expected: &'static str,
		value: f64,
	},
	#[error("layout config must run at least one iteration")]
	ZeroIterations,
}

fn require(field: &'static str, value: f64, positive: bool) -> Result<(), LayoutError> {
	let ok = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
	if ok {
		Ok(())
	} else {
		Err(LayoutError::InvalidConfig {
			field,
			expected: if positive {
				"finite and positive"
			} else {
				"finite and non-negative"
			},
			value,
		})
	}
}

impl LayoutConfig {
	pub fn with_kind(kind: LayoutKind) -> Self {
		Self {
			kind,
			..Self::default()
		}
	}

	/// Rejects parameters that would let non-finite coordinates into the simulation.
	pub fn validate(&self) -> Result<(), LayoutError> {
		require("width", self.width, true)?;
		require("height", self.height, true)?;
		require("distance", self.distance, true)?;
		require("strength", self.strength, false)?;
		if self.iterations == 0 {
			return Err(LayoutError::ZeroIterations);
		}
		Ok(())
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Tuning of the force simulation, derived from a validated [`LayoutConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
	/// Repulsion between every node pair within `charge_distance_max`.
	pub force_charge: f64,
	pub charge_distance_max: f64,
	pub force_spring: f64,
	pub spring_length: f64,
	pub collision_radius: f64,
	pub collision_strength: f64,
	/// Fraction of velocity kept after each tick.
	pub damping_factor: f64,
	pub max_speed: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub iterations: u32,
	/// Number of evenly spaced progress snapshots.
	pub checkpoints: u32,
}

impl SimulationParameters {
	pub fn from_config(config: &LayoutConfig) -> Self {
		let iterations = config.iterations.max(1);
		let alpha_min = 0.001_f64;
		Self {
			force_charge: 150.0,
			charge_distance_max: (config.distance * 5.0).max(200.0),
			force_spring: config.strength,
			spring_length: config.distance,
			collision_radius: 12.0,
			collision_strength: 0.7,
			damping_factor: 0.6,
			max_speed: 50.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / iterations as f64),
			iterations,
			checkpoints: 10,
		}
	}

	/// Ticks between progress snapshots.
	pub fn batch_size(&self) -> u32 {
		self.iterations.div_ceil(self.checkpoints.max(1)).max(1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_valid() {
		assert_eq!(LayoutConfig::default().validate(), Ok(()));
	}

	#[test]
	fn rejects_degenerate_configs() {
		let zero_iterations = LayoutConfig {
			iterations: 0,
			..LayoutConfig::default()
		};
		assert_eq!(zero_iterations.validate(), Err(LayoutError::ZeroIterations));

		let nan_distance = LayoutConfig {
			distance: f64::NAN,
			..LayoutConfig::default()
		};
		assert!(matches!(
			nan_distance.validate(),
			Err(LayoutError::InvalidConfig {
				field: "distance",
				..
			})
		));

		let negative_strength = LayoutConfig {
			strength: -1.0,
			..LayoutConfig::default()
		};
		assert!(negative_strength.validate().is_err());
	}

	#[test]
	fn batches_cover_all_iterations() {
		let params = SimulationParameters::from_config(&LayoutConfig {
			iterations: 95,
			..LayoutConfig::default()
		});
		assert_eq!(params.batch_size(), 10);
		let tiny = SimulationParameters::from_config(&LayoutConfig {
			iterations: 3,
			..LayoutConfig::default()
		});
		assert_eq!(tiny.batch_size(), 1);
	}
}
