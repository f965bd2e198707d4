use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use crate::graph::{CourseGraph, CourseId};

use super::config::{LayoutConfig, Point, Positions, SimulationParameters};

const INITIAL_RADIUS: f64 = 10.0;
const MIN_DISTANCE: f64 = 1e-3;

#[derive(Clone, Debug)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	is_anchor: bool,
	/// Unit direction used to separate coincident bodies.
	jitter: (f64, f64),
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// FNV-1a over the id bytes.
fn id_hash(id: &CourseId) -> u64 {
	id.as_str()
		.bytes()
		.fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
			(hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
		})
}

fn jitter_direction(id: &CourseId) -> (f64, f64) {
	let angle = (id_hash(id) % 3600) as f64 / 3600.0 * TAU;
	(angle.cos(), angle.sin())
}

/// Iterative charge/spring/collision/centering simulation.
///
/// Initial placement is a phyllotaxis spiral around the viewport centre,
/// nudged by a jitter derived from each node id, so identical inputs settle
/// identically. Nodes with a seed position start there instead, and anchored
/// nodes never move.
#[derive(Clone, Debug)]
pub struct ForceSimulation {
	ids: Vec<CourseId>,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	params: SimulationParameters,
	center: Point,
	alpha: f64,
	ticks: u32,
}

impl ForceSimulation {
	pub fn new(
		graph: &CourseGraph,
		config: &LayoutConfig,
		seed: &Positions,
		anchors: &Positions,
	) -> Self {
		let center = config.center();
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
		let mut ids = Vec::with_capacity(graph.len());
		let mut bodies = Vec::with_capacity(graph.len());
		for (i, node) in graph.nodes().iter().enumerate() {
			let jitter = jitter_direction(&node.id);
			let (x, y, is_anchor) = if let Some(p) = anchors.get(&node.id) {
				(p.x, p.y, true)
			} else if let Some(p) = seed.get(&node.id).filter(|p| p.is_finite()) {
				(p.x, p.y, false)
			} else {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				(
					center.x + radius * angle.cos() + jitter.0,
					center.y + radius * angle.sin() + jitter.1,
					false,
				)
			};
			ids.push(node.id.clone());
			bodies.push(Body {
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				is_anchor,
				jitter,
			});
		}

		let index: HashMap<&CourseId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
		let mut degree = vec![0usize; ids.len()];
		let mut pairs = Vec::with_capacity(graph.edges().len());
		for edge in graph.edges() {
			if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
				degree[s] += 1;
				degree[t] += 1;
				pairs.push((s, t));
			}
		}
		let springs = pairs
			.into_iter()
			.map(|(source, target)| Spring {
				source,
				target,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect();

		Self {
			ids,
			bodies,
			springs,
			params: SimulationParameters::from_config(config),
			center,
			alpha: 1.0,
			ticks: 0,
		}
	}

	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	pub fn ticks(&self) -> u32 {
		self.ticks
	}

	pub fn is_finished(&self) -> bool {
		self.ticks >= self.params.iterations
	}

	/// Completion in percent.
	pub fn progress(&self) -> f64 {
		(self.ticks as f64 / self.params.iterations as f64 * 100.0).min(100.0)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn positions(&self) -> Positions {
		self.ids
			.iter()
			.zip(&self.bodies)
			.map(|(id, b)| (id.clone(), Point::new(b.x, b.y)))
			.collect()
	}

	/// Run up to `n` ticks, stopping at the iteration cap.
	pub fn run(&mut self, n: u32) {
		for _ in 0..n {
			if self.is_finished() {
				break;
			}
			self.tick();
		}
	}

	pub fn tick(&mut self) {
		self.alpha += (0.0 - self.alpha) * self.params.alpha_decay;
		self.ticks += 1;
		if self.bodies.is_empty() {
			return;
		}
		self.apply_springs();
		self.apply_charge_and_collision();
		self.integrate();
		self.apply_centering();
		self.repair_non_finite();
	}

	fn apply_springs(&mut self) {
		let (alpha, strength, rest) = (self.alpha, self.params.force_spring, self.params.spring_length);
		for spring in &self.springs {
			let (s, t) = (&self.bodies[spring.source], &self.bodies[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			let mut l = (dx * dx + dy * dy).sqrt();
			if l < MIN_DISTANCE {
				(dx, dy) = (t.jitter.0 * MIN_DISTANCE, t.jitter.1 * MIN_DISTANCE);
				l = MIN_DISTANCE;
			}
			let k = (l - rest) / l * alpha * strength;
			let (fx, fy) = (dx * k, dy * k);
			let target = &mut self.bodies[spring.target];
			target.vx -= fx * spring.bias;
			target.vy -= fy * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += fx * (1.0 - spring.bias);
			source.vy += fy * (1.0 - spring.bias);
		}
	}

	/// Pairwise repulsion and overlap push, limited to neighbouring grid cells.
	fn apply_charge_and_collision(&mut self) {
		let cell = self.params.charge_distance_max;
		let max_sq = cell * cell;
		let min_gap = self.params.collision_radius * 2.0;
		let charge = self.params.force_charge * self.alpha;
		let collide = self.params.collision_strength;

		let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
		for (i, b) in self.bodies.iter().enumerate() {
			grid.entry(cell_of(b.x, b.y, cell)).or_default().push(i);
		}

		let mut dv = vec![(0.0_f64, 0.0_f64); self.bodies.len()];
		for (i, a) in self.bodies.iter().enumerate() {
			let (cx, cy) = cell_of(a.x, a.y, cell);
			for gx in cx - 1..=cx + 1 {
				for gy in cy - 1..=cy + 1 {
					let Some(members) = grid.get(&(gx, gy)) else {
						continue;
					};
					for &j in members {
						if j <= i {
							continue;
						}
						let b = &self.bodies[j];
						let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
						let mut dist_sq = dx * dx + dy * dy;
						if dist_sq > max_sq {
							continue;
						}
						if dist_sq < MIN_DISTANCE * MIN_DISTANCE {
							dx = a.jitter.0 - b.jitter.0 + MIN_DISTANCE;
							dy = a.jitter.1 - b.jitter.1;
							dist_sq = (dx * dx + dy * dy).max(MIN_DISTANCE);
						}
						let dist = dist_sq.sqrt();
						let mut push = charge / dist_sq;
						if dist < min_gap {
							push += (min_gap - dist) / dist * collide * 0.5;
						}
						dv[i].0 += dx * push;
						dv[i].1 += dy * push;
						dv[j].0 -= dx * push;
						dv[j].1 -= dy * push;
					}
				}
			}
		}
		for (b, (dx, dy)) in self.bodies.iter_mut().zip(dv) {
			b.vx += dx;
			b.vy += dy;
		}
	}

	fn integrate(&mut self) {
		let (damping, max_speed) = (self.params.damping_factor, self.params.max_speed);
		for b in &mut self.bodies {
			if b.is_anchor {
				b.vx = 0.0;
				b.vy = 0.0;
				continue;
			}
			b.vx *= damping;
			b.vy *= damping;
			let speed = (b.vx * b.vx + b.vy * b.vy).sqrt();
			if speed > max_speed {
				b.vx = b.vx / speed * max_speed;
				b.vy = b.vy / speed * max_speed;
			}
			b.x += b.vx;
			b.y += b.vy;
		}
	}

	/// Shift free bodies so their mean sits on the viewport centre.
	fn apply_centering(&mut self) {
		let free: Vec<&Body> = self.bodies.iter().filter(|b| !b.is_anchor).collect();
		if free.is_empty() {
			return;
		}
		let n = free.len() as f64;
		let (sx, sy) = free.iter().fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (shift_x, shift_y) = (self.center.x - sx / n, self.center.y - sy / n);
		if !(shift_x.is_finite() && shift_y.is_finite()) {
			return;
		}
		for b in self.bodies.iter_mut().filter(|b| !b.is_anchor) {
			b.x += shift_x;
			b.y += shift_y;
		}
	}

	fn repair_non_finite(&mut self) {
		let center = self.center;
		for b in &mut self.bodies {
			if !(b.x.is_finite() && b.y.is_finite() && b.vx.is_finite() && b.vy.is_finite()) {
				b.x = center.x + b.jitter.0 * INITIAL_RADIUS;
				b.y = center.y + b.jitter.1 * INITIAL_RADIUS;
				b.vx = 0.0;
				b.vy = 0.0;
			}
		}
	}
}

fn cell_of(x: f64, y: f64, size: f64) -> (i64, i64) {
	((x / size).floor() as i64, (y / size).floor() as i64)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{CourseRecord, RelationKind, RelationRecord, build};

	fn chain(n: usize) -> CourseGraph {
		let courses: Vec<_> = (0..n)
			.map(|i| CourseRecord::new(format!("c{i}"), "CS", &format!("{}", 100 + i)))
			.collect();
		let relations: Vec<_> = (1..n)
			.map(|i| {
				RelationRecord::new(format!("c{}", i - 1), format!("c{i}"), RelationKind::Prerequisite)
			})
			.collect();
		build(&courses, &relations).0
	}

	#[test]
	fn converges_to_finite_coordinates() {
		let graph = chain(40);
		let config = LayoutConfig::default();
		let mut sim = ForceSimulation::new(&graph, &config, &Positions::new(), &Positions::new());
		sim.run(config.iterations);
		assert!(sim.is_finished());
		assert_eq!(sim.progress(), 100.0);
		assert!(sim.positions().values().all(|p| p.is_finite()));
	}

	#[test]
	fn identical_inputs_settle_identically() {
		let graph = chain(25);
		let config = LayoutConfig {
			iterations: 50,
			..LayoutConfig::default()
		};
		let mut a = ForceSimulation::new(&graph, &config, &Positions::new(), &Positions::new());
		let mut b = ForceSimulation::new(&graph, &config, &Positions::new(), &Positions::new());
		a.run(50);
		b.run(50);
		assert_eq!(a.positions(), b.positions());
	}

	#[test]
	fn springs_pull_toward_rest_length() {
		let graph = chain(2);
		let config = LayoutConfig {
			iterations: 300,
			strength: 0.5,
			..LayoutConfig::default()
		};
		let seed = Positions::from([
			("c0".into(), Point::new(0.0, 300.0)),
			("c1".into(), Point::new(800.0, 300.0)),
		]);
		let mut sim = ForceSimulation::new(&graph, &config, &seed, &Positions::new());
		sim.run(300);
		let p = sim.positions();
		assert!(p[&CourseId::from("c0")].distance(p[&CourseId::from("c1")]) < 400.0);
	}

	#[test]
	fn anchors_hold_their_position() {
		let graph = chain(5);
		let anchor = Point::new(10.0, 20.0);
		let anchors = Positions::from([("c2".into(), anchor)]);
		let mut sim = ForceSimulation::new(&graph, &LayoutConfig::default(), &Positions::new(), &anchors);
		sim.run(100);
		assert_eq!(sim.positions()[&CourseId::from("c2")], anchor);
	}

	#[test]
	fn coincident_seeds_separate() {
		let graph = chain(3);
		let same = Point::new(400.0, 300.0);
		let seed: Positions = ["c0", "c1", "c2"].iter().map(|id| ((*id).into(), same)).collect();
		let mut sim = ForceSimulation::new(&graph, &LayoutConfig::default(), &seed, &Positions::new());
		sim.run(50);
		let p = sim.positions();
		assert!(p.values().all(|p| p.is_finite()));
		assert!(p[&CourseId::from("c0")].distance(p[&CourseId::from("c1")]) > 1.0);
	}

	#[test]
	fn single_node_sits_at_center() {
		let graph = chain(1);
		let config = LayoutConfig::default();
		let mut sim = ForceSimulation::new(&graph, &config, &Positions::new(), &Positions::new());
		sim.run(10);
		let p = sim.positions()[&CourseId::from("c0")];
		assert!(p.distance(config.center()) < 1e-6);
	}
}
