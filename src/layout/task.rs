use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{debug, info, warn};

use crate::graph::CourseGraph;

use super::config::{LayoutConfig, LayoutError, LayoutKind, Positions};
use super::deterministic;
use super::force::ForceSimulation;
use super::rings::RingRegistry;

/// Advisory cancellation flag shared with a running layout.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

/// One progress message from a layout computation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSnapshot {
	pub generation: u64,
	pub positions: Positions,
	/// Completion in percent.
	pub percent: f64,
	pub complete: bool,
}

enum Work {
	Ready(Positions),
	Simulating(Box<ForceSimulation>),
	Done,
}

/// A single layout computation, advanced one checkpoint batch at a time.
pub struct LayoutTask {
	generation: u64,
	cancel: CancelToken,
	work: Work,
}

impl LayoutTask {
	/// Prepare a computation. Deterministic layouts are placed here and
	/// emitted as a single completed snapshot by the first [`step`](Self::step).
	pub fn new(
		generation: u64,
		cancel: CancelToken,
		graph: &CourseGraph,
		config: &LayoutConfig,
		rings: &mut RingRegistry,
		seed: &Positions,
		anchors: &Positions,
	) -> Self {
		let work = if graph.is_empty() {
			Work::Ready(Positions::new())
		} else {
			match config.kind {
				LayoutKind::Grid => Work::Ready(deterministic::grid(graph, config)),
				LayoutKind::Hierarchical => Work::Ready(deterministic::hierarchical(graph, config)),
				LayoutKind::Concentric(key) => {
					Work::Ready(deterministic::concentric(graph, config, key, rings))
				}
				LayoutKind::Force => Work::Simulating(Box::new(ForceSimulation::new(
					graph, config, seed, anchors,
				))),
			}
		};
		Self {
			generation,
			cancel,
			work,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_done(&self) -> bool {
		matches!(self.work, Work::Done)
	}

	/// Advance by one batch. `None` once finished or cancelled.
	pub fn step(&mut self) -> Option<LayoutSnapshot> {
		if self.cancel.is_cancelled() {
			if !self.is_done() {
				debug!("Layout generation {} cancelled", self.generation);
			}
			self.work = Work::Done;
			return None;
		}
		match std::mem::replace(&mut self.work, Work::Done) {
			Work::Done => None,
			Work::Ready(positions) => Some(LayoutSnapshot {
				generation: self.generation,
				positions,
				percent: 100.0,
				complete: true,
			}),
			Work::Simulating(mut sim) => {
				let batch = sim.params().batch_size();
				sim.run(batch);
				let snapshot = LayoutSnapshot {
					generation: self.generation,
					positions: sim.positions(),
					percent: sim.progress(),
					complete: sim.is_finished(),
				};
				if !snapshot.complete {
					self.work = Work::Simulating(sim);
				}
				Some(snapshot)
			}
		}
	}

	/// Drive to completion, stopping early on cancellation or a closed channel.
	pub fn run(mut self, tx: &Sender<LayoutSnapshot>) {
		while let Some(snapshot) = self.step() {
			if tx.send(snapshot).is_err() {
				break;
			}
		}
	}
}

/// Compute a layout on the calling thread, reporting every checkpoint.
pub fn compute_layout(
	graph: &CourseGraph,
	config: &LayoutConfig,
	rings: &mut RingRegistry,
	cancel: &CancelToken,
	mut on_progress: impl FnMut(&LayoutSnapshot),
) -> Result<Option<Positions>, LayoutError> {
	config.validate()?;
	let empty = Positions::new();
	let mut task = LayoutTask::new(0, cancel.clone(), graph, config, rings, &empty, &empty);
	while let Some(snapshot) = task.step() {
		on_progress(&snapshot);
		if snapshot.complete {
			return Ok(Some(snapshot.positions));
		}
	}
	Ok(None)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
	/// Each request runs on its own background thread.
	Thread,
	/// The owner calls [`LayoutScheduler::pump`] to advance the active request,
	/// e.g. once per animation frame on single-threaded targets.
	Cooperative,
}

/// Foreground side of layout computation.
///
/// Every request gets a new generation; the previous one is cancelled and
/// anything it still sends is discarded by [`LayoutScheduler::poll`].
pub struct LayoutScheduler {
	mode: DispatchMode,
	generation: u64,
	active: Option<CancelToken>,
	pending: Option<LayoutTask>,
	rings: RingRegistry,
	tx: Sender<LayoutSnapshot>,
	rx: Receiver<LayoutSnapshot>,
}

impl LayoutScheduler {
	pub fn new(mode: DispatchMode) -> Self {
		Self::with_rings(mode, RingRegistry::new())
	}

	pub fn with_rings(mode: DispatchMode, rings: RingRegistry) -> Self {
		let (tx, rx) = mpsc::channel();
		Self {
			mode,
			generation: 0,
			active: None,
			pending: None,
			rings,
			tx,
			rx,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_running(&self) -> bool {
		self.active.is_some()
	}

	/// Start a layout, superseding any in-flight one.
	///
	/// `seed` warm-starts force layouts from earlier positions; `anchors` are
	/// pinned in place. Deterministic layouts ignore both.
	pub fn request(
		&mut self,
		graph: &CourseGraph,
		config: &LayoutConfig,
		seed: &Positions,
		anchors: &Positions,
	) -> Result<u64, LayoutError> {
		if let Err(e) = config.validate() {
			warn!("Rejected layout config: {}", e);
			return Err(e);
		}
		self.cancel();
		self.generation += 1;
		let generation = self.generation;

		info!(
			"Layout generation {} dispatched: {:?} over {} nodes",
			generation,
			config.kind,
			graph.len()
		);

		let cancel = CancelToken::new();
		self.active = Some(cancel.clone());
		let task = LayoutTask::new(
			generation,
			cancel,
			graph,
			config,
			&mut self.rings,
			seed,
			anchors,
		);
		match self.mode {
			DispatchMode::Thread => {
				let tx = self.tx.clone();
				thread::spawn(move || task.run(&tx));
			}
			DispatchMode::Cooperative => self.pending = Some(task),
		}
		Ok(generation)
	}

	/// Advance the pending cooperative task by one batch.
	pub fn pump(&mut self) {
		let Some(task) = self.pending.as_mut() else {
			return;
		};
		match task.step() {
			Some(snapshot) => {
				let _ = self.tx.send(snapshot);
			}
			None => self.pending = None,
		}
		if self.pending.as_ref().is_some_and(LayoutTask::is_done) {
			self.pending = None;
		}
	}

	/// Latest snapshot of the current generation, dropping stale ones.
	/// Never blocks.
	pub fn poll(&mut self) -> Option<LayoutSnapshot> {
		let mut latest = None;
		while let Ok(snapshot) = self.rx.try_recv() {
			if snapshot.generation != self.generation {
				debug!(
					"Discarding stale layout snapshot (generation {} < {})",
					snapshot.generation, self.generation
				);
				continue;
			}
			latest = Some(snapshot);
		}
		if latest.as_ref().is_some_and(|s| s.complete) {
			self.active = None;
			info!("Layout generation {} complete", self.generation);
		}
		latest
	}

	/// Block until the current generation completes. Intended for headless use.
	pub fn wait(&mut self) -> Option<LayoutSnapshot> {
		if self.mode == DispatchMode::Cooperative {
			while self.pending.is_some() {
				self.pump();
			}
			return self.poll();
		}
		let mut latest = None;
		while self.active.is_some() {
			match self.rx.recv() {
				Ok(snapshot) if snapshot.generation == self.generation => {
					let complete = snapshot.complete;
					latest = Some(snapshot);
					if complete {
						self.active = None;
					}
				}
				Ok(_) => {}
				Err(_) => break,
			}
		}
		latest
	}

	pub fn cancel(&mut self) {
		if let Some(token) = self.active.take() {
			token.cancel();
		}
		self.pending = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{CourseRecord, build};

	fn graph(n: usize) -> CourseGraph {
		let courses: Vec<_> = (0..n)
			.map(|i| CourseRecord::new(format!("c{i}"), "CS", "100"))
			.collect();
		build(&courses, &[]).0
	}

	#[test]
	fn empty_graph_completes_immediately() {
		let mut scheduler = LayoutScheduler::new(DispatchMode::Cooperative);
		scheduler
			.request(&graph(0), &LayoutConfig::default(), &Positions::new(), &Positions::new())
			.unwrap();
		scheduler.pump();
		let snapshot = scheduler.poll().unwrap();
		assert!(snapshot.complete && snapshot.positions.is_empty());
		assert!(!scheduler.is_running());
	}

	#[test]
	fn force_layout_reports_bounded_checkpoints() {
		let mut scheduler = LayoutScheduler::new(DispatchMode::Cooperative);
		let config = LayoutConfig {
			iterations: 100,
			..LayoutConfig::default()
		};
		scheduler
			.request(&graph(12), &config, &Positions::new(), &Positions::new())
			.unwrap();
		let mut snapshots = Vec::new();
		for _ in 0..50 {
			scheduler.pump();
			if let Some(s) = scheduler.poll() {
				snapshots.push(s);
			}
		}
		assert_eq!(snapshots.len(), 10);
		assert!(snapshots.windows(2).all(|w| w[0].percent < w[1].percent));
		let last = snapshots.last().unwrap();
		assert!(last.complete);
		assert_eq!(last.percent, 100.0);
		assert_eq!(snapshots.iter().filter(|s| s.complete).count(), 1);
	}

	#[test]
	fn rejects_invalid_config_without_bumping_generation() {
		let mut scheduler = LayoutScheduler::new(DispatchMode::Cooperative);
		let bad = LayoutConfig {
			iterations: 0,
			..LayoutConfig::default()
		};
		let result = scheduler.request(&graph(3), &bad, &Positions::new(), &Positions::new());
		assert_eq!(result, Err(LayoutError::ZeroIterations));
		assert_eq!(scheduler.generation(), 0);
	}

	#[test]
	fn compute_layout_returns_final_positions() {
		let mut calls = 0;
		let config = LayoutConfig {
			iterations: 20,
			..LayoutConfig::default()
		};
		let positions = compute_layout(
			&graph(6),
			&config,
			&mut RingRegistry::new(),
			&CancelToken::new(),
			|_| calls += 1,
		)
		.unwrap()
		.unwrap();
		assert_eq!(positions.len(), 6);
		assert_eq!(calls, 10);

		let cancelled = CancelToken::new();
		cancelled.cancel();
		let result = compute_layout(&graph(6), &config, &mut RingRegistry::new(), &cancelled, |_| {});
		assert_eq!(result, Ok(None));
	}

	#[test]
	fn cancelled_task_stops_emitting() {
		let cancel = CancelToken::new();
		let g = graph(4);
		let mut task = LayoutTask::new(
			1,
			cancel.clone(),
			&g,
			&LayoutConfig::default(),
			&mut RingRegistry::new(),
			&Positions::new(),
			&Positions::new(),
		);
		assert!(task.step().is_some());
		cancel.cancel();
		assert!(task.step().is_none());
		assert!(task.is_done());
	}

	#[test]
	fn threaded_requests_apply_only_latest_generation() {
		let mut scheduler = LayoutScheduler::new(DispatchMode::Thread);
		let config = LayoutConfig {
			iterations: 200,
			..LayoutConfig::default()
		};
		let first = scheduler
			.request(&graph(30), &config, &Positions::new(), &Positions::new())
			.unwrap();
		let second = scheduler
			.request(&graph(5), &config, &Positions::new(), &Positions::new())
			.unwrap();
		assert!(second > first);
		let last = scheduler.wait().unwrap();
		assert_eq!(last.generation, second);
		assert_eq!(last.positions.len(), 5);
		assert!(scheduler.poll().is_none());
	}
}
