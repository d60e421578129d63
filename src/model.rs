//! Immutable problem instance: jobs, operations, machines, maintenance,
//! setups, and objective weights. Nothing in this module is mutated once a
//! [`Instance`] is constructed; the event engine owns all mutable run state.

use std::collections::HashMap;

use crate::error::{Result, SimError};

/// Identifies a job within an [`Instance`]. Dense from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct JobId(pub usize);

/// Identifies a machine within an [`Instance`]. Dense from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct MachineId(pub usize);

/// A single operation of a job. Immutable after construction; `op_idx` is
/// dense from 0 within its owning job.
#[derive(Debug, Clone)]
pub struct Operation {
    pub job_id: JobId,
    pub op_idx: usize,
    pub proc_time: u64,
    pub candidate_machines: Vec<MachineId>,
    pub energy_rate: f64,
    /// Reserved; never consulted by scheduling.
    pub batch_group: Option<usize>,
}

/// An ordered sequence of operations that must execute in index order on
/// the job's own timeline, with a due date.
#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: JobId,
    pub operations: Vec<Operation>,
    pub due_date: u64,
}

impl Job {
    pub fn remaining_work(&self, from_idx: usize) -> u64 {
        self.operations[from_idx..].iter().map(|op| op.proc_time).sum()
    }
}

/// A half-open interval `[start, end)` on a machine's timeline during which
/// no processing may occur.
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceWindow {
    pub start: u64,
    pub end: u64,
}

/// A machine's immutable properties. Mutable run state (`busy_until`,
/// `last_job_id`) lives in [`crate::state::SimState`], not here.
#[derive(Debug, Clone)]
pub struct Machine {
    pub machine_id: MachineId,
    pub energy_rate: f64,
    /// Sorted ascending by `start` at construction time, regardless of
    /// input order, so [`crate::engine`] can scan once.
    pub maintenance: Vec<MaintenanceWindow>,
    pub breakdown_prob: f64,
}

/// Maps `(previous_job_or_none, next_job, machine) -> setup_time`. Absent
/// entries default to 0, matching the generator's guarantee of full
/// coverage but tolerating hand-built instances that omit the diagonal.
#[derive(Debug, Clone, Default)]
pub struct SetupTable {
    entries: HashMap<(Option<JobId>, JobId, MachineId), u64>,
}

impl SetupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prev: Option<JobId>, next: JobId, machine: MachineId, setup: u64) {
        self.entries.insert((prev, next, machine), setup);
    }

    pub fn get(&self, prev: Option<JobId>, next: JobId, machine: MachineId) -> u64 {
        if prev == Some(next) {
            return 0;
        }
        self.entries.get(&(prev, next, machine)).copied().unwrap_or(0)
    }
}

/// The four non-negative scalars combining into the final objective.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Weights {
    pub makespan: f64,
    pub tardiness: f64,
    pub energy: f64,
    pub wip: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            makespan: 1.0,
            tardiness: 0.7,
            energy: 0.15,
            wip: 0.4,
        }
    }
}

/// The immutable tuple `(jobs, machines, setup table, weights)`.
#[derive(Debug, Clone)]
pub struct Instance {
    pub jobs: Vec<Job>,
    pub machines: Vec<Machine>,
    pub setup_times: SetupTable,
    pub weights: Weights,
}

impl Instance {
    /// Validates and constructs an instance, sorting maintenance windows by
    /// `start` so the event engine can scan them once. Fails fast on any
    /// malformed entity (empty operations, empty candidate set, negative
    /// times, non-positive due date), and on `job_id`/`machine_id` values
    /// that are not dense from 0, since the rest of the crate indexes
    /// `instance.jobs`/`instance.machines` directly by raw id.
    pub fn new(
        mut jobs: Vec<Job>,
        mut machines: Vec<Machine>,
        setup_times: SetupTable,
        weights: Weights,
    ) -> Result<Self> {
        for job in &jobs {
            if job.operations.is_empty() {
                return Err(SimError::MalformedInstance(format!(
                    "job {:?} has no operations",
                    job.job_id
                )));
            }
            if job.due_date == 0 {
                return Err(SimError::MalformedInstance(format!(
                    "job {:?} has non-positive due date",
                    job.job_id
                )));
            }
            for (idx, op) in job.operations.iter().enumerate() {
                if op.op_idx != idx {
                    return Err(SimError::MalformedInstance(format!(
                        "job {:?} op at position {} has op_idx {}, expected dense index",
                        job.job_id, idx, op.op_idx
                    )));
                }
                if op.proc_time == 0 {
                    return Err(SimError::MalformedInstance(format!(
                        "job {:?} op {} has non-positive processing time",
                        job.job_id, op.op_idx
                    )));
                }
                if op.candidate_machines.is_empty() {
                    return Err(SimError::MalformedInstance(format!(
                        "job {:?} op {} has an empty candidate machine set",
                        job.job_id, op.op_idx
                    )));
                }
                if op.energy_rate <= 0.0 {
                    return Err(SimError::MalformedInstance(format!(
                        "job {:?} op {} has non-positive energy rate",
                        job.job_id, op.op_idx
                    )));
                }
            }
        }

        for machine in &mut machines {
            if machine.energy_rate <= 0.0 {
                return Err(SimError::MalformedInstance(format!(
                    "machine {:?} has non-positive energy rate",
                    machine.machine_id
                )));
            }
            if !(0.0..=1.0).contains(&machine.breakdown_prob) {
                return Err(SimError::MalformedInstance(format!(
                    "machine {:?} has breakdown probability outside [0,1]",
                    machine.machine_id
                )));
            }
            for w in &machine.maintenance {
                if w.end <= w.start {
                    return Err(SimError::MalformedInstance(format!(
                        "machine {:?} has a maintenance window with end <= start",
                        machine.machine_id
                    )));
                }
            }
            machine.maintenance.sort_by_key(|w| w.start);
        }

        jobs.sort_by_key(|j| j.job_id);
        machines.sort_by_key(|m| m.machine_id);

        for (idx, job) in jobs.iter().enumerate() {
            if job.job_id.0 != idx {
                return Err(SimError::MalformedInstance(format!(
                    "job ids are not dense from 0: position {} has id {:?}",
                    idx, job.job_id
                )));
            }
        }
        for (idx, machine) in machines.iter().enumerate() {
            if machine.machine_id.0 != idx {
                return Err(SimError::MalformedInstance(format!(
                    "machine ids are not dense from 0: position {} has id {:?}",
                    idx, machine.machine_id
                )));
            }
        }

        Ok(Self {
            jobs,
            machines,
            setup_times,
            weights,
        })
    }
}
