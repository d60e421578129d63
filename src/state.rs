//! Mutable per-run state: clock, per-job progress, per-machine
//! availability, WIP integral, energy, decision count. Owned exclusively by
//! one simulation run and mutated only by [`crate::engine`].

use std::collections::HashMap;

use crate::model::{Instance, JobId, MachineId};

#[derive(Debug, Clone, Copy, Default)]
pub struct JobProgress {
    pub next_op_idx: usize,
    pub ready_time: u64,
    pub completion_time: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MachineProgress {
    pub busy_until: u64,
    pub last_job_id: Option<JobId>,
}

#[derive(Debug)]
pub struct SimState {
    pub t: u64,
    pub jobs: HashMap<JobId, JobProgress>,
    pub machines: HashMap<MachineId, MachineProgress>,
    pub energy: f64,
    pub wip_integral: f64,
    pub wip_last_t: u64,
    pub decisions: u64,
}

impl SimState {
    pub fn new(instance: &Instance) -> Self {
        let jobs = instance
            .jobs
            .iter()
            .map(|j| (j.job_id, JobProgress::default()))
            .collect();
        let machines = instance
            .machines
            .iter()
            .map(|m| (m.machine_id, MachineProgress::default()))
            .collect();
        Self {
            t: 0,
            jobs,
            machines,
            energy: 0.0,
            wip_integral: 0.0,
            wip_last_t: 0,
            decisions: 0,
        }
    }

    /// Number of jobs with at least one remaining operation.
    pub fn current_wip(&self, instance: &Instance) -> u64 {
        instance
            .jobs
            .iter()
            .filter(|j| self.jobs[&j.job_id].next_op_idx < j.operations.len())
            .count() as u64
    }

    /// Integrate WIP forward to `new_t`, advancing the watermark. No-op if
    /// `new_t <= wip_last_t` (callers only invoke this moving forward).
    pub fn accumulate_wip(&mut self, instance: &Instance, new_t: u64) {
        if new_t <= self.wip_last_t {
            return;
        }
        let wip = self.current_wip(instance);
        self.wip_integral += wip as f64 * (new_t - self.wip_last_t) as f64;
        self.wip_last_t = new_t;
    }

    pub fn job(&self, id: JobId) -> &JobProgress {
        &self.jobs[&id]
    }

    pub fn machine(&self, id: MachineId) -> &MachineProgress {
        &self.machines[&id]
    }
}
