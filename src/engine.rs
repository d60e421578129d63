//! Time advancement, ready-action enumeration, dispatch application, and
//! termination detection: the state machine that drives one simulation run.

use rand::{Rng, SeedableRng};

use crate::error::{Result, SimError};
use crate::model::{Instance, JobId, MachineId};
use crate::policy::Policy;
use crate::report::ScheduleResult;
use crate::state::SimState;

/// A legal dispatch: which job's next operation runs on which machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub job_id: JobId,
    pub op_idx: usize,
    pub machine_id: MachineId,
}

/// Read-only view of the simulator handed to a [`Policy`]. Policies must
/// not retain this across dispatches; it borrows the live run state.
pub struct SimView<'a> {
    pub instance: &'a Instance,
    pub state: &'a SimState,
}

impl<'a> SimView<'a> {
    pub fn t(&self) -> u64 {
        self.state.t
    }

    pub fn job_next_op_idx(&self, job_id: JobId) -> usize {
        self.state.job(job_id).next_op_idx
    }

    pub fn job_ready_time(&self, job_id: JobId) -> u64 {
        self.state.job(job_id).ready_time
    }

    pub fn machine_busy_until(&self, machine_id: MachineId) -> u64 {
        self.state.machine(machine_id).busy_until
    }

    pub fn machine_last_job(&self, machine_id: MachineId) -> Option<JobId> {
        self.state.machine(machine_id).last_job_id
    }
}

/// Owns one run: the immutable instance (by reference), the mutable state,
/// and the breakdown RNG stream. Construct with [`Simulator::new`] and
/// drive with [`Simulator::run_with_policy`].
pub struct Simulator<'a> {
    instance: &'a Instance,
    state: SimState,
    breakdown_rng: rand::rngs::StdRng,
}

impl<'a> Simulator<'a> {
    pub fn new(instance: &'a Instance, seed: u64) -> Self {
        Self {
            instance,
            state: SimState::new(instance),
            breakdown_rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn view(&self) -> SimView<'_> {
        SimView {
            instance: self.instance,
            state: &self.state,
        }
    }

    /// True iff every job's `next_op_idx` equals its operations length.
    pub fn done(&self) -> bool {
        self.instance
            .jobs
            .iter()
            .all(|j| self.state.job(j.job_id).next_op_idx >= j.operations.len())
    }

    /// Legal actions at the current clock, unordered.
    pub fn ready_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        for job in &self.instance.jobs {
            let progress = self.state.job(job.job_id);
            if progress.next_op_idx >= job.operations.len() {
                continue;
            }
            if progress.ready_time > self.state.t {
                continue;
            }
            let op = &job.operations[progress.next_op_idx];
            for &machine_id in &op.candidate_machines {
                if self.state.machine(machine_id).busy_until <= self.state.t {
                    actions.push(Action {
                        job_id: job.job_id,
                        op_idx: progress.next_op_idx,
                        machine_id,
                    });
                }
            }
        }
        actions
    }

    /// If `ready_actions()` is empty and not done, jump the clock to the
    /// next future event time, integrating WIP up to that point first.
    /// No-op if no future event exists (should only occur when done).
    pub fn advance_time(&mut self) -> Result<()> {
        let mut next = None;
        for m in self.state.machines.values() {
            if m.busy_until > self.state.t {
                next = Some(next.map_or(m.busy_until, |v: u64| v.min(m.busy_until)));
            }
        }
        for j in self.state.jobs.values() {
            if j.ready_time > self.state.t {
                next = Some(next.map_or(j.ready_time, |v: u64| v.min(j.ready_time)));
            }
        }
        match next {
            Some(next_t) => {
                log::trace!("A {} -> {}", self.state.t, next_t);
                self.state.accumulate_wip(self.instance, next_t);
                self.state.t = next_t;
                Ok(())
            }
            None => {
                if self.done() {
                    Ok(())
                } else {
                    log::debug!("X {} no ready actions and no future event", self.state.t);
                    Err(SimError::Deadlock { t: self.state.t })
                }
            }
        }
    }

    /// The smallest `s' >= s` such that `[s', s'+d)` does not intersect any
    /// maintenance window on `machine_id`. Windows are sorted by `start` at
    /// instance construction; this scans to a fixed point so it is correct
    /// even if a future generator emits multiple, non-overlapping windows
    /// per machine.
    fn maintenance_adjust(&self, machine_id: MachineId, start: u64, duration: u64) -> u64 {
        let machine = &self.instance.machines[machine_id.0];
        let mut s = start;
        loop {
            let mut advanced = false;
            for w in &machine.maintenance {
                if s < w.end && s + duration > w.start {
                    s = w.end;
                    advanced = true;
                }
            }
            if !advanced {
                return s;
            }
        }
    }

    /// Apply a dispatch chosen by a policy. Must be a legal action from the
    /// current `ready_actions()`; in debug builds this is checked and an
    /// illegal action fails the run rather than being silently repaired.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        #[cfg(debug_assertions)]
        {
            if !self.ready_actions().contains(&action) {
                return Err(SimError::IllegalAction {
                    job_id: action.job_id,
                    op_idx: action.op_idx,
                    machine_id: action.machine_id,
                });
            }
        }

        let job = &self.instance.jobs[action.job_id.0];
        let op = &job.operations[action.op_idx];
        let machine = &self.instance.machines[action.machine_id.0];

        let job_progress = *self.state.job(action.job_id);
        let machine_progress = *self.state.machine(action.machine_id);

        let base = self
            .state
            .t
            .max(machine_progress.busy_until)
            .max(job_progress.ready_time);
        let setup = self.instance.setup_times.get(
            machine_progress.last_job_id,
            action.job_id,
            action.machine_id,
        );
        let start = self.maintenance_adjust(action.machine_id, base + setup, op.proc_time);

        let u: f64 = self.breakdown_rng.gen_range(0.0..1.0);
        let duration = if u < machine.breakdown_prob {
            let extra = self
                .breakdown_rng
                .gen_range(1..=(op.proc_time / 3).max(2));
            op.proc_time + extra
        } else {
            op.proc_time
        };

        let end = start + duration;

        let machine_entry = self.state.machines.get_mut(&action.machine_id).unwrap();
        machine_entry.busy_until = end;
        machine_entry.last_job_id = Some(action.job_id);

        let job_entry = self.state.jobs.get_mut(&action.job_id).unwrap();
        job_entry.ready_time = end;
        job_entry.next_op_idx += 1;
        if job_entry.next_op_idx >= job.operations.len() {
            job_entry.completion_time = Some(end);
        }

        self.state.energy += duration as f64 * (machine.energy_rate + op.energy_rate);
        self.state.decisions += 1;

        log::debug!(
            "D {} job {} op {} machine {} start {} end {}",
            self.state.t,
            action.job_id.0,
            action.op_idx,
            action.machine_id.0,
            start,
            end
        );

        Ok(())
    }

    /// Drive the simulation to completion under `policy`, returning the
    /// final multi-objective score.
    pub fn run_with_policy(&mut self, policy: &mut dyn Policy) -> Result<ScheduleResult> {
        while !self.done() {
            let actions = self.ready_actions();
            if actions.is_empty() {
                self.advance_time()?;
                continue;
            }
            let action = policy.select_action(&self.view(), &actions);
            self.dispatch(action)?;
        }

        let finish_time = self
            .instance
            .jobs
            .iter()
            .filter_map(|j| self.state.job(j.job_id).completion_time)
            .max()
            .unwrap_or(self.state.t);
        self.state.accumulate_wip(self.instance, finish_time);
        log::debug!(
            "E {} policy {} decisions {}",
            finish_time,
            policy.name(),
            self.state.decisions
        );

        Ok(crate::report::evaluate(self.instance, &self.state, finish_time))
    }
}
