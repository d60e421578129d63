//! The dispatcher contract and its built-in reference implementations.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};

use crate::engine::{Action, SimView};

/// The contract a dispatcher implements: given a read-only view of the
/// simulator and a non-empty list of legal actions, return exactly one.
/// Policies may hold their own RNG or hyperparameters but must not retain
/// the view across calls.
pub trait Policy {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action;

    /// Label used in result records and CLI output.
    fn name(&self) -> &str;
}

fn op_proc_time(view: &SimView, action: Action) -> u64 {
    view.instance.jobs[action.job_id.0].operations[action.op_idx].proc_time
}

fn remaining_work(view: &SimView, action: Action) -> u64 {
    let job = &view.instance.jobs[action.job_id.0];
    job.remaining_work(view.job_next_op_idx(action.job_id))
}

/// Lexicographic minimum of (job_id, op_idx, machine_id).
pub struct Fifo;

impl Policy for Fifo {
    fn select_action(&mut self, _view: &SimView, actions: &[Action]) -> Action {
        *actions
            .iter()
            .min_by_key(|a| (a.job_id, a.op_idx, a.machine_id))
            .expect("actions must be non-empty")
    }

    fn name(&self) -> &str {
        "FIFO"
    }
}

/// Minimum processing time of the operation; ties broken by first
/// encountered, matching the order `ready_actions()` produced them in.
pub struct Spt;

impl Policy for Spt {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action {
        let mut best = actions[0];
        let mut best_p = op_proc_time(view, best);
        for &a in &actions[1..] {
            let p = op_proc_time(view, a);
            if p < best_p {
                best = a;
                best_p = p;
            }
        }
        best
    }

    fn name(&self) -> &str {
        "SPT"
    }
}

/// Maximum processing time of the operation.
pub struct Lpt;

impl Policy for Lpt {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action {
        let mut best = actions[0];
        let mut best_p = op_proc_time(view, best);
        for &a in &actions[1..] {
            let p = op_proc_time(view, a);
            if p > best_p {
                best = a;
                best_p = p;
            }
        }
        best
    }

    fn name(&self) -> &str {
        "LPT"
    }
}

/// Maximum remaining work on the action's job.
pub struct Mwkr;

impl Policy for Mwkr {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action {
        let mut best = actions[0];
        let mut best_w = remaining_work(view, best);
        for &a in &actions[1..] {
            let w = remaining_work(view, a);
            if w > best_w {
                best = a;
                best_w = w;
            }
        }
        best
    }

    fn name(&self) -> &str {
        "MWKR"
    }
}

/// Apparent Tardiness Cost: maximizes
/// `(1/max(1,p)) * exp(-slack / max(1, 2*mean_p))`, where `mean_p` is the
/// mean processing time over the actions presented in this call (not the
/// instance-global mean), matching the source this spec was distilled from.
pub struct Atc;

impl Policy for Atc {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action {
        let mean_p = actions.iter().map(|&a| op_proc_time(view, a) as f64).sum::<f64>()
            / actions.len().max(1) as f64;

        let score = |a: Action| -> f64 {
            let job = &view.instance.jobs[a.job_id.0];
            let op = &job.operations[a.op_idx];
            let p = op.proc_time as f64;
            let slack = (job.due_date as f64 - view.t() as f64 - p).max(0.0);
            (1.0 / p.max(1.0)) * (-slack / (2.0 * mean_p).max(1.0)).exp()
        };

        let mut best = actions[0];
        let mut best_score = score(best);
        for &a in &actions[1..] {
            let s = score(a);
            if s > best_score {
                best = a;
                best_score = s;
            }
        }
        best
    }

    fn name(&self) -> &str {
        "ATC"
    }
}

/// Uniform choice from the action list, using a seeded RNG independent of
/// the simulator's breakdown RNG.
pub struct Random {
    rng: rand::rngs::StdRng,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for Random {
    fn select_action(&mut self, _view: &SimView, actions: &[Action]) -> Action {
        let idx = self.rng.gen_range(0..actions.len());
        actions[idx]
    }

    fn name(&self) -> &str {
        "Random"
    }
}

/// Per-action feature vector for the feature-weighted policy.
#[derive(Debug, Clone, Copy)]
struct Features {
    proc: f64,
    mwkr: f64,
    slack: f64,
    energy: f64,
    avail: f64,
}

fn features(view: &SimView, action: Action) -> Features {
    let job = &view.instance.jobs[action.job_id.0];
    let op = &job.operations[action.op_idx];
    let remaining = job.remaining_work(action.op_idx) as f64;
    let slack = job.due_date as f64 - view.t() as f64 - remaining;
    let avail = view.machine_busy_until(action.machine_id) as f64 - view.t() as f64;
    let machine_energy = view.instance.machines[action.machine_id.0].energy_rate;
    Features {
        proc: op.proc_time as f64,
        mwkr: remaining,
        slack,
        energy: op.energy_rate + machine_energy,
        avail,
    }
}

/// Configuration for [`G4dqnPolicy`], matching the external policy
/// contract: `top_k`, `use_candidate_set`, `use_multi_objective`,
/// `use_action_mask` (accepted but never consulted — `ready_actions()`
/// already filters illegal actions), and `warm_start`.
#[derive(Debug, Clone, Copy)]
pub struct G4dqnConfig {
    pub top_k: usize,
    pub use_candidate_set: bool,
    pub use_multi_objective: bool,
    pub use_action_mask: bool,
    pub warm_start: bool,
}

impl Default for G4dqnConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            use_candidate_set: true,
            use_multi_objective: true,
            use_action_mask: true,
            warm_start: true,
        }
    }
}

/// Feature-weighted dispatcher ("G4DQN" in the external policy contract).
/// Scores each candidate action as a linear combination of its feature
/// vector, optionally restricts to a top-K candidate set by score, then
/// picks the maximum.
pub struct G4dqnPolicy {
    config: G4dqnConfig,
    weights: HashMap<&'static str, f64>,
}

impl G4dqnPolicy {
    pub fn new(config: G4dqnConfig) -> Self {
        let mut weights: HashMap<&'static str, f64> = [
            ("proc", -0.6),
            ("mwkr", 0.8),
            ("slack", -0.5),
            ("energy", -0.3),
            ("avail", -0.2),
        ]
        .into_iter()
        .collect();
        if config.warm_start {
            weights.insert("proc", -0.55);
            weights.insert("mwkr", 0.9);
            weights.insert("slack", -0.7);
        }
        Self { config, weights }
    }

    fn score(&self, f: Features) -> f64 {
        self.weights["proc"] * f.proc
            + self.weights["mwkr"] * f.mwkr
            + self.weights["slack"] * f.slack
            + self.weights["energy"] * f.energy
            + self.weights["avail"] * f.avail
    }

    fn candidate_actions(&self, view: &SimView, actions: &[Action]) -> Vec<Action> {
        let mut ranked: Vec<Action> = actions.to_vec();
        ranked.sort_by(|&a, &b| {
            self.score(features(view, b))
                .partial_cmp(&self.score(features(view, a)))
                .unwrap()
        });
        if !self.config.use_candidate_set {
            return ranked;
        }
        let k = self.config.top_k.min(ranked.len());
        ranked.truncate(k);
        ranked
    }
}

impl Policy for G4dqnPolicy {
    fn select_action(&mut self, view: &SimView, actions: &[Action]) -> Action {
        let _ = self.config.use_action_mask; // reserved, never consulted
        let candidates = self.candidate_actions(view, actions);
        if !self.config.use_multi_objective {
            return *candidates
                .iter()
                .min_by(|&&a, &&b| {
                    op_proc_time(view, a).cmp(&op_proc_time(view, b))
                })
                .unwrap();
        }
        *candidates
            .iter()
            .max_by(|&&a, &&b| {
                self.score(features(view, a))
                    .partial_cmp(&self.score(features(view, b)))
                    .unwrap()
            })
            .unwrap()
    }

    fn name(&self) -> &str {
        "G4DQN"
    }
}
