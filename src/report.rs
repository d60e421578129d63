//! Post-run aggregation into a single weighted scalar plus per-metric
//! breakdown, and the serializable record shapes written as JSON artifacts.

use crate::model::Instance;
use crate::state::SimState;

/// The result of one simulation run under one policy.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ScheduleResult {
    pub makespan: u64,
    pub total_tardiness: f64,
    pub total_energy: f64,
    pub avg_wip: f64,
    pub objective: f64,
    pub decision_count: u64,
}

/// Consumes the final [`SimState`] and the instance's weights; produces the
/// record above. Makespan is the latest job completion, not the clock.
pub fn evaluate(instance: &Instance, state: &SimState, finish_time: u64) -> ScheduleResult {
    let total_tardiness: f64 = instance
        .jobs
        .iter()
        .map(|j| {
            let completion = state
                .job(j.job_id)
                .completion_time
                .expect("evaluate() is only called once every job has completed");
            (completion as f64 - j.due_date as f64).max(0.0)
        })
        .sum();

    let avg_wip = state.wip_integral / finish_time.max(1) as f64;
    let w = instance.weights;
    let objective = w.makespan * finish_time as f64
        + w.tardiness * total_tardiness
        + w.energy * state.energy
        + w.wip * avg_wip;

    ScheduleResult {
        makespan: finish_time,
        total_tardiness,
        total_energy: state.energy,
        avg_wip,
        objective,
        decision_count: state.decisions,
    }
}

/// One policy's result record averaged over a set of instances, as written
/// to `policy_results.json` / `ablation.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PolicyRecord {
    pub policy: String,
    pub makespan: f64,
    pub total_tardiness: f64,
    pub total_energy: f64,
    pub avg_wip: f64,
    pub objective: f64,
    pub decision_count: f64,
}

impl PolicyRecord {
    pub fn average(label: &str, results: &[ScheduleResult]) -> Self {
        let n = results.len().max(1) as f64;
        let sum = |f: fn(&ScheduleResult) -> f64| results.iter().map(f).sum::<f64>() / n;
        Self {
            policy: label.to_string(),
            makespan: sum(|r| r.makespan as f64),
            total_tardiness: sum(|r| r.total_tardiness),
            total_energy: sum(|r| r.total_energy),
            avg_wip: sum(|r| r.avg_wip),
            objective: sum(|r| r.objective),
            decision_count: sum(|r| r.decision_count as f64),
        }
    }
}

/// `{in_distribution, cross_scale, ood_breakdown}` generalization record, as
/// written to `generalization.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeneralizationRecord {
    pub in_distribution: PolicyRecord,
    pub cross_scale: PolicyRecord,
    pub ood_breakdown: PolicyRecord,
}

/// `{policy_results, ablation, generalization}`, as written to
/// `summary.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub policy_results: Vec<PolicyRecord>,
    pub ablation: Vec<PolicyRecord>,
    pub generalization: GeneralizationRecord,
}
