//! Deterministic random construction of problem instances from scalar
//! parameters and a seed. All draws come from a single seeded generator,
//! consumed in the order specified here, so identical seed + parameters
//! yield bit-identical instances across implementations.

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::model::{Instance, Job, MachineId, Machine, MaintenanceWindow, Operation, SetupTable, Weights, JobId};

/// Scalar parameters controlling instance shape.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorParams {
    pub num_jobs: usize,
    pub num_machines: usize,
    pub reentry_prob: f64,
    pub hotspot_intensity: f64,
    pub setup_variance: f64,
    pub breakdown_freq: f64,
    pub due_tightness: f64,
    pub seed: u64,
}

/// Builds an [`Instance`] per the six construction rules of the
/// specification, in their specified draw order.
pub fn generate_instance(params: GeneratorParams) -> Result<Instance> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(params.seed);

    // 1. Hotspot machines: sample without replacement.
    let hotspot_count = (params.num_machines as f64 * params.hotspot_intensity)
        .floor()
        .max(1.0) as usize;
    let hotspot_machines: std::collections::HashSet<usize> =
        (0..params.num_machines).choose_multiple(&mut rng, hotspot_count.min(params.num_machines))
            .into_iter()
            .collect();

    // 2. Machines: maintenance window, energy rate, breakdown probability.
    let mut machines = Vec::with_capacity(params.num_machines);
    for m in 0..params.num_machines {
        let is_hotspot = hotspot_machines.contains(&m);
        let mut maintenance = Vec::new();
        if rng.gen_range(0.0..1.0) < 0.6 {
            let start = rng.gen_range(20..=80);
            let length = rng.gen_range(5..=15);
            maintenance.push(MaintenanceWindow {
                start,
                end: start + length,
            });
        }
        let base_rate = rng.gen_range(0.8..2.0);
        let energy_rate = base_rate * if is_hotspot { 1.2 } else { 1.0 };
        let breakdown_prob = (params.breakdown_freq + if is_hotspot { 0.02 } else { 0.0 }).max(0.0);
        machines.push(Machine {
            machine_id: MachineId(m),
            energy_rate,
            maintenance,
            breakdown_prob,
        });
    }

    // 3. Jobs and operations.
    let mut jobs = Vec::with_capacity(params.num_jobs);
    for j in 0..params.num_jobs {
        let base_ops: u64 = rng.gen_range(4..=8);
        let extra: u64 = if rng.gen_range(0.0..1.0) < params.reentry_prob { 1 } else { 0 };
        let op_count = (base_ops + extra) as usize;

        let mut ops = Vec::with_capacity(op_count);
        let mut used_groups: Vec<Vec<MachineId>> = Vec::new();
        for idx in 0..op_count {
            let cands = if idx > 1
                && rng.gen_range(0.0..1.0) < params.reentry_prob
                && !used_groups.is_empty()
            {
                used_groups.choose(&mut rng).unwrap().clone()
            } else {
                let group_size = params
                    .num_machines
                    .min(rng.gen_range(1..=(params.num_machines / 2).max(2)));
                let mut cands: Vec<MachineId> = (0..params.num_machines)
                    .choose_multiple(&mut rng, group_size)
                    .into_iter()
                    .map(MachineId)
                    .collect();
                cands.sort();
                used_groups.push(cands.clone());
                cands
            };
            let proc_time = rng.gen_range(2..=15);
            let energy_rate = rng.gen_range(0.3..1.2);
            ops.push(Operation {
                job_id: JobId(j),
                op_idx: idx,
                proc_time,
                candidate_machines: cands,
                energy_rate,
                batch_group: None,
            });
        }

        // 4. Due date.
        let nominal: u64 = ops.iter().map(|op| op.proc_time).sum();
        let due_date =
            (nominal as f64 * rng.gen_range(1.2..2.2) * params.due_tightness).floor() as u64;

        jobs.push(Job {
            job_id: JobId(j),
            operations: ops,
            due_date,
        });
    }

    // 5. Setup table.
    let mut setup_times = SetupTable::new();
    let spread = (5.0 * params.setup_variance).floor().max(1.0) as u64;
    for m in 0..params.num_machines {
        let machine_id = MachineId(m);
        for prev in std::iter::once(None).chain((0..params.num_jobs).map(|p| Some(JobId(p)))) {
            for next in 0..params.num_jobs {
                let next_id = JobId(next);
                let setup = if prev == Some(next_id) {
                    0
                } else {
                    rng.gen_range(0..=spread)
                };
                setup_times.insert(prev, next_id, machine_id, setup);
            }
        }
    }

    // 6. Weights: fixed.
    let weights = Weights::default();

    Instance::new(jobs, machines, setup_times, weights)
}
