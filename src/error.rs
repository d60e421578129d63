use crate::model::{JobId, MachineId};

/// Errors surfaced by instance construction, simulation, and artifact I/O.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("malformed instance: {0}")]
    MalformedInstance(String),

    #[error("illegal action from policy: job {job_id:?} op {op_idx} machine {machine_id:?} is not in ready_actions()")]
    IllegalAction {
        job_id: JobId,
        op_idx: usize,
        machine_id: MachineId,
    },

    #[error("deadlock suspected at t={t}: no ready actions and no future event")]
    Deadlock { t: u64 },

    #[error("I/O error writing artifacts")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
