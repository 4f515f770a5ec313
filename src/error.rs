use thiserror::Error;

/// Errors surfaced by the layout engine and the surrounding I/O.
///
/// Layout failures are never fatal to an editing session: the engine
/// catches them at the scheduling boundary, warns, and keeps the previous
/// frame's geometry.
#[derive(Debug, Error)]
pub enum FishboneError {
    /// A label could not be measured yet. The pass is deferred, not failed;
    /// callers keep whatever layout they already have.
    #[error("label for cause '{cause_id}' is not yet measurable")]
    MeasurementPending { cause_id: String },

    #[error("diagram JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FishboneError {
    /// Deferred passes are expected during interactive editing and are not
    /// reported as warnings.
    pub fn is_deferral(&self) -> bool {
        matches!(self, FishboneError::MeasurementPending { .. })
    }
}
