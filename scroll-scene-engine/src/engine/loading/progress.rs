use bevy::prelude::*;
use constants::loading::{
    CITY_MILESTONE, COMPLETE_MILESTONE, ORBITALS_MILESTONE, PLANET_MILESTONE, WARMUP_MILESTONE,
};

use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub manifest_settled: bool,
    pub planet_requested: bool,
    pub city_requested: bool,
    pub orbitals_requested: bool,
    pub warmup_started: bool,
}

/// Load stages in order. Completing a stage reports the milestone of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Boot,
    Planet,
    City,
    Orbitals,
    Warmup,
}

impl LoadPhase {
    /// Loader percentage and status line shown once this phase completes.
    pub fn milestone(self) -> (u8, &'static str) {
        match self {
            LoadPhase::Boot => PLANET_MILESTONE,
            LoadPhase::Planet => CITY_MILESTONE,
            LoadPhase::City => ORBITALS_MILESTONE,
            LoadPhase::Orbitals => WARMUP_MILESTONE,
            LoadPhase::Warmup => COMPLETE_MILESTONE,
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCompleted(pub LoadPhase);

/// Forward phase completions to the host loader.
pub fn publish_load_milestones(
    mut phases: EventReader<PhaseCompleted>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for PhaseCompleted(phase) in phases.read() {
        let (percent, text) = phase.milestone();
        info!("→ {:?} phase complete: {}% {}", phase, percent, text);
        rpc.send_notification(
            "loading_progress",
            serde_json::json!({ "percent": percent, "text": text }),
        );
    }
}
