use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::loading::WARMUP_SAMPLES;

use super::driver::ChoreographyFrame;
use crate::engine::core::app_state::AppState;
use crate::engine::loading::progress::{LoadPhase, PhaseCompleted};
use crate::engine::scene::camera::SceneCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarmupStep {
    /// Mark every mesh as unculled so off-screen sub-scenes still get pipelines built.
    DisableCulling,
    /// Drive the scene at this progress and let one frame render.
    Render(f32),
    /// Remove the culling overrides added by `DisableCulling`.
    RestoreCulling,
    /// Drive the scene back to the start and let one frame render.
    Reset,
    Finish,
}

impl WarmupStep {
    fn consumes_frame(self) -> bool {
        matches!(self, WarmupStep::Render(_) | WarmupStep::Reset)
    }
}

/// Step plan for the one-shot warmup. Each call to [`WarmupSequencer::next_frame`]
/// yields the steps to execute before the next rendered frame.
#[derive(Resource, Debug, Clone)]
pub struct WarmupSequencer {
    plan: Vec<WarmupStep>,
    cursor: usize,
}

impl Default for WarmupSequencer {
    fn default() -> Self {
        let mut plan = vec![WarmupStep::DisableCulling];
        plan.extend(WARMUP_SAMPLES.iter().map(|&progress| WarmupStep::Render(progress)));
        plan.extend([
            WarmupStep::RestoreCulling,
            WarmupStep::Reset,
            WarmupStep::Finish,
        ]);
        Self { plan, cursor: 0 }
    }
}

impl WarmupSequencer {
    pub fn plan(&self) -> &[WarmupStep] {
        &self.plan
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.plan.len()
    }

    pub fn next_frame(&mut self) -> Vec<WarmupStep> {
        let mut steps = Vec::new();
        while let Some(&step) = self.plan.get(self.cursor) {
            self.cursor += 1;
            steps.push(step);
            if step.consumes_frame() {
                break;
            }
        }
        steps
    }

    /// Drop the remaining render passes but keep the restore/reset tail.
    pub fn skip_to_restore(&mut self) {
        while let Some(&step) = self.plan.get(self.cursor) {
            if step == WarmupStep::RestoreCulling {
                break;
            }
            self.cursor += 1;
        }
    }
}

/// Added next to every `NoFrustumCulling` inserted by the warmup, so only those are removed again.
#[derive(Component, Debug, Default)]
pub struct WarmupCullingOverride;

#[allow(clippy::too_many_arguments)]
pub fn run_warmup(
    mut commands: Commands,
    mut sequencer: ResMut<WarmupSequencer>,
    mut frame: ResMut<ChoreographyFrame>,
    cameras: Query<(), With<SceneCamera>>,
    culled_meshes: Query<Entity, (With<Mesh3d>, Without<NoFrustumCulling>)>,
    overridden: Query<Entity, With<WarmupCullingOverride>>,
    mut phases: EventWriter<PhaseCompleted>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    // The driver samples scroll input first; warmup frames overwrite it.
    let mut steps = sequencer.next_frame();
    let mut index = 0;

    while index < steps.len() {
        match steps[index] {
            WarmupStep::DisableCulling => {
                if cameras.is_empty() {
                    warn!("Warmup: no scene camera, skipping pre-render passes");
                    sequencer.skip_to_restore();
                    steps.truncate(index + 1);
                    steps.extend(sequencer.next_frame());
                } else {
                    let mut count = 0;
                    for entity in &culled_meshes {
                        commands
                            .entity(entity)
                            .insert((NoFrustumCulling, WarmupCullingOverride));
                        count += 1;
                    }
                    debug!("Warmup: culling disabled on {} meshes", count);
                }
            }
            WarmupStep::Render(progress) => frame.begin_warmup(progress),
            WarmupStep::RestoreCulling => {
                for entity in &overridden {
                    commands
                        .entity(entity)
                        .remove::<(NoFrustumCulling, WarmupCullingOverride)>();
                }
            }
            WarmupStep::Reset => frame.begin_warmup(0.0),
            WarmupStep::Finish => {
                frame.end_warmup();
                info!("Warmup complete");
                phases.write(PhaseCompleted(LoadPhase::Warmup));
                next_state.set(AppState::Running);
            }
        }
        index += 1;
    }
}
