use bevy::prelude::*;

use super::progress::{LoadPhase, LoadingProgress, PhaseCompleted};
use crate::engine::choreography::visibility::SubScene;
use crate::engine::core::app_state::AppState;
use crate::engine::scene::SpawnSubScene;
use crate::engine::scene::cards::CardDeck;
use crate::engine::scene::city::CityScene;
use crate::engine::scene::debris::Starfield;
use crate::engine::scene::planet::PlanetScene;
use crate::engine::scene::satellites::SatelliteFleet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    SpawnPlanet,
    SpawnCity,
    SpawnOrbitals,
    BeginWarmup,
}

/// Which stages have settled, i.e. finished loading or failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettledStages {
    pub manifest: bool,
    pub planet: bool,
    pub city: bool,
    pub orbitals: bool,
}

/// Next step of the chain, or `None` while the current stage is still loading.
pub fn next_load_action(progress: &LoadingProgress, settled: SettledStages) -> Option<LoadAction> {
    if !settled.manifest {
        None
    } else if !progress.planet_requested {
        Some(LoadAction::SpawnPlanet)
    } else if !progress.city_requested {
        settled.planet.then_some(LoadAction::SpawnCity)
    } else if !progress.orbitals_requested {
        settled.city.then_some(LoadAction::SpawnOrbitals)
    } else if !progress.warmup_started {
        settled.orbitals.then_some(LoadAction::BeginWarmup)
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
pub fn advance_load_chain(
    mut progress: ResMut<LoadingProgress>,
    planet: Res<PlanetScene>,
    city: Res<CityScene>,
    satellites: Res<SatelliteFleet>,
    starfield: Res<Starfield>,
    cards: Res<CardDeck>,
    mut spawns: EventWriter<SpawnSubScene>,
    mut phases: EventWriter<PhaseCompleted>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let settled = SettledStages {
        manifest: progress.manifest_settled,
        planet: planet.handle.is_settled(),
        city: city.handle.is_settled(),
        orbitals: satellites.handle.is_settled()
            && starfield.handle.is_settled()
            && cards.handle.is_settled(),
    };

    let Some(action) = next_load_action(&progress, settled) else {
        return;
    };

    match action {
        LoadAction::SpawnPlanet => {
            progress.planet_requested = true;
            phases.write(PhaseCompleted(LoadPhase::Boot));
            spawns.write(SpawnSubScene(SubScene::Planet));
        }
        LoadAction::SpawnCity => {
            progress.city_requested = true;
            phases.write(PhaseCompleted(LoadPhase::Planet));
            spawns.write(SpawnSubScene(SubScene::City));
        }
        LoadAction::SpawnOrbitals => {
            progress.orbitals_requested = true;
            phases.write(PhaseCompleted(LoadPhase::City));
            spawns.write_batch([
                SpawnSubScene(SubScene::Satellites),
                SpawnSubScene(SubScene::Debris),
                SpawnSubScene(SubScene::Cards),
            ]);
        }
        LoadAction::BeginWarmup => {
            progress.warmup_started = true;
            phases.write(PhaseCompleted(LoadPhase::Orbitals));
            info!("→ All sub-scenes settled, starting warmup");
            next_state.set(AppState::Warmup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_starts_before_the_manifest_settles() {
        let progress = LoadingProgress::default();
        assert_eq!(next_load_action(&progress, SettledStages::default()), None);
    }

    #[test]
    fn stages_run_in_order_once_each_settles() {
        let mut progress = LoadingProgress::default();
        let mut settled = SettledStages {
            manifest: true,
            ..default()
        };

        assert_eq!(
            next_load_action(&progress, settled),
            Some(LoadAction::SpawnPlanet)
        );
        progress.planet_requested = true;
        assert_eq!(next_load_action(&progress, settled), None);

        settled.planet = true;
        assert_eq!(
            next_load_action(&progress, settled),
            Some(LoadAction::SpawnCity)
        );
        progress.city_requested = true;

        settled.city = true;
        assert_eq!(
            next_load_action(&progress, settled),
            Some(LoadAction::SpawnOrbitals)
        );
        progress.orbitals_requested = true;

        settled.orbitals = true;
        assert_eq!(
            next_load_action(&progress, settled),
            Some(LoadAction::BeginWarmup)
        );
        progress.warmup_started = true;
        assert_eq!(next_load_action(&progress, settled), None);
    }
}
