use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::CLEAR_COLOUR_SRGB;

use super::app_state::AppState;
use super::boot::boot_system;
use super::device::DeviceProfile;
use super::window_config::create_default_plugins;
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::choreography::driver::ChoreographyPlugin;
use crate::engine::effects::EffectsPlugin;
use crate::engine::input::pointer::{PointerState, track_pointer};
use crate::engine::input::scroll::ScrollInputPlugin;
use crate::engine::loading::chain::advance_load_chain;
use crate::engine::loading::manifest_loader::{ManifestLoader, load_manifest_system, start_loading};
use crate::engine::loading::progress::{LoadingProgress, PhaseCompleted, publish_load_milestones};
use crate::engine::scene::ScenePlugin;
use crate::rpc::web_rpc::WebRpcPlugin;

/// Create the application with every engine plugin installed.
pub fn create_app() -> App {
    let mut app = App::new();
    let [red, green, blue] = CLEAR_COLOUR_SRGB;

    // Device profile is read by plugin startup systems.
    app.insert_resource(DeviceProfile::detect())
        .insert_resource(ClearColor(Color::srgb_u8(red, green, blue)))
        .add_plugins(create_default_plugins())
        .add_plugins(JsonAssetPlugin::<SceneManifest>::new(&["json"]))
        .init_state::<AppState>()
        .add_plugins((
            ChoreographyPlugin,
            ScrollInputPlugin,
            EffectsPlugin,
            ScenePlugin,
            WebRpcPlugin,
        ));

    app.init_resource::<LoadingProgress>()
        .init_resource::<ManifestLoader>()
        .init_resource::<PointerState>()
        .add_event::<PhaseCompleted>()
        .add_systems(Startup, start_loading)
        .add_systems(Update, boot_system.run_if(in_state(AppState::Booting)))
        .add_systems(
            Update,
            (load_manifest_system, advance_load_chain)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(Update, (publish_load_milestones, track_pointer))
        .add_systems(OnEnter(AppState::Running), announce_running);

    app
}

fn announce_running(profile: Res<DeviceProfile>) {
    info!("✓ Scene running ({:?})", *profile);
}
