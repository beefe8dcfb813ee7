use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::loading::MANIFEST_PATH;

use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::loading::progress::LoadingProgress;

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<SceneManifest>>,
}

// Start the loading process
pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    manifest_loader.handle = Some(asset_server.load(MANIFEST_PATH));
}

/// Install the manifest as a resource once it loads. A missing or invalid
/// manifest falls back to the compiled layout.
pub fn load_manifest_system(
    mut loading_progress: ResMut<LoadingProgress>,
    manifest_loader: Res<ManifestLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<SceneManifest>>,
) {
    if loading_progress.manifest_settled {
        return;
    }
    let Some(ref handle) = manifest_loader.handle else {
        return;
    };

    let manifest = if let Some(manifest) = manifests.get(handle) {
        match manifest.validate() {
            Ok(()) => {
                info!("✓ Scene manifest loaded");
                manifest.clone()
            }
            Err(err) => {
                warn!("Scene manifest rejected ({}), using defaults", err);
                SceneManifest::default()
            }
        }
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Scene manifest failed to load ({}), using defaults", err);
        SceneManifest::default()
    } else {
        return;
    };

    commands.insert_resource(manifest);
    loading_progress.manifest_settled = true;
}
