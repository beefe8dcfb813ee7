use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use thiserror::Error;

use super::app_state::AppState;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Error, PartialEq)]
pub enum BootError {
    #[error("mount point '{0}' is missing from the page")]
    MissingMountPoint(&'static str),
    #[error("no primary window to render into")]
    NoPrimaryWindow,
}

/// Checks that must pass before the app is built.
pub fn preflight() -> Result<(), BootError> {
    #[cfg(target_arch = "wasm32")]
    {
        use constants::render_settings::CANVAS_SELECTOR;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(BootError::MissingMountPoint(CANVAS_SELECTOR))?;
        match document.query_selector(CANVAS_SELECTOR) {
            Ok(Some(_)) => Ok(()),
            _ => Err(BootError::MissingMountPoint(CANVAS_SELECTOR)),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(())
    }
}

pub fn boot_message(err: &BootError) -> String {
    format!("Unable to start the scene: {}", err)
}

/// Show a preflight failure without an app to render it.
pub fn report_preflight_failure(err: &BootError) {
    let message = boot_message(err);

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        web_sys::console::error_1(&message.clone().into());

        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Ok(overlay) = document.create_element("div") else {
            return;
        };
        overlay.set_id("boot-error");
        overlay.set_text_content(Some(&message));
        if let Ok(element) = overlay.clone().dyn_into::<web_sys::HtmlElement>() {
            let style = element.style();
            let _ = style.set_property("position", "fixed");
            let _ = style.set_property("inset", "0");
            let _ = style.set_property("display", "flex");
            let _ = style.set_property("align-items", "center");
            let _ = style.set_property("justify-content", "center");
            let _ = style.set_property("background", "#050505");
            let _ = style.set_property("color", "#f26666");
            let _ = style.set_property("font-family", "monospace");
            let _ = style.set_property("z-index", "1000");
        }
        if let Some(body) = document.body() {
            let _ = body.append_child(&overlay);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("{}", message);
    }
}

/// In-app boot checks. Success moves on to loading; failure is fatal.
pub fn boot_system(
    windows: Query<(), With<PrimaryWindow>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc: ResMut<WebRpcInterface>,
    mut commands: Commands,
) {
    if !windows.is_empty() {
        info!("✓ Boot checks passed");
        next_state.set(AppState::Loading);
        return;
    }

    let err = BootError::NoPrimaryWindow;
    let message = boot_message(&err);
    error!("{}", message);

    rpc.send_notification("boot_error", serde_json::json!({ "message": message }));
    spawn_error_overlay(&mut commands, &message);
    next_state.set(AppState::Failed);
}

#[derive(Component)]
pub struct BootErrorOverlay;

fn spawn_error_overlay(commands: &mut Commands, message: &str) {
    commands
        .spawn((
            Name::new("Boot Error"),
            BootErrorOverlay,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgb_u8(5, 5, 5)),
            GlobalZIndex(100),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(message),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.4, 0.4)),
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn boot_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .init_resource::<WebRpcInterface>()
            .add_systems(Update, boot_system.run_if(in_state(AppState::Booting)));
        app
    }

    fn state(app: &App) -> AppState {
        *app.world().resource::<State<AppState>>().get()
    }

    #[test]
    fn a_primary_window_moves_boot_on_to_loading() {
        let mut app = boot_app();
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app.update();
        app.update();
        assert_eq!(state(&app), AppState::Loading);
    }

    #[test]
    fn a_missing_window_fails_boot_and_tells_the_host() {
        let mut app = boot_app();
        app.update();
        app.update();
        assert_eq!(state(&app), AppState::Failed);

        let rpc = app.world().resource::<WebRpcInterface>();
        let notification = rpc
            .pending_notifications()
            .iter()
            .find(|notification| notification.method == "boot_error")
            .expect("boot_error notification queued");
        assert_eq!(
            notification.params["message"],
            "Unable to start the scene: no primary window to render into"
        );

        let world = app.world_mut();
        let overlays = world
            .query_filtered::<(), With<BootErrorOverlay>>()
            .iter(world)
            .count();
        assert_eq!(overlays, 1);
    }

    #[test]
    fn native_preflight_passes() {
        assert_eq!(preflight(), Ok(()));
    }
}
