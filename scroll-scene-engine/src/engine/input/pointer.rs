use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Cursor position in `[-1, 1]` on both axes, `+y` up.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub ndc: Vec2,
}

pub fn cursor_to_ndc(cursor: Vec2, window_size: Vec2) -> Vec2 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        cursor.x / window_size.x * 2.0 - 1.0,
        -(cursor.y / window_size.y * 2.0 - 1.0),
    )
}

pub fn track_pointer(
    mut cursor_events: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerState>,
) {
    let Some(event) = cursor_events.read().last() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    pointer.ndc = cursor_to_ndc(event.position, window.size());
}
