use bevy::prelude::*;
use constants::render_settings::{
    MOBILE_INPUT_WIDTH, MOBILE_LAYOUT_WIDTH, SCROLL_LERP_DESKTOP, SCROLL_LERP_MOBILE,
};
use constants::scene_layout::{
    CITY_BASE_Y_DESKTOP, CITY_BASE_Y_MOBILE, CITY_SCALE_DESKTOP, CITY_SCALE_MOBILE,
    JET_SCALE_DESKTOP, JET_SCALE_MOBILE, SATELLITE_MOBILE_SCALE,
};

/// Viewport class captured once at boot.
///
/// `Mobile` changes the scene layout (smaller city, jets and satellites).
/// `Tablet` keeps the desktop layout but uses touch-friendly scroll damping and
/// no bloom.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceProfile {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceProfile {
    pub fn from_width(width: f32) -> Self {
        if width < MOBILE_LAYOUT_WIDTH {
            DeviceProfile::Mobile
        } else if width < MOBILE_INPUT_WIDTH {
            DeviceProfile::Tablet
        } else {
            DeviceProfile::Desktop
        }
    }

    /// Browser viewport width on the web. Native windows open at desktop size.
    pub fn detect() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let width = web_sys::window()
                .and_then(|window| window.inner_width().ok())
                .and_then(|width| width.as_f64());
            match width {
                Some(width) => Self::from_width(width as f32),
                None => DeviceProfile::Desktop,
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            DeviceProfile::Desktop
        }
    }

    pub fn is_mobile_layout(self) -> bool {
        self == DeviceProfile::Mobile
    }

    pub fn is_desktop(self) -> bool {
        self == DeviceProfile::Desktop
    }

    pub fn scroll_lerp(self) -> f32 {
        if self.is_desktop() {
            SCROLL_LERP_DESKTOP
        } else {
            SCROLL_LERP_MOBILE
        }
    }

    pub fn city_base_y(self) -> f32 {
        if self.is_mobile_layout() {
            CITY_BASE_Y_MOBILE
        } else {
            CITY_BASE_Y_DESKTOP
        }
    }

    pub fn city_scale(self) -> f32 {
        if self.is_mobile_layout() {
            CITY_SCALE_MOBILE
        } else {
            CITY_SCALE_DESKTOP
        }
    }

    pub fn jet_scale(self) -> f32 {
        if self.is_mobile_layout() {
            JET_SCALE_MOBILE
        } else {
            JET_SCALE_DESKTOP
        }
    }

    pub fn satellite_scale(self) -> f32 {
        if self.is_mobile_layout() {
            SATELLITE_MOBILE_SCALE
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_map_to_profiles() {
        assert_eq!(DeviceProfile::from_width(375.0), DeviceProfile::Mobile);
        assert_eq!(DeviceProfile::from_width(768.0), DeviceProfile::Tablet);
        assert_eq!(DeviceProfile::from_width(1024.0), DeviceProfile::Tablet);
        assert_eq!(DeviceProfile::from_width(1025.0), DeviceProfile::Desktop);
    }

    #[test]
    fn only_mobile_shrinks_the_layout() {
        assert_eq!(DeviceProfile::Tablet.city_scale(), CITY_SCALE_DESKTOP);
        assert_eq!(DeviceProfile::Mobile.city_scale(), CITY_SCALE_MOBILE);
        assert_eq!(DeviceProfile::Tablet.scroll_lerp(), SCROLL_LERP_MOBILE);
    }
}
