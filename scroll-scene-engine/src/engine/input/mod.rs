//! Input sources feeding the choreography.

/// Smoothed scroll progress: native wheel/keys or the page scroll offset on the web.
pub mod scroll;

/// Normalised cursor position for parallax.
pub mod pointer;
