//! JSON-RPC 2.0 bridge between the scene engine and the host page.
//!
//! The wasm build exchanges `postMessage` strings with the parent window. On
//! native builds the bridge still runs, but outgoing messages are dropped and
//! nothing arrives.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Scene engine (canvas)
//!        │                                            │
//!        ├─ Request (with ID) ──────────────────────> │
//!        │ <───────────────────── Response (with ID) ─┤
//!        ├─ Notification (no ID) ───────────────────> │  (handled, no reply)
//!        │ <────────────── Notification (no ID) ──────┤
//! ```
//!
//! Incoming messages are handled before the driver's input stage, so a
//! `scroll_to` or `nav_pulse` affects the same frame. Outgoing messages are
//! flushed after the effects stage.
//!
//! ## Methods
//!
//! - `scroll_to {progress, duration?}`: eased jump (duration in seconds,
//!   defaults to the navigation tween length).
//! - `nav_pulse {intensity?}`: overlay and planet emphasis pulse.
//! - `audio_energy {value}`: audio loudness in `[0, 1]`.
//! - `card_hover {index | null}`: hovered project card.
//! - `dispose_sub_scene {name}`: release a sub-scene (`planet`, `city`,
//!   `satellites`, `cards`, `debris`).
//! - `get_scene_state`: progress, velocity, segment, camera pose and
//!   sub-scene states.
//!
//! ## Notifications sent
//!
//! - `loading_progress {percent, text}`
//! - `boot_error {message}`
//! - `cinematic_overlay {brightness, halo, drift, x, y, pulse}`
//! - `section_hud {visible}`
//!
//! ## Error Codes
//!
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// JSON-RPC message types, request dispatch and the wasm message listener.
pub mod web_rpc;
