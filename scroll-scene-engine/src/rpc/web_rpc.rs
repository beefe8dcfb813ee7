use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::render_settings::NAV_SCROLL_SECS;
use constants::scene_layout::CARD_COUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::choreography::camera_path::{CameraPose, segment_index};
use crate::engine::choreography::driver::{ChoreographyFrame, DriverSet};
use crate::engine::choreography::visibility::{SceneStates, SubScene};
use crate::engine::effects::audio::{AudioEnergy, NavPulse};
use crate::engine::input::scroll::ScrollSmoother;
use crate::engine::scene::DisposeSubScene;
use crate::engine::scene::cards::CardHover;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request structure. Notifications omit `id`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_request(message: &str) -> Self {
        Self::with_code(-32600, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            data: Some(serde_json::json!({ "method": method })),
            ..Self::with_code(-32601, "Method not found")
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::with_code(-32602, message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::with_code(-32603, message)
    }

    fn with_code(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Outgoing message queues, flushed once per frame after the effects stage.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// Plugin establishing the postMessage bridge.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(DriverSet::Input),
            )
            .add_systems(Update, send_outgoing_messages.after(DriverSet::Effects));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not installed");
        return;
    };
    if let Err(err) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", err);
        return;
    }

    // The listener lives for the whole page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages received by the wasm listener, drained once per frame.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw incoming message from the host page.
#[derive(Event)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Decoded request, validated against its parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCommand {
    ScrollTo { progress: f32, duration: f32 },
    NavPulse { intensity: f32 },
    AudioEnergy { value: f32 },
    CardHover { index: Option<usize> },
    DisposeSubScene(SubScene),
    GetSceneState,
}

/// Map a request onto a command. `Ok(None)` means the method is not ours.
pub fn parse_command(request: &RpcRequest) -> Result<Option<RpcCommand>, RpcError> {
    #[derive(Deserialize)]
    struct ScrollToParams {
        progress: f32,
        duration: Option<f32>,
    }

    #[derive(Deserialize, Default)]
    struct NavPulseParams {
        intensity: Option<f32>,
    }

    #[derive(Deserialize)]
    struct AudioEnergyParams {
        value: f32,
    }

    #[derive(Deserialize)]
    struct CardHoverParams {
        index: Option<usize>,
    }

    #[derive(Deserialize)]
    struct DisposeParams {
        name: String,
    }

    if request.jsonrpc != JSONRPC_VERSION {
        return Err(RpcError::invalid_request("Expected jsonrpc 2.0"));
    }

    let params = &request.params;
    let command = match request.method.as_str() {
        "scroll_to" => {
            let parsed = serde_json::from_value::<ScrollToParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'progress' parameter"))?;
            if !parsed.progress.is_finite() {
                return Err(RpcError::invalid_params("'progress' must be finite"));
            }
            RpcCommand::ScrollTo {
                progress: parsed.progress,
                duration: parsed.duration.unwrap_or(NAV_SCROLL_SECS).max(0.0),
            }
        }
        "nav_pulse" => {
            let parsed = if params.is_null() {
                NavPulseParams::default()
            } else {
                serde_json::from_value::<NavPulseParams>(params.clone())
                    .map_err(|_| RpcError::invalid_params("Expected optional 'intensity'"))?
            };
            RpcCommand::NavPulse {
                intensity: parsed.intensity.unwrap_or(NavPulse::default().intensity),
            }
        }
        "audio_energy" => {
            let parsed = serde_json::from_value::<AudioEnergyParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'value' parameter"))?;
            RpcCommand::AudioEnergy {
                value: parsed.value,
            }
        }
        "card_hover" => {
            let parsed = serde_json::from_value::<CardHoverParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'index' parameter"))?;
            if parsed.index.is_some_and(|index| index >= CARD_COUNT) {
                return Err(RpcError::invalid_params(&format!(
                    "Card index out of range (0..{})",
                    CARD_COUNT
                )));
            }
            RpcCommand::CardHover {
                index: parsed.index,
            }
        }
        "dispose_sub_scene" => {
            let parsed = serde_json::from_value::<DisposeParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'name' parameter"))?;
            let kind = SubScene::from_name(&parsed.name).ok_or_else(|| {
                RpcError::invalid_params(&format!("Unknown sub-scene: {}", parsed.name))
            })?;
            RpcCommand::DisposeSubScene(kind)
        }
        "get_scene_state" => RpcCommand::GetSceneState,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// World access needed to execute commands.
#[derive(SystemParam)]
pub struct RpcContext<'w> {
    smoother: ResMut<'w, ScrollSmoother>,
    audio: ResMut<'w, AudioEnergy>,
    card_hover: ResMut<'w, CardHover>,
    nav_pulses: EventWriter<'w, NavPulse>,
    disposals: EventWriter<'w, DisposeSubScene>,
    frame: Res<'w, ChoreographyFrame>,
    pose: Res<'w, CameraPose>,
    states: Res<'w, SceneStates>,
}

fn execute_command(
    command: RpcCommand,
    ctx: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    match command {
        RpcCommand::ScrollTo { progress, duration } => {
            let accepted = ctx.smoother.scroll_to_progress(progress, duration);
            Ok(serde_json::json!({ "accepted": accepted }))
        }
        RpcCommand::NavPulse { intensity } => {
            ctx.nav_pulses.write(NavPulse { intensity });
            Ok(serde_json::json!({ "success": true }))
        }
        RpcCommand::AudioEnergy { value } => {
            ctx.audio.set(value);
            Ok(serde_json::json!({ "value": ctx.audio.value() }))
        }
        RpcCommand::CardHover { index } => {
            ctx.card_hover.set_if_neq(CardHover(index));
            Ok(serde_json::json!({ "index": index }))
        }
        RpcCommand::DisposeSubScene(kind) => {
            info!("Dispose requested for {}", kind.name());
            ctx.disposals.write(DisposeSubScene(kind));
            Ok(serde_json::json!({ "success": true, "name": kind.name() }))
        }
        RpcCommand::GetSceneState => scene_state_snapshot(ctx),
    }
}

fn scene_state_snapshot(ctx: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let states = serde_json::to_value(*ctx.states)
        .map_err(|err| RpcError::internal_error(&format!("Failed to encode states: {}", err)))?;
    Ok(serde_json::json!({
        "progress": ctx.frame.progress,
        "velocity": ctx.frame.velocity,
        "warmup": ctx.frame.warmup,
        "segment": segment_index(ctx.frame.progress),
        "camera": {
            "position": ctx.pose.position.to_array(),
            "rotation": ctx.pose.rotation.to_array(),
        },
        "states": states,
    }))
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut ctx: RpcContext,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(&request, &mut ctx) {
                    rpc_interface.queue_response(response);
                }
            }
            // Our own responses echo back when the page hosts us directly.
            Err(parse_error) => debug!("Ignoring non-request message: {}", parse_error),
        }
    }
}

/// Handle one request. Only requests with an ID produce a response.
fn handle_rpc_request(request: &RpcRequest, ctx: &mut RpcContext) -> Option<RpcResponse> {
    let outcome = match parse_command(request) {
        Ok(Some(command)) => execute_command(command, ctx),
        Ok(None) => {
            if request.id.is_none() {
                // Notifications we emit ourselves come back through the same channel.
                debug!("Ignoring notification: {}", request.method);
                return None;
            }
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
        Err(error) => Err(error),
    };

    let Some(id) = request.id.clone() else {
        if let Err(error) = outcome {
            warn!("RPC notification {} failed: {}", request.method, error);
        }
        return None;
    };

    Some(match outcome {
        Ok(result_value) => RpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(id, error),
    })
}

fn create_error_response(id: serde_json::Value, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        result: None,
        error: Some(error),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Post a serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn request(method: &str, params: serde_json::Value, id: Option<i64>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: id.map(serde_json::Value::from),
        }
    }

    #[test]
    fn scroll_to_defaults_to_the_navigation_tween() {
        let command = parse_command(&request(
            "scroll_to",
            serde_json::json!({ "progress": 0.5 }),
            Some(1),
        ));
        assert_eq!(
            command,
            Ok(Some(RpcCommand::ScrollTo {
                progress: 0.5,
                duration: NAV_SCROLL_SECS
            }))
        );
    }

    #[test]
    fn invalid_params_are_rejected_with_their_code() {
        let missing = parse_command(&request("scroll_to", serde_json::json!({}), Some(1)));
        assert_eq!(missing.map_err(|err| err.code), Err(-32602));

        let card = parse_command(&request(
            "card_hover",
            serde_json::json!({ "index": 9 }),
            Some(2),
        ));
        assert_eq!(card.map_err(|err| err.code), Err(-32602));

        let dispose = parse_command(&request(
            "dispose_sub_scene",
            serde_json::json!({ "name": "moon" }),
            Some(3),
        ));
        assert_eq!(dispose.map_err(|err| err.code), Err(-32602));
    }

    #[test]
    fn nav_pulse_params_are_optional() {
        let command = parse_command(&request("nav_pulse", serde_json::Value::Null, None));
        assert_eq!(command, Ok(Some(RpcCommand::NavPulse { intensity: 1.0 })));
        let clear_hover = parse_command(&request(
            "card_hover",
            serde_json::json!({ "index": null }),
            None,
        ));
        assert_eq!(clear_hover, Ok(Some(RpcCommand::CardHover { index: None })));
    }

    #[test]
    fn wrong_protocol_version_is_an_invalid_request() {
        let mut req = request("get_scene_state", serde_json::Value::Null, Some(1));
        req.jsonrpc = "1.0".to_string();
        assert_eq!(parse_command(&req).map_err(|err| err.code), Err(-32600));
    }

    fn rpc_world() -> World {
        let mut world = World::new();
        world.insert_resource(ScrollSmoother::new(1000.0, 0.1));
        world.init_resource::<AudioEnergy>();
        world.init_resource::<CardHover>();
        world.init_resource::<ChoreographyFrame>();
        world.init_resource::<CameraPose>();
        world.init_resource::<SceneStates>();
        world.init_resource::<WebRpcInterface>();
        world.init_resource::<Events<NavPulse>>();
        world.init_resource::<Events<DisposeSubScene>>();
        world.init_resource::<Events<IncomingRpcMessage>>();
        world
    }

    fn deliver(world: &mut World, message: serde_json::Value) {
        world.send_event(IncomingRpcMessage {
            content: message.to_string(),
        });
        world
            .run_system_once(handle_rpc_messages)
            .expect("rpc handler runs");
        // run_system_once builds a fresh EventReader each call; drain handled
        // messages so the next delivery doesn't re-read them.
        world
            .resource_mut::<Events<IncomingRpcMessage>>()
            .clear();
    }

    #[test]
    fn requests_are_dispatched_and_answered() {
        let mut world = rpc_world();
        deliver(
            &mut world,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "audio_energy",
                "params": { "value": 0.6 },
                "id": 7
            }),
        );
        deliver(
            &mut world,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "dispose_sub_scene",
                "params": { "name": "satellites" }
            }),
        );

        assert_eq!(world.resource::<AudioEnergy>().value(), 0.6);
        let responses = world.resource::<WebRpcInterface>().pending_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Some(serde_json::Value::from(7)));
        assert!(responses[0].error.is_none());

        let disposals = world.resource::<Events<DisposeSubScene>>();
        let mut cursor = disposals.get_cursor();
        let kinds: Vec<_> = cursor.read(disposals).map(|event| event.0).collect();
        assert_eq!(kinds, vec![SubScene::Satellites]);
    }

    #[test]
    fn unknown_methods_answer_method_not_found() {
        let mut world = rpc_world();
        deliver(
            &mut world,
            serde_json::json!({ "jsonrpc": "2.0", "method": "teleport", "id": "a" }),
        );
        deliver(
            &mut world,
            serde_json::json!({ "jsonrpc": "2.0", "method": "loading_progress", "params": {} }),
        );

        let responses = world.resource::<WebRpcInterface>().pending_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].error.as_ref().map(|err| err.code), Some(-32601));
    }

    #[test]
    fn scene_state_reports_camera_and_segment() {
        let mut world = rpc_world();
        deliver(
            &mut world,
            serde_json::json!({ "jsonrpc": "2.0", "method": "get_scene_state", "id": 1 }),
        );
        let responses = world.resource::<WebRpcInterface>().pending_responses();
        let result = responses[0].result.as_ref().expect("state result");
        assert_eq!(result["segment"], 0);
        assert_eq!(result["states"]["planet"]["visible"], true);
        assert_eq!(result["camera"]["position"].as_array().map(Vec::len), Some(3));
    }
}
