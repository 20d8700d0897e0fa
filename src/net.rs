use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::physics::PhysicsWorld;
use crate::state::{SharedGameState, VehicleCommand};
use crate::vehicle::{TerrainSource, VehicleType};

/// Where a connection's object appears.
const SPAWN_XY: [f32; 2] = [128.0, 128.0];
const SPAWN_HALF_EXTENTS: [f32; 3] = [2.0, 1.0, 0.5];
const SPAWN_MASS: f32 = 100.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "vehicle_type")]
    SetType { value: VehicleType },
    /// Same as `vehicle_type`, with the legacy integer constant.
    #[serde(rename = "vehicle_type_code")]
    SetTypeCode { value: i32 },
    #[serde(rename = "vehicle_float")]
    SetFloat { param: i32, value: f32 },
    #[serde(rename = "vehicle_vector")]
    SetVector { param: i32, value: [f32; 3] },
    #[serde(rename = "vehicle_rotation")]
    SetRotation { param: i32, value: [f32; 4] },
    #[serde(rename = "vehicle_flags")]
    SetFlags {
        mask: i32,
        #[serde(default)]
        remove: bool,
    },
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Result<Self, ServerError> {
        serde_json::from_str(txt).map_err(|e| ServerError::BadCommand(e.to_string()))
    }

    /// The vehicle command carried by this message, if any.
    pub fn into_command(self) -> Result<Option<VehicleCommand>, ServerError> {
        let command = match self {
            ClientMessage::Ping => return Ok(None),
            ClientMessage::SetType { value } => VehicleCommand::SetType(value),
            ClientMessage::SetTypeCode { value } => match VehicleType::from_code(value) {
                Some(kind) => VehicleCommand::SetType(kind),
                None => return Err(ServerError::BadCommand(format!("unknown vehicle type code {value}"))),
            },
            ClientMessage::SetFloat { param, value } => VehicleCommand::SetFloat { param, value },
            ClientMessage::SetVector { param, value } => VehicleCommand::SetVector { param, value },
            ClientMessage::SetRotation { param, value } => VehicleCommand::SetRotation { param, value },
            ClientMessage::SetFlags { mask, remove } => VehicleCommand::SetFlags { mask, remove },
        };
        Ok(Some(command))
    }
}

pub async fn start_websocket_server(
    bind_addr: String,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "websocket listening");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let state_clone = Arc::clone(&state);
        let physics_clone = Arc::clone(&physics);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(raw, state_clone, physics_clone).await {
                warn!(%peer, error = %e, "connection ended with error");
            }
        });
    }
}

async fn handle_connection(
    raw: TcpStream,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
) -> Result<(), ServerError> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Object for this connection
    // -------------------------------
    // lock order matches the tick loop: physics, then state
    let (name, local_id) = {
        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        let [x, y] = SPAWN_XY;
        let z = phys.terrain.height_at(x, y) + 2.0;
        let local_id = phys.spawn_box([x, y, z], SPAWN_HALF_EXTENTS, SPAWN_MASS);
        let name = game.add_object(local_id);
        game.register_client(tx.clone());
        (name, local_id)
    };

    info!(object = %name, local_id, "client connected");

    let welcome = serde_json::json!({
        "type": "welcome",
        "object_id": name,
        "local_id": local_id,
    });
    let _ = tx.send(welcome.to_string());

    // -------------------------------
    // 3) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                debug!(object = %name, error = %e, "read failed");
                break;
            }
        };
        if msg.is_close() {
            break;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let command = match ClientMessage::from_json(text).and_then(ClientMessage::into_command) {
            Ok(c) => c,
            Err(e) => {
                warn!(object = %name, error = %e, "dropping client message");
                continue;
            }
        };

        match command {
            None => {
                let _ = tx.send(r#"{"type":"pong"}"#.to_string());
            }
            Some(command) => {
                state.lock().await.queue_command(local_id, command);
            }
        }
    }

    info!(object = %name, "client disconnected");
    let mut phys = physics.lock().await;
    let mut game = state.lock().await;
    if let Some(id) = game.remove_object(&name) {
        phys.remove_object(id);
    }
    Ok(())
}
