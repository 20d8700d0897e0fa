use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::physics::PhysicsWorld;
use crate::schedule::LocalId;
use crate::vehicle::VehicleType;

/// A scripting call against one object's vehicle, applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleCommand {
    SetType(VehicleType),
    SetFloat { param: i32, value: f32 },
    SetVector { param: i32, value: [f32; 3] },
    /// `[x, y, z, w]`
    SetRotation { param: i32, value: [f32; 4] },
    SetFlags { mask: i32, remove: bool },
}

#[derive(Serialize)]
pub struct ObjectSnapshot {
    pub id: String,
    pub local_id: LocalId,
    pub vehicle: VehicleType,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Serialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tick: u64,
    pub objects: Vec<ObjectSnapshot>,
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
    /// Public object name -> world-local id.
    pub objects: HashMap<String, LocalId>,
    pending: Vec<(LocalId, VehicleCommand)>,
}

impl Default for SharedGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
            objects: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// Name a freshly spawned object. Returns its public id.
    pub fn add_object(&mut self, local_id: LocalId) -> String {
        let name = Uuid::new_v4().to_string();
        self.objects.insert(name.clone(), local_id);
        name
    }

    pub fn remove_object(&mut self, name: &str) -> Option<LocalId> {
        let local_id = self.objects.remove(name)?;
        self.pending.retain(|(id, _)| *id != local_id);
        Some(local_id)
    }

    pub fn queue_command(&mut self, local_id: LocalId, command: VehicleCommand) {
        self.pending.push((local_id, command));
    }

    /// Commands queued since the last call, oldest first.
    pub fn drain_commands(&mut self) -> Vec<(LocalId, VehicleCommand)> {
        std::mem::take(&mut self.pending)
    }

    pub fn snapshot(&self, world: &PhysicsWorld) -> Snapshot {
        let mut objects: Vec<ObjectSnapshot> = self
            .objects
            .iter()
            .filter_map(|(name, &local_id)| {
                let [x, y, z] = world.position(local_id)?;
                let vehicle = world.vehicle(local_id).map(|v| v.kind()).unwrap_or_default();
                Some(ObjectSnapshot { id: name.clone(), local_id, vehicle, x, y, z })
            })
            .collect();
        objects.sort_by_key(|o| o.local_id);

        Snapshot { kind: "snapshot", tick: self.tick, objects }
    }

    /// Build and send a snapshot of all objects to all clients.
    pub fn broadcast_snapshot(&mut self, world: &PhysicsWorld) {
        self.clients.retain(|tx| !tx.is_closed());
        if self.clients.is_empty() {
            return;
        }

        let json = match serde_json::to_string(&self.snapshot(world)) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "snapshot serialization failed");
                return;
            }
        };

        for tx in &self.clients {
            let _ = tx.send(json.clone());
        }
    }
}
