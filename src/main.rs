use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use region_physics::config::ServerConfig;
use region_physics::net::start_websocket_server;
use region_physics::physics::PhysicsWorld;
use region_physics::state::SharedGameState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "cannot start");
            std::process::exit(1);
        }
    };

    info!(addr = %config.bind_addr, tick_hz = config.tick_hz, "starting region physics server");

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let physics = Arc::new(Mutex::new(PhysicsWorld::new(&config)));

    // WebSocket scripting endpoint
    {
        let state = Arc::clone(&state);
        let physics = Arc::clone(&physics);
        let addr = config.bind_addr.clone();
        tokio::spawn(async move {
            if let Err(e) = start_websocket_server(addr, state, physics).await {
                error!(error = %e, "websocket server stopped");
            }
        });
    }

    // Fixed timestep
    let dt = config.step_seconds();
    let mut ticker = interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        // scripting calls land between ticks
        for (id, command) in game.drain_commands() {
            if !phys.apply_vehicle_command(id, &command) {
                warn!(id, ?command, "command for unknown object dropped");
            }
        }

        phys.step(dt);

        game.tick += 1;
        game.broadcast_snapshot(&phys);
    }
}
