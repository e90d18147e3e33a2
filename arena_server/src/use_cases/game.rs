use super::registry::{ConnectionRegistry, SendOutcome};
use super::types::{GameEvent, Payload};
use crate::domain::World;
use crate::interface_adapters::protocol::{BeamDto, TankDto, encode_frame, encode_line};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Ticks between debug statistics lines.
const STATS_EVERY: u64 = 100;

/// Single writer of the world. Connections talk to it only through `input_rx`, and
/// it streams every tick to the clients in its registry.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut world: World,
    tick_interval: Duration,
) {
    let mut registry = ConnectionRegistry::new();

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = interval.tick() => {
                let frame = world.step();
                match encode_frame(&frame) {
                    Ok(payload) if !payload.is_empty() => {
                        let payload = Payload::from(payload);
                        let closed = registry.broadcast(&payload);
                        for player_id in closed {
                            disconnect(&mut world, &mut registry, player_id);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => error!(tick = frame.tick, error = %e, "failed to encode frame"),
                }

                if frame.tick % STATS_EVERY == 0 {
                    debug!(
                        tick = frame.tick,
                        tanks = world.tank_count(),
                        projectiles = world.projectile_count(),
                        clients = registry.len(),
                        "tick stats"
                    );
                }
            }

            ev = input_rx.recv() => {
                let Some(ev) = ev else {
                    info!("input channel closed; stopping world task");
                    break;
                };
                handle_event(&mut world, &mut registry, ev);
            }
        }
    }
}

fn handle_event(world: &mut World, registry: &mut ConnectionRegistry, ev: GameEvent) {
    match ev {
        GameEvent::Join {
            player_id,
            name,
            outbound_tx,
        } => {
            let joined = world.spawn_tank(player_id, name);
            registry.register(player_id, outbound_tx);
            info!(player_id, name = %joined.name, "player joined");

            // Only the joining client sees its `join: true` record.
            match encode_line(&TankDto::from(&joined)) {
                Ok(line) => {
                    if registry.send_to(player_id, &Payload::from(line)) == SendOutcome::Closed {
                        disconnect(world, registry, player_id);
                    }
                }
                Err(e) => error!(player_id, error = %e, "failed to encode join record"),
            }
        }
        GameEvent::Intent { player_id, intent } => {
            let Some(beam) = world.apply_intent(player_id, &intent) else {
                return;
            };
            match encode_line(&BeamDto::from(&beam)) {
                Ok(line) => {
                    let closed = registry.broadcast(&Payload::from(line));
                    for id in closed {
                        disconnect(world, registry, id);
                    }
                }
                Err(e) => error!(player_id, error = %e, "failed to encode beam"),
            }
        }
        GameEvent::Leave { player_id } => disconnect(world, registry, player_id),
    }
}

/// Removes a player and tells everyone else. Broadcasting the final record can uncover
/// more dead connections; those are torn down in the same pass.
fn disconnect(world: &mut World, registry: &mut ConnectionRegistry, player_id: u64) {
    let mut pending = vec![player_id];
    while let Some(player_id) = pending.pop() {
        registry.unregister(player_id);
        let Some(last) = world.disconnect_tank(player_id) else {
            continue;
        };
        info!(player_id, name = %last.name, "player disconnected");

        match encode_line(&TankDto::from(&last)) {
            Ok(line) => pending.extend(registry.broadcast(&Payload::from(line))),
            Err(e) => error!(player_id, error = %e, "failed to encode disconnect record"),
        }
    }
}
