//! Bevy plugin driving the swarm from the `Update` schedule.
//!
//! The swarm advances once per frame with the frame delta. Events it raises
//! while ticking are triggered on observers after the tick, so observers
//! never see the swarm mid-update.

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use log::{debug, info};

use crate::config::SwarmSettings;
use crate::events::{StepOutcome, SwarmEvent};
use crate::swarm::Swarm;

/// Advances the [`Swarm`] resource and forwards its events to observers.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn tick_swarm_system(time: Res<Time>, mut swarm: ResMut<Swarm>, mut commands: Commands) {
    swarm.tick(time.delta_secs());
    for event in swarm.drain_events() {
        commands.trigger(event);
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_swarm_event(event: On<SwarmEvent>) {
    match *event.event() {
        SwarmEvent::FinishedSpawning(id) => debug!("{id:?} finished spawning"),
        SwarmEvent::StepFinished {
            id,
            outcome: StepOutcome::Aborted(err),
        } => debug!("{id:?} abandoned a step: {err}"),
        SwarmEvent::StepFinished { .. } => {}
        SwarmEvent::HitPointsChanged { id, current, max } => {
            debug!("{id:?} has {current}/{max} hit points");
        }
        SwarmEvent::Removed { id, cause } => info!("{id:?} left the swarm: {cause:?}"),
    }
}

/// Installs the [`Swarm`] resource and the system that ticks it.
#[derive(Debug, Default)]
pub struct SwarmPlugin {
    /// Settings for the swarm created by the plugin.
    pub settings: SwarmSettings,
}

impl SwarmPlugin {
    /// Plugin building its swarm from `settings`.
    #[must_use]
    pub const fn new(settings: SwarmSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for SwarmPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_swarm_event);
        app.insert_resource(Swarm::new(self.settings.clone()));
        app.add_systems(Update, tick_swarm_system);
    }
}
