//! Fixed-rate driver that ticks a swarm and records its events.

use rollcubes::{AgentId, Swarm, SwarmEvent};

/// Ticks a [`Swarm`] at a fixed `dt`, keeping every event it raised.
#[derive(Debug, Clone)]
pub struct TickDriver {
    dt: f32,
    events: Vec<SwarmEvent>,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl TickDriver {
    /// Driver advancing `dt` seconds per tick.
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            events: Vec::new(),
        }
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Advances one tick.
    pub fn tick(&mut self, swarm: &mut Swarm) {
        swarm.tick(self.dt);
        self.events.extend(swarm.drain_events());
    }

    /// Advances `ticks` ticks.
    pub fn run(&mut self, swarm: &mut Swarm, ticks: usize) {
        for _ in 0..ticks {
            self.tick(swarm);
        }
    }

    /// Advances for at least `seconds`.
    pub fn run_for(&mut self, swarm: &mut Swarm, seconds: f32) {
        let mut elapsed = 0.0;
        while elapsed < seconds {
            self.tick(swarm);
            elapsed += self.dt;
        }
    }

    /// Ticks until `done` holds, for at most `max_ticks`. Returns the number
    /// of ticks taken, or `None` if `done` never held.
    pub fn run_until<F>(
        &mut self,
        swarm: &mut Swarm,
        max_ticks: usize,
        mut done: F,
    ) -> Option<usize>
    where
        F: FnMut(&Swarm) -> bool,
    {
        for taken in 1..=max_ticks {
            self.tick(swarm);
            if done(swarm) {
                return Some(taken);
            }
        }
        None
    }

    /// Every event recorded so far.
    pub fn events(&self) -> &[SwarmEvent] {
        &self.events
    }

    /// Events concerning `id`, in order.
    pub fn events_for(&self, id: AgentId) -> impl Iterator<Item = &SwarmEvent> + '_ {
        self.events.iter().filter(move |event| event.agent() == id)
    }

    /// Forgets the recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}
