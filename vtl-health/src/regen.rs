use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_time::prelude::*;

use crate::{HealthSystems, state::HealthState};

pub struct RegenerationPlugin;

#[derive(Clone, Debug)]
pub struct Regeneration {
    rate: f32,
    timer: Timer,
}

impl Plugin for RegenerationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            tick_regeneration.in_set(HealthSystems::Regenerate),
        );
    }
}

pub fn tick_regeneration(mut query: Query<(Entity, &mut HealthState)>, time: Res<Time>) {
    let delta = time.delta();

    query.par_iter_mut().for_each(|(id, mut health)| {
        if !health.is_regenerating() {
            return;
        }

        if let Err(err) = health.tick(delta) {
            error!("failed to regenerate health for {id:?}: {err}");
        }
    });
}

impl Regeneration {
    pub fn new(rate: f32, duration: Duration) -> Self {
        Regeneration {
            rate,
            timer: Timer::new(duration, TimerMode::Once),
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }

    // Only the part of `delta` inside the duration counts towards the amount.
    pub fn advance(&mut self, delta: Duration) -> f32 {
        let step = delta.min(self.timer.remaining());
        self.timer.tick(delta);
        self.rate * step.as_secs_f32()
    }
}
