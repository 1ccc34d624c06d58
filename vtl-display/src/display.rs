use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use vtl_health::{
    error::HealthError,
    notify::{HealthChanged, Notifier, SubscriptionId},
    state::HealthState,
};

use crate::readout::Readout;

#[derive(Component, Debug, Default)]
pub struct HealthDisplay {
    readout: Arc<Mutex<Readout>>,
    subscription: Option<SubscriptionId>,
}

pub fn attach_display(
    trigger: On<Add, HealthDisplay>,
    mut query: Query<(&mut HealthDisplay, Option<&mut HealthState>)>,
) -> Result {
    let (mut display, health) = query.get_mut(trigger.entity)?;
    let Some(mut health) = health else {
        warn!(
            "health display added to {:?} without a health state",
            trigger.entity
        );
        return Ok(());
    };

    display.attach(&mut health)?;
    Ok(())
}

pub fn detach_display(
    trigger: On<Remove, HealthDisplay>,
    mut query: Query<(&mut HealthDisplay, &mut HealthState)>,
) {
    if let Ok((mut display, mut health)) = query.get_mut(trigger.entity) {
        display.detach(&mut health);
    }
}

pub fn attach_to_health(
    trigger: On<Insert, HealthState>,
    mut query: Query<(&mut HealthDisplay, &mut HealthState)>,
) -> Result {
    if let Ok((mut display, mut health)) = query.get_mut(trigger.entity) {
        display.attach(&mut health)?;
    }
    Ok(())
}

// Runs while the outgoing health state is still present.
pub fn detach_from_health(
    trigger: On<Replace, HealthState>,
    mut query: Query<(&mut HealthDisplay, &mut HealthState)>,
) {
    if let Ok((mut display, mut health)) = query.get_mut(trigger.entity) {
        display.detach(&mut health);
    }
}

impl HealthDisplay {
    pub fn new() -> Self {
        HealthDisplay::default()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn readout(&self) -> Readout {
        lock(&self.readout).clone()
    }

    pub fn attach(&mut self, health: &mut HealthState) -> Result<(), HealthError> {
        self.detach(health);

        render(&self.readout, &health.snapshot()?);

        let readout = self.readout.clone();
        let id = health.subscribe(move |change: &HealthChanged, _: &mut Notifier| {
            render(&readout, change)
        });
        self.subscription = Some(id);
        Ok(())
    }

    pub fn detach(&mut self, health: &mut HealthState) -> bool {
        match self.subscription.take() {
            Some(id) => health.unsubscribe(id),
            None => false,
        }
    }
}

fn render(readout: &Mutex<Readout>, change: &HealthChanged) {
    *lock(readout) = Readout::project(change);
}

fn lock(readout: &Mutex<Readout>) -> MutexGuard<'_, Readout> {
    readout.lock().unwrap_or_else(PoisonError::into_inner)
}
