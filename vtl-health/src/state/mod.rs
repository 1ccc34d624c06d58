
use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;

use crate::{
    config::HealthConfig,
    error::HealthError,
    notify::{HealthChanged, Notifier, Subscribers, SubscriptionId},
    regen::Regeneration,
};

#[derive(Component, Debug, Default)]
pub struct HealthState {
    vitals: Option<Vitals>,
    regeneration: Option<Regeneration>,
    on_change: Subscribers,
    on_death: Subscribers,
    next_subscription: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Vitals {
    current: f32,
    max: f32,
    damage_multiplier: f32,
    heal_multiplier: f32,
    dead: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Died,
    Scheduled,
    Rejected(Rejection),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    NonPositiveAmount,
    Dead,
}

impl HealthState {
    pub fn new(config: HealthConfig) -> Result<Self, HealthError> {
        let mut health = HealthState::default();
        health.initialize(config)?;
        Ok(health)
    }

    pub fn initialize(&mut self, config: HealthConfig) -> Result<(), HealthError> {
        if self.vitals.is_some() {
            return Err(HealthError::AlreadyInitialized);
        }

        config.validate()?;

        let current = config.start_health();
        self.vitals = Some(Vitals {
            current,
            max: config.max_health,
            damage_multiplier: config.damage_multiplier,
            heal_multiplier: config.heal_multiplier,
            dead: false,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.vitals.is_some()
    }

    pub fn current_health(&self) -> Result<f32, HealthError> {
        Ok(self.vitals()?.current)
    }

    pub fn max_health(&self) -> Result<f32, HealthError> {
        Ok(self.vitals()?.max)
    }

    pub fn is_dead(&self) -> Result<bool, HealthError> {
        Ok(self.vitals()?.dead)
    }

    pub fn snapshot(&self) -> Result<HealthChanged, HealthError> {
        Ok(self.vitals()?.snapshot())
    }

    pub fn is_regenerating(&self) -> bool {
        self.regeneration.is_some()
    }

    pub fn regeneration_remaining(&self) -> Option<Duration> {
        self.regeneration.as_ref().map(Regeneration::remaining)
    }

    pub fn take_damage(&mut self, amount: f32) -> Result<Outcome, HealthError> {
        let vitals = self.vitals_mut()?;
        if vitals.dead {
            debug!("ignoring {amount} damage to a dead entity");
            return Ok(Outcome::Rejected(Rejection::Dead));
        }
        if !is_positive(amount) {
            warn!("damage amount must be positive, got {amount}; use heal to restore health");
            return Ok(Outcome::Rejected(Rejection::NonPositiveAmount));
        }

        vitals.current -= amount * vitals.damage_multiplier;

        if vitals.current <= 0.0 {
            vitals.current = 0.0;
            vitals.dead = true;

            let change = vitals.snapshot();
            self.regeneration = None;

            info!("health depleted, entity has died");
            self.publish(change, true);
            Ok(Outcome::Died)
        } else {
            let change = vitals.snapshot();
            self.publish(change, false);
            Ok(Outcome::Changed)
        }
    }

    pub fn heal(&mut self, amount: f32) -> Result<Outcome, HealthError> {
        self.restore(amount, "heal")
    }

    pub fn consume_potion(&mut self, amount: f32) -> Result<Outcome, HealthError> {
        self.restore(amount, "potion")
    }

    pub fn apply_regeneration(
        &mut self,
        rate: f32,
        duration: Duration,
    ) -> Result<Outcome, HealthError> {
        if self.vitals()?.dead {
            debug!("ignoring regeneration on a dead entity");
            return Ok(Outcome::Rejected(Rejection::Dead));
        }
        if !(rate.is_finite() && is_positive(rate)) || duration.is_zero() {
            warn!("regeneration needs a positive rate and duration, got {rate} over {duration:?}");
            return Ok(Outcome::Rejected(Rejection::NonPositiveAmount));
        }

        if let Some(previous) = self
            .regeneration
            .replace(Regeneration::new(rate, duration))
        {
            debug!(
                "replacing regeneration of {} per second with {:?} remaining",
                previous.rate(),
                previous.remaining()
            );
        }

        Ok(Outcome::Scheduled)
    }

    pub fn cancel_regeneration(&mut self) -> bool {
        self.regeneration.take().is_some()
    }

    pub fn tick(&mut self, delta: Duration) -> Result<bool, HealthError> {
        let vitals = self.vitals.as_mut().ok_or(HealthError::Uninitialized)?;
        let Some(regeneration) = self.regeneration.as_mut() else {
            return Ok(false);
        };

        if vitals.dead {
            self.regeneration = None;
            return Ok(false);
        }
        if delta.is_zero() {
            return Ok(false);
        }

        let amount = regeneration.advance(delta) * vitals.heal_multiplier;
        vitals.current = (vitals.current + amount).min(vitals.max);

        let change = vitals.snapshot();
        if regeneration.is_finished() {
            self.regeneration = None;
        }

        self.publish(change, false);
        Ok(true)
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&HealthChanged, &mut Notifier) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.on_change.insert(id, Box::new(callback));
        id
    }

    pub fn subscribe_death(
        &mut self,
        callback: impl FnMut(&HealthChanged, &mut Notifier) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.on_death.insert(id, Box::new(callback));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed_change = self.on_change.remove(id);
        let removed_death = self.on_death.remove(id);
        removed_change || removed_death
    }

    pub fn subscriber_count(&self) -> usize {
        self.on_change.len() + self.on_death.len()
    }

    fn restore(&mut self, amount: f32, source: &'static str) -> Result<Outcome, HealthError> {
        let vitals = self.vitals_mut()?;
        if vitals.dead {
            debug!("ignoring {source} of {amount} on a dead entity");
            return Ok(Outcome::Rejected(Rejection::Dead));
        }
        if !is_positive(amount) {
            warn!("{source} amount must be positive, got {amount}; use take_damage to deal damage");
            return Ok(Outcome::Rejected(Rejection::NonPositiveAmount));
        }

        vitals.current = (vitals.current + amount * vitals.heal_multiplier).min(vitals.max);

        let change = vitals.snapshot();
        self.publish(change, false);
        Ok(Outcome::Changed)
    }

    fn publish(&mut self, change: HealthChanged, died: bool) {
        let mut notifier = Notifier::default();

        self.on_change.notify(&change, &mut notifier);
        if died {
            self.on_death.notify(&change, &mut notifier);
        }

        self.on_change.retain(&notifier);
        self.on_death.retain(&notifier);
    }

    fn next_subscription_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription += 1;
        id
    }

    fn vitals(&self) -> Result<&Vitals, HealthError> {
        self.vitals.as_ref().ok_or(HealthError::Uninitialized)
    }

    fn vitals_mut(&mut self) -> Result<&mut Vitals, HealthError> {
        self.vitals.as_mut().ok_or(HealthError::Uninitialized)
    }
}

fn is_positive(amount: f32) -> bool {
    amount > 0.0
}

impl Vitals {
    fn snapshot(&self) -> HealthChanged {
        HealthChanged {
            current: self.current,
            max: self.max,
        }
    }
}
