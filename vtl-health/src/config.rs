use crate::error::HealthError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HealthConfig {
    pub max_health: f32,
    pub start_health_percent: f32,
    pub damage_multiplier: f32,
    pub heal_multiplier: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: HealthConfig::DEFAULT_MAX_HEALTH,
            start_health_percent: 100.0,
            damage_multiplier: 1.0,
            heal_multiplier: 1.0,
        }
    }
}

impl HealthConfig {
    pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_start_health_percent(mut self, percent: f32) -> Self {
        self.start_health_percent = percent;
        self
    }

    pub fn with_damage_multiplier(mut self, multiplier: f32) -> Self {
        self.damage_multiplier = multiplier;
        self
    }

    pub fn with_heal_multiplier(mut self, multiplier: f32) -> Self {
        self.heal_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<(), HealthError> {
        positive("max_health", self.max_health)?;
        positive("damage_multiplier", self.damage_multiplier)?;
        positive("heal_multiplier", self.heal_multiplier)?;

        if !(0.0..=100.0).contains(&self.start_health_percent) {
            return Err(HealthError::InvalidConfig {
                field: "start_health_percent",
                value: self.start_health_percent,
            });
        }

        Ok(())
    }

    pub fn start_health(&self) -> f32 {
        (self.max_health * self.start_health_percent / 100.0).clamp(0.0, self.max_health)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), HealthError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HealthError::InvalidConfig { field, value })
    }
}
