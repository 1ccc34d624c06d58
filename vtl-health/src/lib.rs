pub mod config;
pub mod death;
pub mod error;
pub mod notify;
pub mod regen;
pub mod state;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;

use crate::{death::DeathPlugin, regen::RegenerationPlugin};

pub struct HealthPlugin;

#[derive(Debug, PartialEq, Eq, Clone, Hash, SystemSet)]
pub enum HealthSystems {
    Regenerate,
    DetectDeaths,
}

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((RegenerationPlugin, DeathPlugin));
    }
}
