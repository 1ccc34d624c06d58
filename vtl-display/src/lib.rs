pub mod display;
pub mod readout;

use bevy_app::prelude::*;

use crate::display::{attach_display, attach_to_health, detach_display, detach_from_health};

pub struct DisplayPlugin;

impl Plugin for DisplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(attach_display);
        app.add_observer(detach_display);
        app.add_observer(attach_to_health);
        app.add_observer(detach_from_health);
    }
}
