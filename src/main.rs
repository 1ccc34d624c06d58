mod script;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use bevy_app::{ScheduleRunnerPlugin, prelude::*};
use bevy_log::LogPlugin;
use bevy_time::{TimePlugin, TimeUpdateStrategy, prelude::*};
use clap::Parser;

use vtl_display::DisplayPlugin as VtlDisplayPlugin;
use vtl_health::{HealthPlugin as VtlHealthPlugin, config::HealthConfig};

use crate::script::{Script, ScriptPlugin};

#[derive(Debug, Parser)]
#[command(version, about = "Plays a scripted health timeline against one entity")]
struct Args {
    #[arg(long, default_value_t = HealthConfig::DEFAULT_MAX_HEALTH)]
    max_health: f32,
    #[arg(long, default_value_t = 100.0)]
    start_percent: f32,
    #[arg(long, default_value_t = 1.0)]
    damage_multiplier: f32,
    #[arg(long, default_value_t = 1.0)]
    heal_multiplier: f32,
    #[arg(long, default_value_t = 250)]
    step_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = HealthConfig::default()
        .with_max_health(args.max_health)
        .with_start_health_percent(args.start_percent)
        .with_damage_multiplier(args.damage_multiplier)
        .with_heal_multiplier(args.heal_multiplier);
    config
        .validate()
        .context("invalid health configuration")?;

    let step = Duration::from_millis(args.step_ms.max(1));

    let exit = App::new()
        .add_plugins((
            TaskPoolPlugin::default(),
            TimePlugin,
            LogPlugin::default(),
            ScheduleRunnerPlugin::run_loop(Duration::ZERO),
            VtlHealthPlugin,
            VtlDisplayPlugin,
            ScriptPlugin::new(Script::demo(config)),
        ))
        .insert_resource(Time::<Fixed>::from_duration(step))
        .insert_resource(Time::<Virtual>::from_max_delta(Duration::MAX))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .run();

    if let AppExit::Error(code) = exit {
        bail!("simulation exited with code {code}");
    }

    Ok(())
}
