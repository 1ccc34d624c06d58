use std::{collections::VecDeque, time::Duration};

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_time::prelude::*;

use vtl_display::display::HealthDisplay;
use vtl_health::{
    HealthSystems,
    config::HealthConfig,
    death::Died,
    error::HealthError,
    notify::{HealthChanged, Notifier},
    state::{HealthState, Outcome},
};

pub struct ScriptPlugin {
    script: Script,
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, SystemSet)]
pub struct RunScript;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    Damage(f32),
    Heal(f32),
    Potion(f32),
    Regenerate { rate: f32, duration: Duration },
}

#[derive(Clone, Debug, Resource)]
pub struct Script {
    config: HealthConfig,
    steps: VecDeque<(Duration, Action)>,
    elapsed: Duration,
    subject: Option<Entity>,
}

impl Plugin for ScriptPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.script.clone());

        app.configure_sets(FixedUpdate, RunScript.before(HealthSystems::Regenerate));

        app.add_systems(Startup, spawn_subject);
        app.add_systems(FixedUpdate, run_script.in_set(RunScript));
        app.add_systems(
            PostUpdate,
            finish_script.after(HealthSystems::DetectDeaths),
        );
    }
}

pub fn spawn_subject(mut commands: Commands, mut script: ResMut<Script>) -> Result {
    let mut health = HealthState::new(script.config)?;

    health.subscribe(|change: &HealthChanged, _: &mut Notifier| {
        debug!("health changed to {}/{}", change.current, change.max);
    });
    health.subscribe_death(|change: &HealthChanged, notifier: &mut Notifier| {
        info!("subject died with max health {}", change.max);
        notifier.unsubscribe_self();
    });

    let id = commands.spawn((health, HealthDisplay::new())).id();
    script.subject = Some(id);
    Ok(())
}

pub fn run_script(
    mut script: ResMut<Script>,
    mut query: Query<(&mut HealthState, &HealthDisplay)>,
    time: Res<Time>,
) -> Result {
    script.elapsed += time.delta();

    let Some(subject) = script.subject() else {
        return Ok(());
    };
    let Ok((mut health, display)) = query.get_mut(subject) else {
        return Ok(());
    };

    loop {
        let Some(&(at, action)) = script.steps.front() else {
            break;
        };
        if at > script.elapsed {
            break;
        }
        script.steps.pop_front();

        let outcome = action.apply(&mut health)?;
        let text = display.readout().text;
        info!(
            "{:.2}s {action:?} -> {outcome:?}, display reads {text:?}",
            at.as_secs_f32()
        );
    }

    Ok(())
}

pub fn finish_script(
    script: Res<Script>,
    query: Query<&HealthState>,
    mut died: MessageReader<Died>,
    mut exit: MessageWriter<AppExit>,
) {
    if died.read().any(|died| Some(died.entity) == script.subject()) {
        info!("subject died, stopping simulation");
        exit.write(AppExit::Success);
        return;
    }

    let Some(subject) = script.subject() else {
        return;
    };
    let regenerating = query
        .get(subject)
        .is_ok_and(|health| health.is_regenerating());

    if script.is_finished() && !regenerating {
        info!("script finished after {:.2}s", script.elapsed.as_secs_f32());
        exit.write(AppExit::Success);
    }
}

impl ScriptPlugin {
    pub fn new(script: Script) -> Self {
        ScriptPlugin { script }
    }
}

impl Action {
    pub fn apply(self, health: &mut HealthState) -> Result<Outcome, HealthError> {
        match self {
            Action::Damage(amount) => health.take_damage(amount),
            Action::Heal(amount) => health.heal(amount),
            Action::Potion(amount) => health.consume_potion(amount),
            Action::Regenerate { rate, duration } => health.apply_regeneration(rate, duration),
        }
    }
}

impl Script {
    pub fn new(config: HealthConfig, steps: impl IntoIterator<Item = (Duration, Action)>) -> Self {
        let mut steps: Vec<_> = steps.into_iter().collect();
        steps.sort_by_key(|&(at, _)| at);

        Script {
            config,
            steps: steps.into(),
            elapsed: Duration::ZERO,
            subject: None,
        }
    }

    pub fn demo(config: HealthConfig) -> Self {
        let secs = Duration::from_secs;

        Script::new(
            config,
            [
                (secs(1), Action::Damage(20.0)),
                (
                    secs(2),
                    Action::Regenerate {
                        rate: 10.0,
                        duration: secs(3),
                    },
                ),
                (secs(3), Action::Damage(15.0)),
                (
                    secs(4),
                    Action::Regenerate {
                        rate: 5.0,
                        duration: secs(4),
                    },
                ),
                (secs(6), Action::Potion(25.0)),
                (secs(7), Action::Heal(-5.0)),
                (secs(9), Action::Damage(90.0)),
                (secs(10), Action::Damage(200.0)),
                (secs(11), Action::Heal(50.0)),
            ],
        )
    }

    pub fn subject(&self) -> Option<Entity> {
        self.subject
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use bevy_app::prelude::*;
    use bevy_time::{TimePlugin, TimeUpdateStrategy, prelude::*};
    use vtl_display::{DisplayPlugin, display::HealthDisplay};
    use vtl_health::{
        HealthPlugin,
        config::HealthConfig,
        state::{HealthState, Outcome, Rejection},
    };

    use crate::script::{Action, Script, ScriptPlugin};

    #[test]
    fn steps_are_sorted() {
        let script = Script::new(
            HealthConfig::default(),
            [
                (Duration::from_secs(3), Action::Heal(1.0)),
                (Duration::from_secs(1), Action::Damage(1.0)),
            ],
        );

        assert_eq!(
            script.steps.front(),
            Some(&(Duration::from_secs(1), Action::Damage(1.0)))
        );
    }

    #[test]
    fn apply_actions() {
        let mut health = HealthState::new(HealthConfig::default()).unwrap();

        assert_eq!(Action::Damage(30.0).apply(&mut health), Ok(Outcome::Changed));
        assert_eq!(Action::Potion(10.0).apply(&mut health), Ok(Outcome::Changed));
        assert_eq!(
            Action::Heal(0.0).apply(&mut health),
            Ok(Outcome::Rejected(Rejection::NonPositiveAmount))
        );
        assert_eq!(
            Action::Regenerate {
                rate: 1.0,
                duration: Duration::from_secs(1),
            }
            .apply(&mut health),
            Ok(Outcome::Scheduled)
        );
        assert_relative_eq!(health.current_health().unwrap(), 80.0);
    }

    #[test]
    fn runs_script_until_death() {
        let mut app = make_app(Script::new(
            HealthConfig::default(),
            [
                (Duration::from_secs(1), Action::Damage(40.0)),
                (Duration::from_secs(2), Action::Damage(70.0)),
                (Duration::from_secs(3), Action::Heal(10.0)),
            ],
        ));

        app.update();
        let subject = app.world().resource::<Script>().subject().unwrap();
        let display = app.world().get::<HealthDisplay>(subject).unwrap();
        assert_eq!(display.readout().text, "Health: 60");

        app.update();
        let display = app.world().get::<HealthDisplay>(subject).unwrap();
        assert_eq!(display.readout().text, "Health: 0");
        assert!(app.should_exit().is_some());
    }

    fn make_app(script: Script) -> App {
        let mut app = App::new();
        app.add_plugins((
            TaskPoolPlugin::default(),
            TimePlugin,
            HealthPlugin,
            DisplayPlugin,
            ScriptPlugin::new(script),
        ));

        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs(1)));
        app.insert_resource(Time::<Virtual>::from_max_delta(Duration::MAX));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs(1)));

        app.world_mut()
            .resource_mut::<Time<Real>>()
            .update_with_duration(Duration::ZERO);

        app
    }
}
