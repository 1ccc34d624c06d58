use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;

use crate::{HealthSystems, state::HealthState};

pub struct DeathPlugin;

#[derive(Copy, Clone, Component, Debug, Default)]
#[component(storage = "SparseSet")]
pub struct Dead;

#[derive(Copy, Clone, Debug, Message)]
pub struct Died {
    pub entity: Entity,
}

impl Plugin for DeathPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<Died>();

        app.add_systems(
            PostUpdate,
            detect_deaths.in_set(HealthSystems::DetectDeaths),
        );
    }
}

pub fn detect_deaths(
    mut commands: Commands,
    query: Query<(Entity, &HealthState), (Changed<HealthState>, Without<Dead>)>,
    mut died: MessageWriter<Died>,
) {
    for (id, health) in &query {
        if let Ok(true) = health.is_dead() {
            info!("entity {id:?} died");

            commands.entity(id).try_insert(Dead);
            died.write(Died { entity: id });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy_app::prelude::*;
    use bevy_ecs::prelude::*;
    use bevy_time::{TimePlugin, TimeUpdateStrategy, prelude::*};

    use crate::{
        HealthPlugin, HealthSystems,
        config::HealthConfig,
        death::{Dead, Died},
        state::HealthState,
    };

    #[derive(Default, Resource)]
    struct Deaths(Vec<Entity>);

    #[test]
    fn damage_marks_entity_dead() {
        let mut app = make_app();
        let entity = app
            .world_mut()
            .spawn(HealthState::new(HealthConfig::default()).unwrap())
            .id();

        app.update();
        assert!(app.world().get::<Dead>(entity).is_none());
        assert!(app.world().resource::<Deaths>().0.is_empty());

        app.world_mut()
            .get_mut::<HealthState>(entity)
            .unwrap()
            .take_damage(120.0)
            .unwrap();
        app.update();

        assert!(app.world().get::<Dead>(entity).is_some());
        assert_eq!(app.world().resource::<Deaths>().0, vec![entity]);

        app.world_mut()
            .get_mut::<HealthState>(entity)
            .unwrap()
            .take_damage(10.0)
            .unwrap();
        app.update();

        assert_eq!(app.world().resource::<Deaths>().0, vec![entity]);
    }

    #[test]
    fn spawned_at_zero_is_marked_on_damage() {
        let mut app = make_app();
        let entity = app
            .world_mut()
            .spawn(
                HealthState::new(HealthConfig::default().with_start_health_percent(0.0)).unwrap(),
            )
            .id();

        app.update();

        assert!(app.world().get::<Dead>(entity).is_none());
        assert!(app.world().resource::<Deaths>().0.is_empty());

        app.world_mut()
            .get_mut::<HealthState>(entity)
            .unwrap()
            .take_damage(1.0)
            .unwrap();
        app.update();

        assert!(app.world().get::<Dead>(entity).is_some());
        assert_eq!(app.world().resource::<Deaths>().0, vec![entity]);
    }

    #[test]
    fn uninitialized_health_is_not_dead() {
        let mut app = make_app();
        let entity = app.world_mut().spawn(HealthState::default()).id();

        app.update();

        assert!(app.world().get::<Dead>(entity).is_none());
        assert!(app.world().resource::<Deaths>().0.is_empty());
    }

    fn collect_deaths(mut reader: MessageReader<Died>, mut deaths: ResMut<Deaths>) {
        deaths.0.extend(reader.read().map(|died| died.entity));
    }

    fn make_app() -> App {
        let mut app = App::new();
        app.add_plugins((TaskPoolPlugin::default(), TimePlugin, HealthPlugin));

        app.init_resource::<Deaths>();
        app.add_systems(
            PostUpdate,
            collect_deaths.after(HealthSystems::DetectDeaths),
        );

        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs(1)));
        app.insert_resource(Time::<Virtual>::from_max_delta(Duration::MAX));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs(1)));

        app.world_mut()
            .resource_mut::<Time<Real>>()
            .update_with_duration(Duration::ZERO);

        app
    }
}
