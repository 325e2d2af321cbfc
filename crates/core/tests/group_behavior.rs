//! Fire groups: cooling fan-out, balancing, deduplicated notification and
//! slot rebuilding

mod common;

use approx::assert_relative_eq;
use common::{still_config, world, world_with};
use fire_engine_core::{
    FireEvent, FireParticle, FireReceiver, FireWorld, GroupId, IgnitionCause, SourceId, UnitId,
};

fn house(world: &mut FireWorld, rooms: usize) -> (GroupId, Vec<UnitId>) {
    let children: Vec<UnitId> = (0..rooms)
        .map(|i| world.spawn_unit(format!("room{i}"), "room"))
        .collect();
    let group = world.spawn_group("house", children.clone(), Vec::new());
    (group, children)
}

fn started_events(events: &[FireEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, FireEvent::StartedBurning { .. }))
        .count()
}

#[test]
fn test_hose_split_over_burning_children() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 3);
    world.receive_fire_energy(rooms[0], 60.0, 1.0, SourceId(1));
    world.receive_fire_energy(rooms[1], 60.0, 1.0, SourceId(1));
    world.tick(1.0);
    assert!(world.is_burning(rooms[0]));
    assert!(world.is_burning(rooms[1]));
    assert!(!world.is_burning(rooms[2]));

    world.add_cooling_energy_source(group, SourceId(7), 30.0, 10.0);
    world.tick(1.0);

    for &room in &rooms[..2] {
        let unit = world.unit(room).expect("room");
        assert_relative_eq!(unit.energy(), 45.0);
        let share = unit.cooling_sources().get(SourceId(7)).expect("fanned out");
        assert_relative_eq!(share.extinguish, 15.0);
        assert_eq!(share.cooling, 0.0);
    }
    let idle = world.unit(rooms[2]).expect("room");
    let share = idle.cooling_sources().get(SourceId(7)).expect("fanned out");
    assert_eq!(share.extinguish, 0.0);
    assert_relative_eq!(share.cooling, 10.0);
    assert_eq!(idle.energy(), 0.0);
}

#[test]
fn test_fan_out_follows_burning_set() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 2);
    world.add_cooling_energy_source(group, SourceId(7), 20.0, 5.0);

    world.receive_fire_energy(rooms[0], 60.0, 1.0, SourceId(1));
    world.tick(1.0);
    // Ignited this tick with the non-burning share; next tick takes the full extinguish
    world.tick(1.0);

    let share = world
        .unit(rooms[0])
        .expect("room")
        .cooling_sources()
        .get(SourceId(7))
        .expect("registered");
    assert_relative_eq!(share.extinguish, 20.0);
    assert_eq!(share.cooling, 0.0);

    world.remove_cooling_energy_source(group, SourceId(7));
    for room in rooms {
        assert!(world.unit(room).expect("room").cooling_sources().is_empty());
    }
    assert!(world.group(group).expect("group").cooling_sources().is_empty());
}

#[test]
fn test_one_started_event_per_episode() {
    let (mut world, counter) = world();
    let (group, _) = house(&mut world, 4);

    world.start_fire_on_all(group, IgnitionCause::Scripted);
    let events = world.drain_events();
    assert_eq!(
        events,
        vec![FireEvent::StartedBurning {
            receiver: FireReceiver::Group(group),
            cause: IgnitionCause::Scripted,
        }]
    );
    assert_eq!(counter.get(), 1);
    assert_eq!(world.group(group).expect("group").num_fire_objects(), 4);

    world.tick(1.0);
    assert_eq!(started_events(&world.drain_events()), 0);

    world.stop_fire(group);
    assert_eq!(
        world.drain_events(),
        vec![FireEvent::StoppedBurning {
            receiver: FireReceiver::Group(group),
            destroyed: false,
            scripted_cleanup: false,
        }]
    );
    assert_eq!(counter.get(), 0);

    // A new episode announces itself again
    assert!(world.start_fire(group, IgnitionCause::Scripted));
    assert_eq!(started_events(&world.drain_events()), 1);
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_simultaneous_ignition_in_one_tick() {
    let (mut world, counter) = world();
    let (group, rooms) = house(&mut world, 3);

    world.receive_fire_energy(group, 180.0, 1.0, SourceId(2));
    world.tick(1.0);

    assert!(rooms.iter().all(|room| world.is_burning(*room)));
    let events = world.drain_events();
    assert_eq!(started_events(&events), 1);
    assert_eq!(
        events[0],
        FireEvent::StartedBurning {
            receiver: FireReceiver::Group(group),
            cause: IgnitionCause::Source(SourceId(2)),
        }
    );
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_balancing_ignites_sibling() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 2);

    world.receive_fire_energy(rooms[0], 100.0, 1.0, SourceId(1));
    world.tick(1.0);

    let hot = world.unit(rooms[0]).expect("room").energy();
    let cold = world.unit(rooms[1]).expect("room").energy();
    // Overflow above 80 is 20, half of it moves per tick
    assert_relative_eq!(hot, 90.0, epsilon = 1e-4);
    assert_relative_eq!(cold, 10.0, epsilon = 1e-4);
    assert_relative_eq!(hot + cold, 100.0, epsilon = 1e-3);
    assert!(world.is_burning(rooms[1]));
    assert_eq!(started_events(&world.drain_events()), 1);
    assert!(world.is_burning(group));
}

#[test]
fn test_group_burns_out() {
    let (mut world, counter) = world();
    let (group, _) = house(&mut world, 2);

    world.start_fire(group, IgnitionCause::Scripted);
    world.drain_events();
    world.destroy_by_fire(group);

    assert!(world.is_burned(group));
    assert!(!world.is_burning(group));
    assert_eq!(counter.get(), 0);
    assert_eq!(
        world.drain_events(),
        vec![FireEvent::StoppedBurning {
            receiver: FireReceiver::Group(group),
            destroyed: true,
            scripted_cleanup: false,
        }]
    );
    assert_eq!(world.group(group).expect("group").damage_percent(), 1.0);
}

#[test]
fn test_group_cleanup_is_scripted() {
    let (mut world, counter) = world();
    let (group, rooms) = house(&mut world, 2);

    world.start_fire_on_all(group, IgnitionCause::Scripted);
    world.tick(1.0);
    world.drain_events();
    assert!(!world.is_ready_for_cleanup(group));

    world.cleanup(group);
    assert_eq!(counter.get(), 0);
    assert_eq!(
        world.drain_events(),
        vec![FireEvent::StoppedBurning {
            receiver: FireReceiver::Group(group),
            destroyed: false,
            scripted_cleanup: true,
        }]
    );
    assert!(world.is_ready_for_cleanup(group));
    assert!(!world.group(group).expect("group").started_burning_notified());
    for room in rooms {
        assert_eq!(world.unit(room).expect("room").total_damage(), 0.0);
    }
    assert!(!world.is_achievement_eligible(group));
}

#[test]
fn test_group_particles_follow_children() {
    let (mut world, _) = world();
    let rooms: Vec<UnitId> = (0..2)
        .map(|i| world.spawn_unit(format!("room{i}"), "room"))
        .collect();
    let particles = vec![world.spawn_particle(), world.spawn_particle()];
    let group = world.spawn_group("house", rooms.clone(), particles.clone());

    assert_eq!(world.unit(rooms[0]).expect("room").particles(), &[particles[0]]);
    assert_eq!(world.unit(rooms[1]).expect("room").particles(), &[particles[1]]);

    world.start_fire(rooms[1], IgnitionCause::Scripted);
    assert_eq!(world.particle(particles[0]), Some(FireParticle::HIDDEN));
    assert_eq!(world.particle(particles[1]), Some(FireParticle::BURNING));

    world.stop_fire(group);
    assert_eq!(world.particle(particles[1]), Some(FireParticle::HIDDEN));
}

#[test]
fn test_slot_rebuild_drops_dead_children() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 3);

    world.despawn_unit(rooms[1]);
    let extra = world.spawn_unit("annex", "room");
    assert!(world.set_group_slots(group, vec![rooms[0], rooms[1], extra], Vec::new()));

    let fire_group = world.group(group).expect("group");
    assert_eq!(fire_group.children(), &[rooms[0], extra]);
    assert_eq!(world.unit(extra).expect("annex").group(), Some(group));
    // Left out of the new slots
    assert_eq!(world.unit(rooms[2]).expect("room").group(), None);
}

#[test]
fn test_slot_edit_strips_group_cooling_from_released_child() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 2);
    world.add_cooling_energy_source(group, SourceId(7), 30.0, 10.0);
    world.tick(1.0);
    assert!(world
        .unit(rooms[1])
        .expect("room")
        .cooling_sources()
        .get(SourceId(7))
        .is_some());

    // The released room keeps its own hose
    world.add_cooling_energy_source(rooms[1], SourceId(9), 0.0, 4.0);
    assert!(world.set_group_slots(group, vec![rooms[0]], Vec::new()));

    let released = world.unit(rooms[1]).expect("room");
    assert_eq!(released.group(), None);
    assert!(released.cooling_sources().get(SourceId(7)).is_none());
    assert!(released.cooling_sources().get(SourceId(9)).is_some());

    world.remove_cooling_energy_source(group, SourceId(7));
    world.tick(1.0);
    for &room in &rooms {
        let unit = world.unit(room).expect("room");
        assert!(unit.cooling_sources().get(SourceId(7)).is_none());
    }
}

#[test]
fn test_group_without_children_is_burned() {
    let (mut world, _) = world();
    let ghost = world.spawn_unit("ghost", "room");
    world.despawn_unit(ghost);

    let group = world.spawn_group("ruin", vec![ghost], Vec::new());
    assert!(world.is_burned(group));
    assert!(!world.is_burning(group));
    assert!(!world.start_fire(group, IgnitionCause::Scripted));
    assert!(!world.is_achievement_eligible(group));
}

#[test]
fn test_despawn_group_releases_children() {
    let (mut world, counter) = world();
    let (group, rooms) = house(&mut world, 2);
    world.start_fire(group, IgnitionCause::Scripted);
    assert_eq!(counter.get(), 1);

    assert!(world.despawn_group(group).is_some());
    assert!(!world.is_burning(group));
    for &room in &rooms {
        assert_eq!(world.unit(room).expect("room").group(), None);
    }

    // The burning room now reports on its own
    assert_eq!(counter.get(), 1);
    let burning = rooms
        .into_iter()
        .find(|room| world.is_burning(*room))
        .expect("one room burns");
    world.drain_events();
    world.stop_fire(burning);
    assert_eq!(counter.get(), 0);
    assert_eq!(
        world.drain_events(),
        vec![FireEvent::StoppedBurning {
            receiver: FireReceiver::Unit(burning),
            destroyed: false,
            scripted_cleanup: false,
        }]
    );
}

#[test]
fn test_random_child_is_reproducible() {
    let burning_index = |seed: u64| {
        let (mut world, _) = world_with(fire_engine_core::FireEngineConfig {
            seed,
            ..still_config()
        });
        let (group, rooms) = house(&mut world, 6);
        world.start_fire(group, IgnitionCause::Scripted);
        rooms.iter().position(|room| world.is_burning(*room))
    };

    let first = burning_index(11).expect("one room burns");
    assert_eq!(burning_index(11), Some(first));
}

#[test]
fn test_dead_child_is_skipped() {
    let (mut world, _) = world();
    let (group, rooms) = house(&mut world, 3);
    world.despawn_unit(rooms[0]);

    world.start_fire_on_all(group, IgnitionCause::Scripted);
    world.add_cooling_energy_source(group, SourceId(1), 10.0, 1.0);
    world.tick(1.0);

    assert!(world.is_burning(group));
    assert_eq!(world.group(group).expect("group").num_fire_objects(), 2);
}
