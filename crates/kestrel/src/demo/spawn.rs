//! # World Population
//!
//! Seeds a world from its [`WorldConfig`]. The same seed always produces the
//! same entities, in the same order, with the same values.

use kestrel_core::{EntityHandle, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::components::{Lifetime, Position, Velocity};
use super::systems::{LifetimeSystem, MovementSystem, TextRenderSystem};
use crate::config::WorldConfig;

/// Half-extent of the cube positions are drawn from.
const SPAWN_EXTENT: f32 = 10.0;

/// Maximum speed along each axis.
const MAX_SPEED: f32 = 1.0;

/// Handles of the entities created by [`populate_world`], by role.
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// Enabled entities with position and velocity.
    pub moving: Vec<EntityHandle>,
    /// Enabled entities with position only.
    pub statics: Vec<EntityHandle>,
    /// Moving entities created disabled.
    pub disabled: Vec<EntityHandle>,
}

impl Population {
    /// Total entities created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moving.len() + self.statics.len() + self.disabled.len()
    }

    /// Returns `true` if nothing was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Adds the demo systems `config` asks for and creates its entities.
///
/// Systems: movement always, lifetime if `lifetime_seconds` is set, text
/// render if `render_every > 0`.
pub fn populate_world(world: &mut World, config: &WorldConfig) -> Population {
    world.add_system_with(MovementSystem::new);
    if config.lifetime_seconds.is_some() {
        world.add_system_with(LifetimeSystem::new);
    }
    if config.render_every > 0 {
        world.add_system_with(|registry| TextRenderSystem::new(registry, config.render_every));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut population = Population::default();

    for _ in 0..config.moving_entities {
        population
            .moving
            .push(spawn_moving(world, &mut rng, config, true));
    }
    for _ in 0..config.static_entities {
        let position = random_position(&mut rng);
        population
            .statics
            .push(world.add_entity_with_component(position).handle());
    }
    for _ in 0..config.disabled_entities {
        population
            .disabled
            .push(spawn_moving(world, &mut rng, config, false));
    }

    population
}

fn spawn_moving(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &WorldConfig,
    enabled: bool,
) -> EntityHandle {
    let position = random_position(rng);
    let velocity = Velocity::new(
        rng.gen_range(-MAX_SPEED..=MAX_SPEED),
        rng.gen_range(-MAX_SPEED..=MAX_SPEED),
        rng.gen_range(-MAX_SPEED..=MAX_SPEED),
    );

    let entity = world.add_entity(enabled);
    entity.add_component(position);
    entity.add_component(velocity);
    if let Some(seconds) = config.lifetime_seconds {
        // Stagger expiry over the second half of the configured lifetime
        entity.add_component(Lifetime::new(seconds * rng.gen_range(0.5..=1.0)));
    }
    entity.handle()
}

fn random_position(rng: &mut ChaCha8Rng) -> Position {
    Position::new(
        rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::KindRegistry;

    fn config() -> WorldConfig {
        WorldConfig {
            moving_entities: 4,
            static_entities: 2,
            disabled_entities: 1,
            lifetime_seconds: Some(1.0),
            render_every: 5,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_population_counts() {
        let mut world = World::new(KindRegistry::new());
        let population = populate_world(&mut world, &config());

        assert_eq!(population.len(), 7);
        assert_eq!(world.entity_count(), 7);
        assert_eq!(world.active_entity_count(), 6);
        assert_eq!(world.system_count(), 3);
    }

    #[test]
    fn test_optional_systems() {
        let mut world = World::new(KindRegistry::new());
        let config = WorldConfig {
            lifetime_seconds: None,
            render_every: 0,
            ..config()
        };
        populate_world(&mut world, &config);

        assert!(world.has_system::<MovementSystem>());
        assert!(!world.has_system::<LifetimeSystem>());
        assert!(!world.has_system::<TextRenderSystem>());
        let first = world.entity_order()[0];
        assert!(!world.entity(first).unwrap().has_component::<Lifetime>());
    }

    #[test]
    fn test_same_seed_same_world() {
        let positions = |seed| {
            let mut world = World::new(KindRegistry::new());
            let population = populate_world(&mut world, &WorldConfig { seed, ..config() });
            population
                .moving
                .iter()
                .map(|&handle| *world.entity(handle).unwrap().get_component::<Position>().unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(positions(9), positions(9));
        assert_ne!(positions(9), positions(10));
    }

    #[test]
    fn test_lifetimes_are_staggered_within_bounds() {
        let mut world = World::new(KindRegistry::new());
        let population = populate_world(&mut world, &config());

        for &handle in &population.moving {
            let lifetime = world.entity(handle).unwrap().get_component::<Lifetime>().unwrap();
            assert!((0.5..=1.0).contains(&lifetime.remaining));
        }
    }
}
