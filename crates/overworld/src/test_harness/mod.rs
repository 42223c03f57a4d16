//! # TestWorld: headless harness for the chunk world
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `WorldPlugin` so integration
//! tests can move the player, run frames and inspect the `ChunkManager`
//! without a window or renderer.

mod assertions;

use bevy::app::App;
use bevy::prelude::*;

use crate::chunk_manager::{ChunkManager, StreamReport};
use crate::config::WorldConfig;
use crate::coords::{ChunkCoord, TilePos};
use crate::home_farm::HomeLayout;
use crate::player::PlayerTile;
use crate::tile::TileKind;
use crate::{LastStreamReport, SaveableRegistry, WorldPlugin};

pub struct TestWorld {
    app: App,
}

impl TestWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default world with the built-in farm, after the first frame.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(config);
        app.add_plugins(WorldPlugin);
        // Startup runs init_home.
        app.update();
        Self { app }
    }

    /// World whose home layout is `layout` instead of the built-in farm.
    pub fn with_layout(layout: HomeLayout) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(layout);
        app.add_plugins(WorldPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Place the player and run one frame.
    pub fn walk_to(&mut self, col: i32, row: i32) -> &mut Self {
        self.app.world_mut().resource_mut::<PlayerTile>().set(col, row);
        self.app.update();
        self
    }

    /// Walk tile by tile along a straight line, one frame per tile.
    pub fn walk_line(&mut self, from: TilePos, to: TilePos) -> &mut Self {
        let steps = from.chebyshev(to).max(1);
        for i in 0..=steps {
            let col = from.col + (to.col - from.col) * i / steps;
            let row = from.row + (to.row - from.row) * i / steps;
            self.walk_to(col, row);
        }
        self
    }

    pub fn run_frames(&mut self, n: u32) -> &mut Self {
        for _ in 0..n {
            self.app.update();
        }
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn manager(&self) -> &ChunkManager {
        self.app.world().resource::<ChunkManager>()
    }

    pub fn manager_mut(&mut self) -> Mut<'_, ChunkManager> {
        self.app.world_mut().resource_mut::<ChunkManager>()
    }

    pub fn tile(&self, col: i32, row: i32) -> Option<TileKind> {
        self.manager().tile(col, row)
    }

    pub fn loaded_count(&self) -> usize {
        self.manager().loaded_chunk_count()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.manager().is_loaded(coord)
    }

    pub fn last_report(&self) -> &StreamReport {
        &self.app.world().resource::<LastStreamReport>().0
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Every registered saveable, as the save collaborator would write it.
    pub fn save_extensions(&self) -> std::collections::BTreeMap<String, Vec<u8>> {
        let world = self.app.world();
        world.resource::<SaveableRegistry>().save_all(world)
    }

    /// Feed an extension map back through the registry.
    pub fn load_extensions(&mut self, extensions: &std::collections::BTreeMap<String, Vec<u8>>) {
        let world = self.app.world_mut();
        world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.load_all(world, extensions);
        });
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
