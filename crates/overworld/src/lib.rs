use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod ascii_map;
pub mod biome;
pub mod chunk;
pub mod chunk_manager;
pub mod config;
pub mod coords;
pub mod generator;
pub mod hash;
pub mod home_farm;
pub mod landmarks;
pub mod player;
pub mod tile;
pub mod world_error;
pub mod world_state;
pub mod world_state_migrate;

#[cfg(test)]
pub mod test_harness;

pub use chunk_manager::{ChunkManager, ChunkStats, StreamReport};
pub use config::{BoundsMode, WorldConfig};
pub use coords::{ChunkCoord, LocalPos, TilePos, TileRect};
pub use home_farm::HomeLayout;
pub use landmarks::{Landmark, LandmarkRegistry, LandmarkSource, Prefab};
pub use player::{PlayerPositionProvider, PlayerTile};
pub use tile::TileKind;
pub use world_error::WorldError;
pub use world_state::{WorldState, CURRENT_WORLD_STATE_VERSION};

// ---------------------------------------------------------------------------
// Saveable trait + registry for the extension map save pattern
// ---------------------------------------------------------------------------

/// Trait for resources that an external save collaborator persists through
/// an extension map of opaque byte blobs.
///
/// The collaborator never sees the resource's type: it iterates the
/// [`SaveableRegistry`] and stores whatever bytes each entry produces under
/// its key. A plugin opts in with `app.register_saveable::<T>()`.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key for this resource in the extension map.
    /// Must stay stable across versions; it is the only lookup on load.
    const SAVE_KEY: &'static str;

    /// Serialize this resource to bytes.
    /// Return `None` to skip saving (e.g. nothing worth persisting yet).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Deserialize from bytes, returning the restored resource.
    /// Must not fail: undecodable input yields a usable value.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning `Default` on failure.
/// Use this in `Saveable::load_from_bytes` implementations to surface decode errors.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

/// Save function stored in a [`SaveableEntry`].
pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
/// Load function stored in a [`SaveableEntry`].
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;

/// Type-erased save/load for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
}

/// Every saveable resource registered by plugins, in registration order.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register a resource type that implements [`Saveable`].
    ///
    /// A second registration under the same key is ignored with a warning.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!(
                "SaveableRegistry: duplicate key '{}', ignoring second registration",
                key
            );
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = T::load_from_bytes(bytes);
                world.insert_resource(value);
            }),
        });
    }

    /// Save all registered resources into an extension map.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Load registered resources from an extension map.
    /// Resources whose key is absent keep their current value.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }
}

/// `App` extension that registers a [`Saveable`] with the [`SaveableRegistry`],
/// creating the registry on first use.
pub trait SaveableAppExt {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self;
}

impl SaveableAppExt for App {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self {
        self.init_resource::<SaveableRegistry>();
        self.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<T>();
        self
    }
}

impl Saveable for ChunkManager {
    const SAVE_KEY: &'static str = "overworld_chunks";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        let state = self.state();
        if state.chunks.is_empty() {
            return None;
        }
        Some(bitcode::encode(&state))
    }

    /// Restores under the config stored in the state, so chunks that were
    /// not saved regenerate exactly as before.
    fn load_from_bytes(bytes: &[u8]) -> Self {
        let state: WorldState = decode_or_warn(Self::SAVE_KEY, bytes);
        ChunkManager::from_state(state)
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Ordering handle for hosts that read tiles in `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorldSet {
    Stream,
}

/// Result of the most recent streaming pass.
#[derive(Resource, Debug, Default, Clone)]
pub struct LastStreamReport(pub StreamReport);

/// Seeds the home farm at startup and streams chunks around [`PlayerTile`]
/// every frame.
///
/// Insert a [`WorldConfig`], [`HomeLayout`] or a prebuilt [`ChunkManager`]
/// before adding the plugin to override the defaults.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<WorldConfig>()
            .cloned()
            .unwrap_or_default();
        if !app.world().contains_resource::<ChunkManager>() {
            app.insert_resource(ChunkManager::with_config(config.clone()));
        }

        app.insert_resource(config)
            .init_resource::<HomeLayout>()
            .init_resource::<PlayerTile>()
            .init_resource::<LastStreamReport>()
            .add_systems(Startup, init_home_farm)
            .add_systems(
                Update,
                (
                    sync_world_config,
                    stream_chunks::<PlayerTile>.in_set(WorldSet::Stream),
                )
                    .chain(),
            )
            .register_saveable::<ChunkManager>();
    }
}

/// A loaded save replaces the manager wholesale; mirror its config back
/// into the `WorldConfig` resource.
fn sync_world_config(manager: Res<ChunkManager>, mut config: ResMut<WorldConfig>) {
    if manager.is_changed() && *config != *manager.config() {
        info!(
            "World config now seed {} ({:?}) from the loaded world",
            manager.config().seed,
            manager.config().bounds_mode
        );
        *config = manager.config().clone();
    }
}

fn init_home_farm(layout: Res<HomeLayout>, mut manager: ResMut<ChunkManager>) {
    manager.init_home(&layout.tiles, layout.width, layout.height);
}

/// Load/evict around whatever `P` reports. Generation runs inline, so tiles
/// are readable by later systems in the same frame.
fn stream_chunks<P: PlayerPositionProvider + Resource>(
    player: Res<P>,
    mut manager: ResMut<ChunkManager>,
    mut last: ResMut<LastStreamReport>,
) {
    let Some(pos) = player.player_tile() else {
        return;
    };
    let report = manager.update_player_position(pos.col, pos.row);
    if !report.is_empty() {
        last.0 = report;
    }
}
