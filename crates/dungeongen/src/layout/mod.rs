//! Layout generation: room placement, connectivity, spring relaxation, corridor
//! routing and the assembled [`DungeonLayout`] value.

pub mod assembler;
pub mod connectivity;
pub mod flags;
pub mod geometry;
pub mod model;
pub mod postprocess;
pub mod routing;
pub mod sampler;
pub mod spatial;
pub mod spring;
pub mod triangulation;

#[cfg(test)]
mod tests;

pub use assembler::{LayoutChanges, LayoutError, assemble, validate};
pub use connectivity::{ConnectivityConfig, connect, is_connected};
pub use geometry::{Bounds, Coordinate, Direction};
pub use model::{
    Connection, ConnectionType, CorridorPath, DungeonLayout, HallwayType, Metadata, Room,
    RoomFlags, RoomShape, SizeCategory, Viewport,
};
pub use postprocess::{Identity, PostProcess};
pub use routing::route_all;
pub use routing::types::RoutingConfig;
pub use sampler::{Placement, RoomSampler, SamplerConfig, SizeDistribution};
pub use spring::{LayoutQuality, Relaxation, SpringConfig};
