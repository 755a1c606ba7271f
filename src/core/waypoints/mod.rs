pub mod waypoint_args;
pub mod waypoint_models;
pub mod waypoint_service;

pub use waypoint_args::parse_waypoint_args;
pub use waypoint_models::{display_name, Coordinates, WaypointDocument};
pub use waypoint_service::{WaypointError, WaypointService};
