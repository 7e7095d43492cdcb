pub mod colocate_errors;
pub mod constants;
pub mod contacts;
pub mod geodesy;
pub mod graph;
pub mod output;
pub mod params;
pub mod projection;
pub mod samples;
pub mod tiles;
pub mod time;
pub mod trajectories;
