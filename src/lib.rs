pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod processor;
pub mod reconcile;
pub mod static_data;
pub mod store;
pub mod system;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
