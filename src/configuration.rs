use crate::schedule::Schedule;
use serde::Serialize;
use std::path::PathBuf;

/// Static details shown in the restaurant info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

pub trait Configuration: Clone + Send + Sync + 'static {
    fn restaurant(&self) -> RestaurantInfo;
    fn frontend_path(&self) -> PathBuf;
    fn port(&self) -> String;
    fn schedule(&self) -> Schedule;
}
