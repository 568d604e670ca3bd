//! Data model and deterministic primitives for the gatherer decision loop.
//!
//! Nothing in this crate performs I/O. Scene snapshots, creature state and inventories are plain
//! values produced by a simulator proxy; the activation vector and action enum are the contract
//! between fusion, arbitration and dispatch.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod activation;
pub mod cycle;
pub mod orientation;
pub mod rng;
pub mod scene;

pub use action::{CreatureAction, ParseActionError};
pub use activation::{ActivationVector, Slot, MAX_ACTIVATION, MIN_ACTIVATION};
pub use cycle::CycleContext;
pub use orientation::{degrees_to_radians, normalize_angle};
pub use rng::{DeterministicRng, SplitMix64};
pub use scene::{
    Category, ColorCounts, CreatureState, Inventory, JewelColor, Leaflet, WorldObject,
    LEAFLET_COUNT,
};
