//! Fireline - Fire Support Coordination Core

pub mod approval;
pub mod artillery;
pub mod command;
pub mod core;
pub mod fires;
pub mod geo;
pub mod ledger;
pub mod logistics;
pub mod notify;
pub mod persist;
pub mod roster;
pub mod unit;
pub mod world;
