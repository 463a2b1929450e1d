//! Core staging logic: types, resolution, recipe and response building.

pub mod action;
pub mod config;
pub mod error;
pub mod policy;
pub mod recipe;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod stager;
pub mod tailor;
pub mod types;
