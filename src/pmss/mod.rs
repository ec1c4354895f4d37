//! Core PMss snapshot reader module

pub mod boundary;
pub mod error;
pub mod models;
pub mod swap;
mod blocks;
mod header;
mod stream;

pub use stream::{ParticleStream, PmssReadOptions};
