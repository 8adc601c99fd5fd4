#![doc = include_str!("../README.md")]

mod error;

pub mod config;
pub mod frame;
pub mod packet;
pub mod stage;
pub mod transport;

pub use error::{Error, Result};
