//! Blindbeat Library
//!
//! Core modules for the blindbeat multiplayer music guessing game.

pub mod config;
pub mod error;
pub mod matching;
pub mod net;
pub mod provider;
pub mod round;
pub mod session;
