//! Chess rules and legality engine built on a cell grid with a live attack
//! map, plus a turn controller for interactive play.

pub mod config;
pub mod engine;
