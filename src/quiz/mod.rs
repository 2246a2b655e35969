// src/quiz/mod.rs

pub mod aggregator;
pub mod catalog;
pub mod registry;
pub mod scoring;
pub mod session;
