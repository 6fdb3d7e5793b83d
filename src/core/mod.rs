// src/core/mod.rs
mod engine;

// Host symbol API and the tree-sitter Java implementation
mod host;

// Intermediate model
mod model;

// Extraction and generation pipeline
mod extractor;
mod generator;

pub use engine::Engine;
