//! Extraction domain

pub mod adapters;
pub mod extract;
pub mod reflect;
