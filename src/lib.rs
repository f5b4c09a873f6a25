// src/lib.rs

//! Manga series and chapter ingestion library.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod queue;
pub mod services;
pub mod storage;
pub mod utils;
