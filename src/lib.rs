// src/lib.rs

//! reservcal: short-term-rental calendar importer library

pub mod error;
pub mod ics;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
