// src/lib.rs

//! Budget Finder Library
//!
//! Searches the web for fiscal-year budget documents, scans non-document
//! hits for embedded links, and groups the unique document URLs by year.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
