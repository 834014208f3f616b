//! LearnHub - Course marketplace backend.
//!
//! Catalog browsing, enrollment, and paid checkout, built around a purchase
//! ledger that is reconciled from asynchronous, possibly duplicated,
//! possibly out-of-order payment gateway events — while guaranteeing a user
//! is enrolled in a course exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
