//! Core use-case services.
//!
//! # Responsibility
//! - Reconcile caller input with stored state through the Storage Port.
//! - Classify failures for the dispatcher.

pub mod employee_service;
