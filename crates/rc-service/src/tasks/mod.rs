//! Background tasks for the Room Controller.

pub mod record_expiry;
