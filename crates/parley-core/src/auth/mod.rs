//! Registration, login, and per-user style preferences.

pub mod hasher;
pub mod service;
