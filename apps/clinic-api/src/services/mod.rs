//! Fluxos de negócio usados pelos handlers

pub mod accounts;
pub mod authentication;
pub mod ledger;
pub mod registration;
