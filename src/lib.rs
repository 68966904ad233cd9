// SPV allocation ledger: investor registry, subscription intake and the
// token allocation lifecycle behind an HTTP API

pub mod bulk;
pub mod chain;
pub mod commands;
pub mod config;
pub mod db;
pub mod domain;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
