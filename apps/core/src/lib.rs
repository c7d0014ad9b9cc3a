pub mod action_executor;
pub mod catalog;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod discovery;
pub mod dispatcher;
pub mod logging;
pub mod merge;
pub mod model;
pub mod revision_store;
pub mod runtime;
pub mod search;
pub mod transport;
