//! Bloom Bot — conversational flower-shop core.

pub mod cart;
pub mod catalog;
pub mod channels;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod external;
pub mod nav;
pub mod screens;
pub mod session;
pub mod store;
pub mod wizard;
