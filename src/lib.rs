//! ip-changed: public IP change notifier
//!
//! A library for detecting changes of the machine's public IP address
//! and notifying by mail, Pushbullet or IFTTT. Meant to be driven by a
//! scheduled `ip-changed check`.

pub mod check;
pub mod config;
pub mod http;
pub mod notify;
pub mod resolver;
pub mod secret;
pub mod setup;
pub mod state;
