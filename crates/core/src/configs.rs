//! Configuration file formats
//!
//! `reactor.yml` at the reactor root describes the modules, lifecycle bindings and
//! inline plugins. Additional plugin descriptors live in `.reactor/plugins/*.yml`.

pub mod plugin;
pub mod reactor;
