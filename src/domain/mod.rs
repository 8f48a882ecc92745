// Domain layer: snapshot model, ports and the pure resolver.

pub mod model;
pub mod ports;

pub mod services;
