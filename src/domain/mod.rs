// Domain layer: core models and ports (interfaces) for the remote capabilities.

pub mod model;
pub mod ports;
