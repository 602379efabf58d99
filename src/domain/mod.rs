// Domain layer: core models and ports (interfaces). Nothing here knows about adapters.

pub mod model;
pub mod ports;
