// Domain layer: registry documents, derived test groups and the ports the core depends on.

pub mod model;
pub mod ports;
