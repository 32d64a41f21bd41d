// Domain layer: reference-table models and ports. Pure data, no I/O.

pub mod model;
pub mod ports;
