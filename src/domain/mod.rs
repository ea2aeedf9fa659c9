// Domain layer: input records, the validated batch, and ports (interfaces).

pub mod batch;
pub mod model;
pub mod ports;
