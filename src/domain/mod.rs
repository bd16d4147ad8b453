// Domain layer: step outcomes and the ports the bootstrapper drives.

pub mod model;
pub mod ports;
