// Domain layer: MRZ models, ports and the scanning services. No IO here.

pub mod model;
pub mod ports;

pub mod services;
