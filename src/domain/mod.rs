// Domain layer: report model, field tables and ports. No HTTP or filesystem here.

pub mod fields;
pub mod model;
pub mod ports;
