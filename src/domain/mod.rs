//! Domain layer - pools, integer AMM math, routing and risk

pub mod math;
pub mod pool;
pub mod risk;
pub mod routing;
