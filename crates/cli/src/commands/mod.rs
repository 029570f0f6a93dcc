pub mod configure;
pub mod debug;
pub mod metrics;
pub mod rankings;
pub mod tvl;
