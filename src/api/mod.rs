pub mod binance;
pub mod sampler;
