pub mod master;
pub mod trade;

pub use master::Master;
pub use trade::{Trade, TradeType};
