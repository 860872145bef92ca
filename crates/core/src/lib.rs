pub mod config;
pub mod config_loader;
pub mod error;
pub mod hedge;
pub mod traits;

pub use config::{
    AppConfig, DatabaseConfig, HedgeConfig, HedgeConfigOverride, HedgeMode, ServerConfig,
};
pub use config_loader::ConfigLoader;
pub use error::CoreError;
pub use hedge::{
    ExposureDirection, ExposureInput, HedgeClose, HedgeReason, HedgeRow, HedgeSide, HedgeSignal,
    HedgeStatus, NewHedge, OrderType, SignalDirection, SIGNAL_SOURCE,
};
pub use traits::{HedgeStore, SignalPublisher, TradeLedger};
