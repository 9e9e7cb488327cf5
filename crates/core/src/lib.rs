pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{AppConfig, EsiConfig, RankBy, ScanConfig};
pub use config_loader::ConfigLoader;
pub use error::{ConfigError, FetchError};
pub use traits::MarketDataClient;
pub use types::{
    ItemTypeId, MarketOrder, Opportunity, OrderBookSnapshot, PriceCandidate, RegionId,
    VolumeSample,
};
