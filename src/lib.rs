//! 地图 POI 叠加引擎
//!
//! 面向交互式地图界面的无头后端：按类别从 Overpass API 抓取 POI，
//! 同一类别的新请求会取消并替代旧请求，视口变化时刷新所有启用的类别，
//! 并附带防抖的 Nominatim 地址搜索。界面层通过 [`MapView`] 提供视口，
//! 通过事件通道接收结果与提示。

pub mod categories;
pub mod geocoder;
pub mod map_view;
pub mod orchestrator;
pub mod overpass;
pub mod types;

pub use categories::{default_categories, PoiCategory, DEFAULT_POI_LIMIT};
pub use geocoder::{Geocoder, Place};
pub use map_view::{MapView, FLY_ZOOM, INIT_LOCATION, INIT_ZOOM, POI_MIN_REQUIRED_ZOOM};
pub use orchestrator::{PoiOrchestrator, ADVISORY_COOLDOWN};
pub use overpass::{FetchError, OVERPASS_URL};
pub use types::{Bounds, Poi, PoiEvent};
