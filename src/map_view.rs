//! 引擎与地图界面之间的接口

use crate::types::Bounds;

/// 初始视图中心
pub const INIT_LOCATION: (f64, f64) = (48.0, 14.0);

/// 初始缩放级别
pub const INIT_ZOOM: f64 = 5.0;

/// 地址搜索选中 / 提醒跳转使用的缩放级别
pub const FLY_ZOOM: f64 = 8.0;

/// 抓取 POI 所要求的最小缩放级别，低于该值时结果范围过大
pub const POI_MIN_REQUIRED_ZOOM: f64 = 8.0;

/// 由地图界面实现，供引擎读取视口并控制视图
pub trait MapView: Send + Sync {
    /// 当前视口边界
    fn viewport_bounds(&self) -> Bounds;

    /// 当前缩放级别
    fn zoom_level(&self) -> f64;

    /// 平滑移动视图到指定中心与缩放
    fn fly_to(&self, lat: f64, lon: f64, zoom: f64);
}
