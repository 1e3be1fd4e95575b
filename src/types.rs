use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 地图视口边界（南/西/北/东）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    /// 验证边界是否有效
    pub fn is_valid(&self) -> bool {
        self.north > self.south && self.east > self.west
            && self.north <= 90.0 && self.south >= -90.0
            && self.east <= 180.0 && self.west >= -180.0
    }

    /// 视口中心点 (lat, lon)
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Overpass 查询使用的 bbox 串：south,west,north,east
    pub fn bbox(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// 过滤后的兴趣点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: HashMap<String, String>,
}

/// 推送给界面层的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiEvent {
    /// 某类别的结果已更新，整体替换该类别之前的结果
    ResultsUpdated { key: String, pois: Vec<Poi> },
    /// 单次抓取成功
    FetchSucceeded { name: String },
    /// 单次抓取失败，取消不算失败
    FetchFailed { name: String },
    /// 未完成请求数变化，界面以最新值覆盖上一条提示
    PendingCountChanged(usize),
    /// 缩放级别过低提醒
    LowZoomAdvisory,
}
