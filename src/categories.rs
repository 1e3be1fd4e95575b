//! POI 类别目录
//!
//! 启动时从内置目录创建，会话期间不增删

use crate::types::Bounds;

/// 每个类别单次查询的默认结果上限
pub const DEFAULT_POI_LIMIT: u32 = 100;

/// 可选的 POI 类别，key 为 OSM amenity 标签值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiCategory {
    pub name: String,
    pub key: String,
    pub limit: u32,
}

impl PoiCategory {
    pub fn new(name: &str, key: &str, limit: u32) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            limit,
        }
    }

    /// 构建 Overpass QL 查询，同时取 node 和 way 两类要素
    pub fn overpass_query(&self, bounds: &Bounds) -> String {
        format!(
            "[out:json];(node[amenity={key}]({bbox});way[amenity={key}]({bbox}););out body {limit};",
            key = self.key,
            bbox = bounds.bbox(),
            limit = self.limit,
        )
    }
}

/// 内置类别目录
pub fn default_categories() -> Vec<PoiCategory> {
    [
        ("Cinema", "cinema"),
        ("Embassy", "embassy"),
        ("Hospital", "hospital"),
        ("University", "university"),
        ("Post Office", "post_office"),
        ("Hotel", "hotel"),
        ("Hostel", "hostel"),
        ("Cafe", "cafe"),
        ("Restaurant", "restaurant"),
        ("Museum", "museum"),
        ("Zoo", "zoo"),
        ("Theme Park", "theme_park"),
    ]
    .iter()
    .map(|(name, key)| PoiCategory::new(name, key, DEFAULT_POI_LIMIT))
    .collect()
}
