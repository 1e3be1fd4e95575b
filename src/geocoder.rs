//! Nominatim 地址搜索
//!
//! 输入防抖，重新输入时取消上一次未完成的搜索

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// 输入防抖时长
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);

/// 触发搜索的最小输入长度
pub const MIN_QUERY_LEN: usize = 3;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
});

/// 单条地址建议，Nominatim 以字符串返回经纬度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl Place {
    /// 解析坐标 (lat, lon)
    pub fn coords(&self) -> Option<(f64, f64)> {
        Some((self.lat.parse().ok()?, self.lon.parse().ok()?))
    }
}

pub struct Geocoder {
    endpoint: String,
    debounce: Duration,
    suggestions: mpsc::Sender<Vec<Place>>,
    /// 未完成搜索的取消句柄，覆盖防抖计时与请求两个阶段
    inflight: Mutex<Option<CancellationToken>>,
}

impl Geocoder {
    pub fn new(suggestions: mpsc::Sender<Vec<Place>>) -> Arc<Self> {
        Self::with_options(suggestions, NOMINATIM_URL, SEARCH_DEBOUNCE)
    }

    pub fn with_options(
        suggestions: mpsc::Sender<Vec<Place>>,
        endpoint: &str,
        debounce: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
            debounce,
            suggestions,
            inflight: Mutex::new(None),
        })
    }

    /// 输入变化时调用。取消上一次搜索后重新计时，
    /// 输入过短时直接清空建议列表
    pub fn search(self: &Arc<Self>, term: &str) {
        let token = CancellationToken::new();
        if let Some(old) = self.inflight.lock().replace(token.clone()) {
            old.cancel();
        }

        let this = Arc::clone(self);
        let term = term.trim().to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(this.debounce) => {}
            }

            if term.chars().count() < MIN_QUERY_LEN {
                let _ = this.suggestions.send(Vec::new()).await;
                return;
            }

            let request = async {
                let response = HTTP_CLIENT
                    .get(&this.endpoint)
                    .query(&[("format", "json"), ("q", term.as_str())])
                    .send()
                    .await?;
                response.json::<Vec<Place>>().await
            };

            let places = tokio::select! {
                _ = token.cancelled() => return,
                res = request => match res {
                    Ok(places) => places,
                    Err(err) => {
                        log::warn!("地址搜索失败: {}", err);
                        return;
                    }
                },
            };

            let _ = this.suggestions.send(places).await;
        });
    }

    /// 清空搜索状态，例如面板关闭时
    pub fn reset(&self) {
        if let Some(token) = self.inflight.lock().take() {
            token.cancel();
        }
    }
}
