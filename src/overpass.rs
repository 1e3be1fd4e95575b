//! Overpass Interpreter 客户端
//!
//! 查询以表单 POST 发送，支持协作式取消

use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::types::Poi;

pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
});

/// 抓取过程中的错误分类
#[derive(Debug, Error)]
pub enum FetchError {
    /// 请求被主动取消（被新请求替代或类别被关闭）
    #[error("请求已取消")]
    Cancelled,
    #[error("请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP 错误: {0}")]
    Status(StatusCode),
}

impl FetchError {
    /// 取消是预期行为，不产生用户可见的错误提示
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// 执行一次可取消的 Overpass 查询
///
/// 取消信号在请求任意阶段生效，取消后的响应不会返回给调用方
pub async fn fetch_pois(
    endpoint: &str,
    query: &str,
    token: &CancellationToken,
) -> Result<Vec<Poi>, FetchError> {
    tokio::select! {
        _ = token.cancelled() => Err(FetchError::Cancelled),
        res = execute(endpoint, query) => res,
    }
}

async fn execute(endpoint: &str, query: &str) -> Result<Vec<Poi>, FetchError> {
    let response = HTTP_CLIENT
        .post(endpoint)
        .form(&[("data", query)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let data: Value = response.json().await?;
    Ok(filter_elements(&data))
}

/// 仅保留带数值坐标的要素，其余静默丢弃
pub(crate) fn filter_elements(data: &Value) -> Vec<Poi> {
    data.get("elements")
        .and_then(Value::as_array)
        .map(|elements| elements.iter().filter_map(parse_poi).collect())
        .unwrap_or_default()
}

fn parse_poi(raw: &Value) -> Option<Poi> {
    let lat = raw.get("lat")?.as_f64()?;
    let lon = raw.get("lon")?.as_f64()?;
    let id = raw.get("id").and_then(Value::as_i64).unwrap_or_default();
    let tags = raw
        .get("tags")
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();
    Some(Poi { id, lat, lon, tags })
}
