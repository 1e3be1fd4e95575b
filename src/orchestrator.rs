//! POI 抓取调度
//!
//! 每个类别同一时刻至多一个在途请求，发起新请求前先取消旧请求；
//! 视口变化时刷新所有启用的类别

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::categories::{default_categories, PoiCategory};
use crate::map_view::{MapView, POI_MIN_REQUIRED_ZOOM};
use crate::overpass::{self, OVERPASS_URL};
use crate::types::PoiEvent;

/// 低缩放提醒的重复抑制时长
pub const ADVISORY_COOLDOWN: Duration = Duration::from_secs(60);

/// 单个类别的运行时状态
struct CategoryState {
    meta: PoiCategory,
    active: bool,
    /// 在途请求的取消句柄，有在途请求时才持有
    token: Option<CancellationToken>,
    /// 每次发起新请求时递增，用于丢弃过期响应
    generation: u64,
}

pub struct PoiOrchestrator {
    view: Arc<dyn MapView>,
    events: mpsc::Sender<PoiEvent>,
    endpoint: String,
    categories: Mutex<HashMap<String, CategoryState>>,
    pending: AtomicUsize,
    last_advisory: Mutex<Option<Instant>>,
    advisory_cooldown: Duration,
}

impl PoiOrchestrator {
    pub fn new(view: Arc<dyn MapView>, events: mpsc::Sender<PoiEvent>) -> Arc<Self> {
        Self::with_options(view, events, OVERPASS_URL, ADVISORY_COOLDOWN)
    }

    pub fn with_options(
        view: Arc<dyn MapView>,
        events: mpsc::Sender<PoiEvent>,
        endpoint: &str,
        advisory_cooldown: Duration,
    ) -> Arc<Self> {
        let categories = default_categories()
            .into_iter()
            .map(|meta| {
                let state = CategoryState {
                    meta,
                    active: false,
                    token: None,
                    generation: 0,
                };
                (state.meta.key.clone(), state)
            })
            .collect();

        Arc::new(Self {
            view,
            events,
            endpoint: endpoint.to_string(),
            categories: Mutex::new(categories),
            pending: AtomicUsize::new(0),
            last_advisory: Mutex::new(None),
            advisory_cooldown,
        })
    }

    /// 未完成的请求数
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.categories
            .lock()
            .get(key)
            .map(|s| s.active)
            .unwrap_or(false)
    }

    /// 当前启用的类别 key 列表
    pub fn active_categories(&self) -> Vec<String> {
        self.categories
            .lock()
            .values()
            .filter(|s| s.active)
            .map(|s| s.meta.key.clone())
            .collect()
    }

    /// 切换类别启用状态。打开时立即按当前视口抓取，
    /// 关闭时仅取消在途请求，不提示用户
    pub async fn set_category_active(self: &Arc<Self>, key: &str, active: bool) {
        {
            let mut cats = self.categories.lock();
            let Some(state) = cats.get_mut(key) else {
                log::warn!("未知的 POI 类别: {}", key);
                return;
            };
            state.active = active;
            if !active {
                if let Some(token) = state.token.take() {
                    log::debug!("取消 {} 的在途请求: 类别已关闭", state.meta.name);
                    token.cancel();
                }
                return;
            }
        }
        self.start_fetch(key).await;
    }

    /// 视口变化（平移/缩放结束）后的整体刷新。
    /// 缩放级别过低时先拉近视图，约束查询范围
    pub async fn viewport_changed(self: &Arc<Self>) {
        if self.view.zoom_level() < POI_MIN_REQUIRED_ZOOM {
            let (lat, lon) = self.view.viewport_bounds().center();
            self.view.fly_to(lat, lon, POI_MIN_REQUIRED_ZOOM);
        }
        let active: Vec<String> = self.active_categories();
        for key in active {
            self.start_fetch(&key).await;
        }
    }

    /// 打开 POI 面板时检查缩放级别，必要时发出提醒。
    /// 冷却期内不重复提醒
    pub async fn panel_opened(&self) {
        if self.view.zoom_level() >= POI_MIN_REQUIRED_ZOOM {
            return;
        }
        {
            let mut last = self.last_advisory.lock();
            match *last {
                Some(at) if at.elapsed() < self.advisory_cooldown => return,
                _ => *last = Some(Instant::now()),
            }
        }
        let _ = self.events.send(PoiEvent::LowZoomAdvisory).await;
    }

    /// 用户接受提醒后跳转到满足抓取要求的缩放级别
    pub fn accept_advisory(&self) {
        let (lat, lon) = self.view.viewport_bounds().center();
        self.view.fly_to(lat, lon, POI_MIN_REQUIRED_ZOOM);
    }

    /// 为指定类别发起一次抓取。已有在途请求时先取消再替换
    async fn start_fetch(self: &Arc<Self>, key: &str) {
        let (name, query, token, generation) = {
            let mut cats = self.categories.lock();
            let Some(state) = cats.get_mut(key) else {
                return;
            };
            if !state.active {
                log::warn!("尝试为未启用的类别 {} 发起抓取", key);
                return;
            }
            if let Some(old) = state.token.take() {
                log::debug!("取消 {} 的在途请求: 已被新请求替代", state.meta.name);
                old.cancel();
            }
            let bounds = self.view.viewport_bounds();
            if !bounds.is_valid() {
                log::warn!("视口边界无效，跳过 {} 的抓取: {:?}", state.meta.name, bounds);
                return;
            }
            let token = CancellationToken::new();
            state.token = Some(token.clone());
            state.generation += 1;
            (
                state.meta.name.clone(),
                state.meta.overpass_query(&bounds),
                token,
                state.generation,
            )
        };

        let count = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.events.send(PoiEvent::PendingCountChanged(count)).await;

        let this = Arc::clone(self);
        let key = key.to_string();
        tokio::spawn(async move {
            let result = overpass::fetch_pois(&this.endpoint, &query, &token).await;

            match result {
                Ok(pois) => {
                    if this.settle_handle(&key, generation) {
                        log::info!("{} 抓取完成，共 {} 个 POI", name, pois.len());
                        let _ = this
                            .events
                            .send(PoiEvent::FetchSucceeded { name: name.clone() })
                            .await;
                        let _ = this.events.send(PoiEvent::ResultsUpdated { key, pois }).await;
                    } else {
                        log::debug!("丢弃 {} 的过期响应", name);
                    }
                }
                Err(err) if err.is_cancelled() => {
                    log::debug!("{} 的请求已取消", name);
                }
                Err(err) => {
                    if this.settle_handle(&key, generation) {
                        log::error!("抓取 {} 失败: {}", name, err);
                        let _ = this.events.send(PoiEvent::FetchFailed { name }).await;
                    } else {
                        log::debug!("丢弃 {} 的过期错误: {}", name, err);
                    }
                }
            }

            // 与发起时的递增配对，任何结果都会执行
            let count = this.release_pending();
            let _ = this.events.send(PoiEvent::PendingCountChanged(count)).await;
        });
    }

    /// 若该代次仍是当前在途请求则清除取消句柄。
    /// 返回 true 表示结果仍然有效（类别启用且未被新请求替代）
    fn settle_handle(&self, key: &str, generation: u64) -> bool {
        let mut cats = self.categories.lock();
        let Some(state) = cats.get_mut(key) else {
            return false;
        };
        if state.generation != generation {
            return false;
        }
        state.token = None;
        state.active
    }

    /// 递减未完成请求数，下限为 0
    fn release_pending(&self) -> usize {
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
        self.pending.load(Ordering::SeqCst)
    }
}
