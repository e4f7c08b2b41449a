use super::detail::DetailState;
use super::search::SearchState;
use crate::config::Config;
use crate::registry::{ApiError, PackageDetail};
use std::time::{Duration, Instant};

/// 提示信息显示时长
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

// ========== 枚举 ==========

/// 当前键盘焦点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Filter,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

// ========== 事件 ==========

#[derive(Debug)]
pub enum AppEvent {
    SearchResults {
        seq: u64,
        names: Vec<String>,
    },
    SearchFailed {
        seq: u64,
        error: ApiError,
    },
    DetailLoaded {
        seq: u64,
        name: String,
        detail: Box<PackageDetail>,
    },
    DetailFailed {
        seq: u64,
        name: String,
        error: ApiError,
    },
}

// ========== App ==========

pub struct App {
    pub config: Config,
    pub focus: Focus,
    pub search: SearchState,
    pub detail: DetailState,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            search: SearchState::new(&config),
            detail: DetailState::new(),
            config,
            focus: Focus::Search,
            notice: None,
            should_quit: false,
        }
    }

    /// Tab 循环切换焦点；没有详情时跳过详情面板
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Filter,
            Focus::Filter if self.detail.current.is_some() => Focus::Detail,
            Focus::Filter | Focus::Detail => Focus::Search,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Search if self.detail.current.is_some() => Focus::Detail,
            Focus::Search | Focus::Detail => Focus::Filter,
            Focus::Filter => Focus::Search,
        };
    }

    pub fn notify(&mut self, message: String) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, message: String) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            message,
            shown_at: Instant::now(),
        });
    }

    /// 清除过期提示
    pub fn expire_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice {
            if now.duration_since(notice.shown_at) >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    /// 处理后台任务回传的事件
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchResults { seq, names } => {
                self.search.apply_results(seq, names);
            }
            AppEvent::SearchFailed { seq, error } => {
                if self.search.apply_failure(seq) {
                    log::warn!("搜索失败: {}", error);
                    self.notify_error(format!("Search failed: {error}"));
                }
            }
            AppEvent::DetailLoaded { seq, name, detail } => {
                let loaded = name.clone();
                if self.detail.apply_loaded(seq, name, *detail) {
                    log::info!("已加载 {} 详情", loaded);
                }
            }
            AppEvent::DetailFailed { seq, name, error } => {
                if self.detail.apply_failure(seq, &error) {
                    log::warn!("获取 {} 详情失败: {}", name, error);
                    if self.detail.current.is_none() && self.focus == Focus::Detail {
                        self.focus = Focus::Search;
                    }
                    self.notify_error(format!("Could not load {name}: {error}"));
                }
            }
        }
    }
}
