use crate::config::{Settings, SettingsHandle};
use crate::index::EmojiIndex;
use crate::model::{Candidate, TriggerHit};
use crate::search::{MAX_CANDIDATES, PrefixRanker, Ranker};
use crate::trigger;

/// 引擎：持有索引与设置，编排 trigger -> search。
///
/// 结构上对应流水线：
/// - engine（编排） -> trigger（后缀匹配） -> search（前缀优先排序 + 截断） -> `TriggerHit`
pub struct Engine<I> {
    /// emoji 索引（内置表、TSV 或其它实现）
    index: I,
    /// 当前设置；由设置存储的订阅回调更新
    settings: SettingsHandle,
    /// 候选数量（1-8）；超出范围时回退到默认值
    candidate_limit: u8,
}

impl<I> Engine<I>
where
    I: EmojiIndex,
{
    pub fn new(index: I) -> Self {
        Self {
            index,
            settings: SettingsHandle::default(),
            candidate_limit: MAX_CANDIDATES as u8,
        }
    }

    /// 设置候选数量上限（1..=8）；非法值会回退到 8。
    pub fn candidate_limit(mut self, limit: u8) -> Self {
        if limit < 1 || usize::from(limit) > MAX_CANDIDATES {
            self.candidate_limit = MAX_CANDIDATES as u8;
        } else {
            self.candidate_limit = limit;
        }
        self
    }

    /// 使用外部共享的设置句柄。
    pub fn with_settings(mut self, settings: SettingsHandle) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn search(&self, query: &str) -> Vec<Candidate> {
        PrefixRanker { index: &self.index }.rank(query, usize::from(self.candidate_limit))
    }

    /// 对光标前文本做触发检测；是否允许即时替换取自当前设置。
    pub fn detect(&self, before: &str) -> Option<TriggerHit> {
        let Settings { auto_replace, .. } = self.settings.get();
        trigger::detect(
            &self.index,
            before,
            auto_replace,
            usize::from(self.candidate_limit),
        )
    }
}

/// 给 processors 的对象安全引擎接口。
pub trait EngineFacade {
    fn enabled(&self) -> bool;
    fn detect(&self, before: &str) -> Option<TriggerHit>;
}

impl<I> EngineFacade for Engine<I>
where
    I: EmojiIndex,
{
    fn enabled(&self) -> bool {
        self.settings.get().enabled
    }

    fn detect(&self, before: &str) -> Option<TriggerHit> {
        Engine::<I>::detect(self, before)
    }
}
