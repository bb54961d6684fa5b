//! `Session`：对宿主（wasm / CLI）提供的会话对象。
//!
//! `Session` 自身不做业务判断，而是：
//! - 持有 `Engine`（索引 + 设置）
//! - 持有 `Context`（会话状态 + 下拉框）
//! - 把每次 `InputEvent` 依次交给 processors，直到被消费
//! - 最后输出 `ProcessStatus` + `Action`

use crate::{
    config::SettingsStore,
    context::{Context, Dropdown},
    engine::Engine,
    index::EmojiIndex,
    key_event::{Action, InputEvent},
    model::UiState,
    processor::{
        CancelProcessor, CommitProcessor, EditingProcessor, NavigationProcessor, ProcessStatus,
        Processor,
    },
    region::EditableRegion,
};

/// 补全会话（Idle / Open 状态机的容器）。
pub struct Session<I, R> {
    /// 引擎（索引、设置、候选上限）
    engine: Engine<I>,
    /// 会话上下文（processors 共享）
    ctx: Context<R>,
    /// processors 链
    processors: Vec<Box<dyn Processor<R>>>,
}

impl<I, R> Session<I, R>
where
    I: EmojiIndex,
    R: EditableRegion + Clone + 'static,
{
    /// 创建会话，并组装默认 processors 链。
    pub fn new(engine: Engine<I>, surface: Box<dyn Dropdown>) -> Self {
        Self {
            engine,
            ctx: Context::new(surface),
            processors: vec![
                Box::new(EditingProcessor),
                Box::new(NavigationProcessor),
                Box::new(CommitProcessor),
                Box::new(CancelProcessor),
            ],
        }
    }

    /// 读取初始设置并订阅后续变更。
    pub fn attach_settings(&self, store: &dyn SettingsStore) {
        let handle = self.engine.settings().clone();
        handle.set(store.load());
        store.subscribe(Box::new(move |change| handle.apply(change)));
    }

    pub fn engine(&self) -> &Engine<I> {
        &self.engine
    }

    pub fn is_open(&self) -> bool {
        self.ctx.is_open()
    }

    /// 获取当前 UI 快照（只读）；Idle 时为 `None`。
    pub fn ui_state(&self) -> Option<UiState> {
        self.ctx.ui_state()
    }

    /// 处理一个输入事件，返回是否消费与动作列表。
    pub fn handle(&mut self, ev: InputEvent<R>) -> (ProcessStatus, Vec<Action>) {
        let mut actions = Vec::new();
        let mut status = ProcessStatus::Continue;
        for p in &mut self.processors {
            let (s, mut a) = p.process(&self.engine, &mut self.ctx, &ev);
            actions.append(&mut a);
            if s == ProcessStatus::Consume {
                status = s;
                break;
            }
        }
        (status, actions)
    }
}
