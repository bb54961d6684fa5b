//! `processor`：输入事件处理链。
//!
//! 按顺序处理 `InputEvent`，对 `Context` 做状态变更，并可产生 `Action`。
//!
//! 当前链路（`Session::new` 默认组装）：
//! - `EditingProcessor`：编辑 / 焦点事件，重新检测触发
//! - `NavigationProcessor`：上下方向键循环移动高亮
//! - `CommitProcessor`：Enter / Tab / 点击候选行，替换并关闭
//! - `CancelProcessor`：Escape / 点击下拉框外部，直接关闭

use crate::{
    context::Context,
    engine::EngineFacade,
    key_event::{Action, InputEvent, Key, PointerTarget},
    region::EditableRegion,
};

/// Processor 执行结果：是否“消费”了本次事件。
///
/// - `Consume`：事件已被处理，后续 processor 不再执行；宿主需阻止其默认行为并停止传播
/// - `Continue`：交给下一个 processor；链尾仍是 `Continue` 时宿主放行原生事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Consume,
    Continue,
}

/// Processor：处理输入事件并改变 Context；必要时产生输出动作。
pub trait Processor<R> {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context<R>,
        input_event: &InputEvent<R>,
    ) -> (ProcessStatus, Vec<Action>);
}

/// 编辑与焦点事件。
pub struct EditingProcessor;

impl<R> Processor<R> for EditingProcessor
where
    R: EditableRegion + Clone,
{
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context<R>,
        input_event: &InputEvent<R>,
    ) -> (ProcessStatus, Vec<Action>) {
        match input_event {
            InputEvent::Edit(region) => {
                // 总开关关闭时完全不介入
                if !engine.enabled() {
                    return (ProcessStatus::Continue, Vec::new());
                }
                // input 事件不可取消，这里的 Consume 只用于截断链路
                (ProcessStatus::Consume, context.reanalyze(engine, region))
            }
            InputEvent::Focus(region) => (
                ProcessStatus::Continue,
                context.focus_changed(region.as_ref()),
            ),
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct NavigationProcessor;

impl<R> Processor<R> for NavigationProcessor
where
    R: EditableRegion + Clone,
{
    fn process(
        &mut self,
        _engine: &dyn EngineFacade,
        context: &mut Context<R>,
        input_event: &InputEvent<R>,
    ) -> (ProcessStatus, Vec<Action>) {
        if !context.is_open() {
            return (ProcessStatus::Continue, Vec::new());
        }
        match input_event {
            InputEvent::Key(Key::ArrowDown) => {
                context.navigate(1);
                (ProcessStatus::Consume, Vec::new())
            }
            InputEvent::Key(Key::ArrowUp) => {
                context.navigate(-1);
                (ProcessStatus::Consume, Vec::new())
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct CommitProcessor;

impl<R> Processor<R> for CommitProcessor
where
    R: EditableRegion + Clone,
{
    fn process(
        &mut self,
        _engine: &dyn EngineFacade,
        context: &mut Context<R>,
        input_event: &InputEvent<R>,
    ) -> (ProcessStatus, Vec<Action>) {
        if !context.is_open() {
            return (ProcessStatus::Continue, Vec::new());
        }
        match *input_event {
            InputEvent::Key(Key::Enter) | InputEvent::Key(Key::Tab) => {
                (ProcessStatus::Consume, context.commit_selected())
            }
            InputEvent::PointerDown(PointerTarget::Row(i)) => {
                (ProcessStatus::Consume, context.commit(i))
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct CancelProcessor;

impl<R> Processor<R> for CancelProcessor
where
    R: EditableRegion + Clone,
{
    fn process(
        &mut self,
        _engine: &dyn EngineFacade,
        context: &mut Context<R>,
        input_event: &InputEvent<R>,
    ) -> (ProcessStatus, Vec<Action>) {
        if !context.is_open() {
            return (ProcessStatus::Continue, Vec::new());
        }
        match *input_event {
            InputEvent::Key(Key::Escape) => (ProcessStatus::Consume, context.close()),
            // 外部点击照常生效，只是顺带关闭下拉框
            InputEvent::PointerDown(PointerTarget::Outside) => {
                (ProcessStatus::Continue, context.close())
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}
