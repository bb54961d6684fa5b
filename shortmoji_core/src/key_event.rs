/// 会话关心的按键（语义键，不是平台键值）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
}

impl Key {
    /// DOM `KeyboardEvent.key` -> 语义键；其它键返回 `None`。
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowUp" => Some(Key::ArrowUp),
            "Enter" => Some(Key::Enter),
            "Tab" => Some(Key::Tab),
            "Escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

/// 指针按下的位置（由宿主根据下拉框的渲染范围判定）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// 下拉框中的第 n 行
    Row(usize),
    /// 下拉框内部但不在任何行上
    Dropdown,
    /// 下拉框之外
    Outside,
}

/// 输入事件（逻辑事件）。
///
/// 说明：
/// - `Session`/processor 只关心“语义事件”
/// - 宿主层（wasm / CLI）负责把 DOM 或终端事件转换成这些事件
#[derive(Debug, Clone)]
pub enum InputEvent<R> {
    /// 区域内容被编辑（input 事件）
    Edit(R),
    /// 按键
    Key(Key),
    /// 指针按下
    PointerDown(PointerTarget),
    /// 焦点移动：`Some` 为进入某个可编辑区域，`None` 为移到非可编辑元素
    Focus(Option<R>),
}

/// 引擎输出动作（报告给宿主，用于日志/演示）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 已把触发文本替换为该字形
    Commit(String),
    /// 下拉框打开或刷新
    Open,
    /// 会话关闭
    Close,
}
