/// 候选 emoji（下拉框中的一行）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 短码（不含两侧冒号），例如 `smile`
    pub shortcode: String,
    /// 对应的 emoji 字形
    pub glyph: String,
}

impl Candidate {
    pub fn new(shortcode: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            shortcode: shortcode.into(),
            glyph: glyph.into(),
        }
    }

    /// 下拉框中展示的标签：`:shortcode:`
    pub fn label(&self) -> String {
        format!(":{}:", self.shortcode)
    }
}

/// 触发检测结果。
///
/// `start` 是触发符（`:` 或 `#`）在传入文本窗口中的**字符**偏移。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerHit {
    /// 完整的 `:shortcode:`，且短码存在于索引中：直接替换
    Instant { start: usize, glyph: String },
    /// `:query` / `#query`：弹出补全（1..=limit 个候选）
    Autocomplete {
        start: usize,
        candidates: Vec<Candidate>,
    },
}

impl TriggerHit {
    pub fn start(&self) -> usize {
        match self {
            TriggerHit::Instant { start, .. } | TriggerHit::Autocomplete { start, .. } => *start,
        }
    }
}

/// 替换发生的位置：宿主拥有的区域引用 + 触发起点 + 当前光标。
#[derive(Debug, Clone)]
pub struct Anchor<R> {
    pub region: R,
    pub start: usize,
    pub cursor: usize,
}

/// 会话给 UI 的只读快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// 触发符起点
    pub start: usize,
    /// 打开会话时的光标位置
    pub cursor: usize,
    /// 当前候选列表
    pub candidate_list: Vec<Candidate>,
    /// 高亮行
    pub selected: usize,
}

impl UiState {
    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.candidate_list.get(self.selected)
    }
}
