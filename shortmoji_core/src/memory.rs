//! `memory`：内存中的宿主实现（CLI 演示与测试共用）。
//!
//! - `FieldHandle`：扁平文本框；光标位置通过模拟“镜像元素”的等宽排版测得
//! - `RichHandle`：富文本区域；按节点组织，光标是 `(节点, 节点内偏移)`
//! - `MemoryDropdown`：记录渲染状态的下拉框
//!
//! 替换都会压入撤销栈，模拟原生“插入文本”命令的撤销语义。

use std::{cell::RefCell, rc::Rc};

use crate::{
    caret::{self, Point, Rect, Size},
    context::Dropdown,
    model::Candidate,
    region::{EditableRegion, RegionError, splice_chars},
};

/// 等宽排版参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// 区域左上角（视口坐标）
    pub origin: Point,
    /// 每行字符数（超出即折行）
    pub columns: usize,
    /// 单个字符格大小；高度即行高
    pub cell: Size,
    pub padding: f64,
    /// 区域当前滚动偏移
    pub scroll: Point,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            origin: Point::new(20.0, 40.0),
            columns: 40,
            cell: Size::new(8.0, 16.0),
            padding: 2.0,
            scroll: Point::default(),
        }
    }
}

impl TextMetrics {
    /// pre-wrap 排版下，文本末尾所在的 (列, 行)。
    fn layout_end(&self, text: &str) -> (usize, usize) {
        let columns = self.columns.max(1);
        let (mut col, mut row) = (0usize, 0usize);
        for ch in text.chars() {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            if col == columns {
                row += 1;
                col = 0;
            }
            col += 1;
        }
        (col, row)
    }

    fn width(&self) -> f64 {
        self.columns as f64 * self.cell.width + self.padding * 2.0
    }
}

#[derive(Debug)]
struct MemoryField {
    value: String,
    cursor: usize,
    focused: bool,
    undo: Vec<(String, usize)>,
    metrics: TextMetrics,
}

/// 内存扁平文本框的句柄（克隆共享同一个文本框）。
#[derive(Debug, Clone)]
pub struct FieldHandle(Rc<RefCell<MemoryField>>);

impl FieldHandle {
    /// 新建文本框，光标位于末尾。
    pub fn new(value: &str) -> Self {
        Self::with_metrics(value, TextMetrics::default())
    }

    pub fn with_metrics(value: &str, metrics: TextMetrics) -> Self {
        Self(Rc::new(RefCell::new(MemoryField {
            value: value.to_owned(),
            cursor: value.chars().count(),
            focused: false,
            undo: Vec::new(),
            metrics,
        })))
    }

    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn cursor(&self) -> usize {
        self.0.borrow().cursor
    }

    pub fn set_cursor(&self, cursor: usize) {
        let mut f = self.0.borrow_mut();
        f.cursor = cursor.min(f.value.chars().count());
    }

    pub fn is_focused(&self) -> bool {
        self.0.borrow().focused
    }

    pub fn set_scroll(&self, scroll: Point) {
        self.0.borrow_mut().metrics.scroll = scroll;
    }

    /// 模拟用户在光标处键入（宿主随后应派发 `InputEvent::Edit`）。
    pub fn type_str(&self, s: &str) {
        let mut f = self.0.borrow_mut();
        let cursor = f.cursor;
        if splice_chars(&mut f.value, cursor, cursor, s).is_ok() {
            f.cursor = cursor + s.chars().count();
        }
    }

    /// 模拟退格。
    pub fn backspace(&self) {
        let mut f = self.0.borrow_mut();
        let cursor = f.cursor;
        if cursor > 0 && splice_chars(&mut f.value, cursor - 1, cursor, "").is_ok() {
            f.cursor = cursor - 1;
        }
    }

    /// 撤销最近一次替换；没有可撤销的内容时返回 `false`。
    pub fn undo(&self) -> bool {
        let mut f = self.0.borrow_mut();
        match f.undo.pop() {
            Some((value, cursor)) => {
                f.value = value;
                f.cursor = cursor;
                true
            }
            None => false,
        }
    }
}

impl EditableRegion for FieldHandle {
    fn text_before_cursor(&self) -> Option<String> {
        let f = self.0.borrow();
        Some(f.value.chars().take(f.cursor).collect())
    }

    fn cursor_offset(&self) -> Option<usize> {
        Some(self.0.borrow().cursor)
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<(), RegionError> {
        let mut f = self.0.borrow_mut();
        f.focused = true;
        let snapshot = (f.value.clone(), f.cursor);
        splice_chars(&mut f.value, start, end, text)?;
        f.undo.push(snapshot);
        f.cursor = start + text.chars().count();
        Ok(())
    }

    fn locate_caret(&self) -> Option<Point> {
        let f = self.0.borrow();
        let m = f.metrics;
        let before: String = f.value.chars().take(f.cursor).collect();
        let (col, row) = m.layout_end(&before);

        // 离屏镜像：与文本框同宽同内边距
        let mirror = Rect::new(-9999.0, 0.0, m.width(), (row + 1) as f64 * m.cell.height);
        let marker = Rect::new(
            mirror.left + m.padding + col as f64 * m.cell.width,
            mirror.top + m.padding + row as f64 * m.cell.height,
            0.0,
            m.cell.height,
        );
        let field = Rect::new(m.origin.x, m.origin.y, m.width(), m.cell.height * 4.0);
        Some(caret::field_caret(field, mirror, marker, m.scroll, m.cell.height))
    }

    fn same_region(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// 富文本中的节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    Text(String),
    /// 非文本节点（例如 `<br>`、`<img>`）
    Element(String),
}

#[derive(Debug)]
struct MemoryRich {
    nodes: Vec<MemoryNode>,
    /// (节点下标, 节点内偏移)；`None` 表示没有选区
    caret: Option<(usize, usize)>,
    undo: Vec<(Vec<MemoryNode>, Option<(usize, usize)>)>,
    metrics: TextMetrics,
}

/// 内存富文本区域的句柄。每个节点占一行。
#[derive(Debug, Clone)]
pub struct RichHandle(Rc<RefCell<MemoryRich>>);

impl RichHandle {
    pub fn new(nodes: Vec<MemoryNode>) -> Self {
        Self(Rc::new(RefCell::new(MemoryRich {
            nodes,
            caret: None,
            undo: Vec::new(),
            metrics: TextMetrics::default(),
        })))
    }

    /// 只有一个文本节点、光标在末尾的富文本区域。
    pub fn from_text(text: &str) -> Self {
        let r = Self::new(vec![MemoryNode::Text(text.to_owned())]);
        r.set_caret(Some((0, text.chars().count())));
        r
    }

    pub fn set_caret(&self, caret: Option<(usize, usize)>) {
        self.0.borrow_mut().caret = caret;
    }

    pub fn caret(&self) -> Option<(usize, usize)> {
        self.0.borrow().caret
    }

    pub fn nodes(&self) -> Vec<MemoryNode> {
        self.0.borrow().nodes.clone()
    }

    /// 在光标所在文本节点中键入。
    pub fn type_str(&self, s: &str) {
        let mut r = self.0.borrow_mut();
        let Some((n, off)) = r.caret else { return };
        if let Some(MemoryNode::Text(t)) = r.nodes.get_mut(n) {
            if splice_chars(t, off, off, s).is_ok() {
                r.caret = Some((n, off + s.chars().count()));
            }
        }
    }

    pub fn undo(&self) -> bool {
        let mut r = self.0.borrow_mut();
        match r.undo.pop() {
            Some((nodes, caret)) => {
                r.nodes = nodes;
                r.caret = caret;
                true
            }
            None => false,
        }
    }
}

impl EditableRegion for RichHandle {
    fn text_before_cursor(&self) -> Option<String> {
        let r = self.0.borrow();
        let (n, off) = r.caret?;
        match r.nodes.get(n)? {
            MemoryNode::Text(t) => Some(t.chars().take(off).collect()),
            MemoryNode::Element(_) => None,
        }
    }

    fn cursor_offset(&self) -> Option<usize> {
        self.0.borrow().caret.map(|(_, off)| off)
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<(), RegionError> {
        let mut r = self.0.borrow_mut();
        let (n, _) = r.caret.ok_or(RegionError::NoSelection)?;
        let snapshot = (r.nodes.clone(), r.caret);
        match r.nodes.get_mut(n) {
            Some(MemoryNode::Text(t)) => splice_chars(t, start, end, text)?,
            _ => return Err(RegionError::NotTextNode),
        }
        r.undo.push(snapshot);
        r.caret = Some((n, start + text.chars().count()));
        Ok(())
    }

    fn locate_caret(&self) -> Option<Point> {
        let r = self.0.borrow();
        let (n, off) = r.caret?;
        let m = r.metrics;
        let rect = match r.nodes.get(n)? {
            // 空文本节点没有渲染几何
            MemoryNode::Text(t) if !t.is_empty() => Rect::new(
                m.origin.x + m.padding + off as f64 * m.cell.width,
                m.origin.y + m.padding + n as f64 * m.cell.height,
                0.0,
                m.cell.height,
            ),
            _ => Rect::default(),
        };
        caret::rich_caret(rect)
    }

    fn same_region(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// 下拉框当前的渲染状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropdownState {
    pub rows: Vec<Candidate>,
    pub selected: usize,
    pub visible: bool,
    pub position: Point,
    /// `populate` 被调用的次数（同一个下拉框被重复填充）
    pub populated: usize,
}

/// 记录渲染状态的内存下拉框；克隆共享同一份状态。
#[derive(Debug, Clone)]
pub struct MemoryDropdown {
    state: Rc<RefCell<DropdownState>>,
    viewport: Size,
    row_height: f64,
    width: f64,
}

impl MemoryDropdown {
    pub fn new(viewport: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(DropdownState::default())),
            viewport,
            row_height: 28.0,
            width: 240.0,
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state.borrow().clone()
    }
}

impl Default for MemoryDropdown {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Dropdown for MemoryDropdown {
    fn populate(&mut self, candidates: &[Candidate], selected: usize) {
        let mut s = self.state.borrow_mut();
        s.rows = candidates.to_vec();
        s.selected = selected;
        s.populated += 1;
    }

    fn highlight(&mut self, selected: usize) {
        self.state.borrow_mut().selected = selected;
    }

    fn measure(&mut self) -> Size {
        let mut s = self.state.borrow_mut();
        s.visible = true;
        Size::new(self.width, s.rows.len() as f64 * self.row_height + 8.0)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn move_to(&mut self, position: Point) {
        self.state.borrow_mut().position = position;
    }

    fn hide(&mut self) {
        let mut s = self.state.borrow_mut();
        s.visible = false;
        s.rows.clear();
        s.selected = 0;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_replace_is_undoable() {
        let mut f = FieldHandle::new("hi :fire");
        f.replace_range(3, 8, "🔥").unwrap();
        assert_eq!(f.value(), "hi 🔥");
        assert_eq!(f.cursor(), 4);
        assert!(f.is_focused());
        assert!(f.undo());
        assert_eq!(f.value(), "hi :fire");
        assert_eq!(f.cursor(), 8);
        assert!(!f.undo());
    }

    #[test]
    fn field_replace_out_of_bounds_leaves_value() {
        let mut f = FieldHandle::new("abc");
        assert!(f.replace_range(2, 9, "x").is_err());
        assert_eq!(f.value(), "abc");
        assert!(!f.undo());
    }

    #[test]
    fn field_caret_tracks_wrapping_and_scroll() {
        let m = TextMetrics::default();
        let f = FieldHandle::with_metrics("ab", m);
        let p = f.locate_caret().unwrap();
        assert_eq!(p.x, m.origin.x + m.padding + 2.0 * m.cell.width);
        assert_eq!(p.y, m.origin.y + m.padding + m.cell.height);

        let f = FieldHandle::with_metrics("line one\nx", m);
        let p = f.locate_caret().unwrap();
        assert_eq!(p.x, m.origin.x + m.padding + m.cell.width);
        assert_eq!(p.y, m.origin.y + m.padding + 2.0 * m.cell.height);

        f.set_scroll(Point::new(0.0, 16.0));
        let p = f.locate_caret().unwrap();
        assert_eq!(p.y, m.origin.y + m.padding + m.cell.height);

        let long = "x".repeat(m.columns + 3);
        let p = FieldHandle::with_metrics(&long, m).locate_caret().unwrap();
        assert_eq!(p.x, m.origin.x + m.padding + 3.0 * m.cell.width);
    }

    #[test]
    fn rich_text_before_cursor_is_node_local() {
        let r = RichHandle::new(vec![
            MemoryNode::Text("first line".into()),
            MemoryNode::Text("say :smi".into()),
        ]);
        r.set_caret(Some((1, 8)));
        assert_eq!(r.text_before_cursor().as_deref(), Some("say :smi"));
        assert_eq!(r.cursor_offset(), Some(8));
        r.set_caret(None);
        assert_eq!(r.text_before_cursor(), None);
    }

    #[test]
    fn rich_replace_requires_text_node() {
        let mut r = RichHandle::new(vec![
            MemoryNode::Text("a :x".into()),
            MemoryNode::Element("br".into()),
        ]);
        r.set_caret(Some((1, 0)));
        assert_eq!(r.replace_range(0, 1, "🔥"), Err(RegionError::NotTextNode));
        r.set_caret(None);
        assert_eq!(r.replace_range(0, 1, "🔥"), Err(RegionError::NoSelection));
        assert_eq!(r.nodes()[0], MemoryNode::Text("a :x".into()));
    }

    #[test]
    fn rich_caret_is_none_for_empty_line() {
        let r = RichHandle::new(vec![MemoryNode::Text(String::new())]);
        r.set_caret(Some((0, 0)));
        assert_eq!(r.locate_caret(), None);
        let r = RichHandle::from_text("hey");
        assert!(r.locate_caret().is_some());
    }
}
