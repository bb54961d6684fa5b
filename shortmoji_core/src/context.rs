//! `Context`：processor 链共享的唯一状态容器。
//!
//! 约定：
//! - `session`：当前补全会话；`None` 即 Idle
//! - `surface`：唯一、长期存在的下拉框，每次打开时重新填充而不是重建
//! - 会话存活 <=> 下拉框可见；所有开/关/导航/提交都经过这里以保持该不变量
use crate::{
    caret::{self, Point, Size},
    engine::EngineFacade,
    key_event::Action,
    model::{Anchor, Candidate, TriggerHit, UiState},
    region::EditableRegion,
};

/// 下拉框渲染面（宿主实现）。
pub trait Dropdown {
    /// 用候选重新填充所有行，并高亮 `selected`。
    fn populate(&mut self, candidates: &[Candidate], selected: usize);
    /// 只更新高亮行。
    fn highlight(&mut self, selected: usize);
    /// 让下拉框可见并返回其渲染尺寸。
    fn measure(&mut self) -> Size;
    fn viewport(&self) -> Size;
    fn move_to(&mut self, position: Point);
    /// 隐藏并清空。
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
}

/// 打开中的补全会话；`candidates` 非空，`selected < candidates.len()`。
#[derive(Debug, Clone)]
struct Autocomplete<R> {
    anchor: Anchor<R>,
    candidates: Vec<Candidate>,
    selected: usize,
}

/// 会话上下文：processor 链共享的唯一状态。
pub struct Context<R> {
    /// 当前会话（至多一个）
    session: Option<Autocomplete<R>>,
    /// 下拉框
    surface: Box<dyn Dropdown>,
}

impl<R> Context<R>
where
    R: EditableRegion + Clone,
{
    pub fn new(surface: Box<dyn Dropdown>) -> Self {
        Self {
            session: None,
            surface,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// 打开（或替换）会话：选中项归零，定位光标，渲染下拉框。
    ///
    /// 光标位置不可用时不打开会话（下拉框保持隐藏）。
    pub fn open(&mut self, anchor: Anchor<R>, candidates: Vec<Candidate>) -> Vec<Action> {
        if candidates.is_empty() {
            return self.close();
        }
        let Some(at) = anchor.region.locate_caret() else {
            log::debug!("no caret position, dropdown suppressed");
            return self.close();
        };
        self.surface.populate(&candidates, 0);
        let size: Size = self.surface.measure();
        let viewport: Size = self.surface.viewport();
        self.surface.move_to(caret::place(at, size, viewport));
        self.session = Some(Autocomplete {
            anchor,
            candidates,
            selected: 0,
        });
        vec![Action::Open]
    }

    /// 关闭会话并清空所有字段。
    pub fn close(&mut self) -> Vec<Action> {
        let was_open = self.session.take().is_some();
        if self.surface.is_visible() {
            self.surface.hide();
        }
        if was_open { vec![Action::Close] } else { Vec::new() }
    }

    /// 循环移动高亮：`delta` 为 +1 / -1。
    pub fn navigate(&mut self, delta: isize) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let n = s.candidates.len() as isize;
        if n == 0 {
            return;
        }
        s.selected = (s.selected as isize + delta).rem_euclid(n) as usize;
        self.surface.highlight(s.selected);
    }

    /// 提交第 `index` 个候选：替换 `[start, cursor)`，然后无论成败都关闭会话。
    pub fn commit(&mut self, index: usize) -> Vec<Action> {
        let Some(mut s) = self.session.take() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(cand) = s.candidates.get(index) {
            let start = s.anchor.start;
            let end = s
                .anchor
                .region
                .cursor_offset()
                .unwrap_or(s.anchor.cursor);
            if end < start {
                log::debug!("cursor {end} moved before trigger {start}, commit skipped");
            } else {
                match s.anchor.region.replace_range(start, end, &cand.glyph) {
                    Ok(()) => actions.push(Action::Commit(cand.glyph.clone())),
                    Err(err) => log::debug!("replacement skipped: {err}"),
                }
            }
        }
        self.close();
        actions.push(Action::Close);
        actions
    }

    pub fn commit_selected(&mut self) -> Vec<Action> {
        match self.session.as_ref().map(|s| s.selected) {
            Some(selected) => self.commit(selected),
            None => Vec::new(),
        }
    }

    /// 生成 UI 层只读快照。
    pub fn ui_state(&self) -> Option<UiState> {
        self.session.as_ref().map(|s| UiState {
            start: s.anchor.start,
            cursor: s.anchor.cursor,
            candidate_list: s.candidates.clone(),
            selected: s.selected,
        })
    }
}

impl<R> Context<R>
where
    R: EditableRegion + Clone,
{
    /// 编辑事件：从头重新检测光标前的文本。
    ///
    /// - 无命中：关闭会话
    /// - 即时命中：直接替换并关闭
    /// - 补全命中：打开或刷新会话（锚点、候选替换，选中项归零）
    pub fn reanalyze(&mut self, engine: &dyn EngineFacade, region: &R) -> Vec<Action> {
        let (Some(cursor), Some(before)) = (region.cursor_offset(), region.text_before_cursor())
        else {
            return self.close();
        };
        match engine.detect(&before) {
            None => self.close(),
            Some(TriggerHit::Instant { start, glyph }) => {
                let mut target: R = region.clone();
                let mut actions = Vec::new();
                match target.replace_range(start, cursor, &glyph) {
                    Ok(()) => actions.push(Action::Commit(glyph)),
                    Err(err) => log::debug!("instant replacement skipped: {err}"),
                }
                actions.append(&mut self.close());
                actions
            }
            Some(TriggerHit::Autocomplete { start, candidates }) => {
                let anchor = Anchor {
                    region: region.clone(),
                    start,
                    cursor,
                };
                self.open(anchor, candidates)
            }
        }
    }

    /// 焦点离开锚点区域（移到别的区域或非可编辑元素）时关闭会话。
    pub fn focus_changed(&mut self, region: Option<&R>) -> Vec<Action> {
        let Some(s) = self.session.as_ref() else {
            return Vec::new();
        };
        match region {
            Some(r) if s.anchor.region.same_region(r) => Vec::new(),
            _ => self.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FieldHandle, MemoryDropdown};

    fn anchor(field: &FieldHandle) -> Anchor<FieldHandle> {
        Anchor {
            region: field.clone(),
            start: 0,
            cursor: 3,
        }
    }

    #[test]
    fn empty_candidates_never_open() {
        let dropdown = MemoryDropdown::default();
        let mut ctx: Context<FieldHandle> = Context::new(Box::new(dropdown.clone()));
        let field = FieldHandle::new(":zz");
        assert!(ctx.open(anchor(&field), Vec::new()).is_empty());
        assert!(!ctx.is_open());
        assert!(!dropdown.state().visible);

        // 空闲时导航与提交都是空操作
        ctx.navigate(1);
        ctx.navigate(-1);
        assert!(ctx.commit_selected().is_empty());
        assert_eq!(ctx.ui_state(), None);
    }

    #[test]
    fn selection_stays_in_range() {
        let mut ctx: Context<FieldHandle> = Context::new(Box::new(MemoryDropdown::default()));
        let field = FieldHandle::new(":sm");
        let candidates = vec![Candidate::new("smile", "😄"), Candidate::new("smirk", "😏")];
        assert_eq!(ctx.open(anchor(&field), candidates), vec![Action::Open]);
        for _ in 0..5 {
            ctx.navigate(-1);
            let ui = ctx.ui_state().unwrap();
            assert!(ui.selected < ui.candidate_list.len());
        }
        assert_eq!(ctx.ui_state().unwrap().selected, 1);
    }
}
