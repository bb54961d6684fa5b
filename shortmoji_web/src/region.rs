//! DOM 可编辑区域。
//!
//! DOM 的偏移是 UTF-16 下标，core 用字符下标，两者在这里换算。

use shortmoji_core::{
    caret::{self, MirrorStyle, Point, Rect},
    region::{EditableRegion, RegionError, RegionKind, classify},
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    DomRect, Element, EventTarget, HtmlDocument, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, Node, Selection,
};

/// 宿主页面拥有的可编辑元素句柄。
#[derive(Debug, Clone)]
pub enum DomRegion {
    /// textarea / 文本类 input
    Field(HtmlElement),
    /// contenteditable
    Rich(HtmlElement),
}

impl DomRegion {
    /// 事件目标是可处理的可编辑元素时返回句柄。
    pub fn from_target(target: EventTarget) -> Option<Self> {
        let el: HtmlElement = target.dyn_into().ok()?;
        let input_type = el
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::type_)
            .unwrap_or_default();
        match classify(&el.tag_name(), &input_type, el.is_content_editable())? {
            RegionKind::Field => Some(DomRegion::Field(el)),
            RegionKind::Rich => Some(DomRegion::Rich(el)),
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            DomRegion::Field(el) | DomRegion::Rich(el) => el,
        }
    }
}

fn host(err: JsValue) -> RegionError {
    RegionError::Host(format!("{err:?}"))
}

/// UTF-16 下标之前的前缀。
fn utf16_prefix(s: &str, units: u32) -> String {
    let mut seen = 0u32;
    s.chars()
        .take_while(|ch| {
            seen += ch.len_utf16() as u32;
            seen <= units
        })
        .collect()
}

/// 字符下标 -> UTF-16 下标。
fn char_to_utf16(s: &str, offset: usize) -> u32 {
    s.chars().take(offset).map(|ch| ch.len_utf16() as u32).sum()
}

fn to_rect(r: &DomRect) -> Rect {
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

fn field_value(el: &HtmlElement) -> String {
    if let Some(t) = el.dyn_ref::<HtmlTextAreaElement>() {
        t.value()
    } else if let Some(i) = el.dyn_ref::<HtmlInputElement>() {
        i.value()
    } else {
        String::new()
    }
}

fn field_selection_start(el: &HtmlElement) -> Option<u32> {
    if let Some(t) = el.dyn_ref::<HtmlTextAreaElement>() {
        t.selection_start().ok().flatten()
    } else if let Some(i) = el.dyn_ref::<HtmlInputElement>() {
        i.selection_start().ok().flatten()
    } else {
        None
    }
}

fn set_field_selection(el: &HtmlElement, start: u32, end: u32) -> Result<(), JsValue> {
    if let Some(t) = el.dyn_ref::<HtmlTextAreaElement>() {
        t.set_selection_range(start, end)
    } else if let Some(i) = el.dyn_ref::<HtmlInputElement>() {
        i.set_selection_range(start, end)
    } else {
        Err(JsValue::from_str("not a text field"))
    }
}

fn live_selection() -> Option<Selection> {
    let sel = web_sys::window()?.get_selection().ok()??;
    (sel.range_count() > 0).then_some(sel)
}

/// 光标所在的文本节点及其 UTF-16 偏移。
fn selection_text_node(sel: &Selection) -> Result<(Node, u32), RegionError> {
    let range = sel.get_range_at(0).map_err(host)?;
    let node = range.start_container().map_err(host)?;
    if node.node_type() != Node::TEXT_NODE {
        return Err(RegionError::NotTextNode);
    }
    let offset = range.start_offset().map_err(host)?;
    Ok((node, offset))
}

/// 原生“插入文本”：替换当前选区，进入撤销历史并派发 input 事件。
fn insert_text(text: &str) -> Result<(), RegionError> {
    let document: HtmlDocument = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| RegionError::Host("no document".into()))?
        .dyn_into()
        .map_err(|_| RegionError::Host("not an HTML document".into()))?;
    let applied = document
        .exec_command_with_show_ui_and_value("insertText", false, text)
        .map_err(host)?;
    command_applied("insertText", applied)
}

/// `execCommand` 返回 `false` 表示浏览器拒绝执行，文本未改变。
fn command_applied(command: &str, applied: bool) -> Result<(), RegionError> {
    if applied {
        Ok(())
    } else {
        Err(RegionError::Host(format!("{command} was rejected")))
    }
}

/// 测量结束后移除镜像元素。
struct Detached<'a>(&'a Element);

impl Drop for Detached<'_> {
    fn drop(&mut self) {
        self.0.remove();
    }
}

/// 扁平文本框：离屏镜像元素复制样式与光标前文本，测量零宽标记的位置。
fn field_caret(el: &HtmlElement) -> Option<Point> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let cs = window.get_computed_style(el).ok()??;
    let style = MirrorStyle::capture(|name| cs.get_property_value(name).unwrap_or_default());

    let cursor = field_selection_start(el)?;
    let before = utf16_prefix(&field_value(el), cursor);

    let mirror: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
    mirror.style().set_css_text(&style.css_text());
    mirror.set_text_content(Some(before.as_str()));
    let marker = document.create_element("span").ok()?;
    marker.set_text_content(Some("\u{200b}"));
    mirror.append_child(&marker).ok()?;
    document.body()?.append_child(&mirror).ok()?;
    let _guard = Detached(&mirror);

    let mirror_rect = to_rect(&mirror.get_bounding_client_rect());
    let marker_rect = to_rect(&marker.get_bounding_client_rect());
    let field_rect = to_rect(&el.get_bounding_client_rect());
    let scroll = Point::new(f64::from(el.scroll_left()), f64::from(el.scroll_top()));
    let line_height = caret::line_height_px(
        &cs.get_property_value("line-height").unwrap_or_default(),
        &cs.get_property_value("font-size").unwrap_or_default(),
    );
    Some(caret::field_caret(
        field_rect,
        mirror_rect,
        marker_rect,
        scroll,
        line_height,
    ))
}

/// 富文本：折叠选区的矩形。
fn rich_caret() -> Option<Point> {
    let sel = live_selection()?;
    let range = sel.get_range_at(0).ok()?.clone_range();
    range.collapse_with_to_start(true);
    caret::rich_caret(to_rect(&range.get_bounding_client_rect()))
}

impl EditableRegion for DomRegion {
    fn text_before_cursor(&self) -> Option<String> {
        match self {
            DomRegion::Field(el) => {
                let cursor = field_selection_start(el)?;
                Some(utf16_prefix(&field_value(el), cursor))
            }
            DomRegion::Rich(_) => {
                let (node, offset) = selection_text_node(&live_selection()?).ok()?;
                Some(utf16_prefix(&node.text_content().unwrap_or_default(), offset))
            }
        }
    }

    fn cursor_offset(&self) -> Option<usize> {
        self.text_before_cursor().map(|s| s.chars().count())
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<(), RegionError> {
        match self {
            DomRegion::Field(el) => {
                el.focus().map_err(host)?;
                let value = field_value(el);
                set_field_selection(el, char_to_utf16(&value, start), char_to_utf16(&value, end))
                    .map_err(host)?;
                insert_text(text)
            }
            DomRegion::Rich(_) => {
                let sel = live_selection().ok_or(RegionError::NoSelection)?;
                let (node, _) = selection_text_node(&sel)?;
                let content = node.text_content().unwrap_or_default();
                let document = web_sys::window()
                    .and_then(|w| w.document())
                    .ok_or_else(|| RegionError::Host("no document".into()))?;
                let range = document.create_range().map_err(host)?;
                range
                    .set_start(&node, char_to_utf16(&content, start))
                    .map_err(host)?;
                range
                    .set_end(&node, char_to_utf16(&content, end))
                    .map_err(host)?;
                sel.remove_all_ranges().map_err(host)?;
                sel.add_range(&range).map_err(host)?;
                insert_text(text)
            }
        }
    }

    fn locate_caret(&self) -> Option<Point> {
        match self {
            DomRegion::Field(el) => field_caret(el),
            DomRegion::Rich(_) => rich_caret(),
        }
    }

    fn same_region(&self, other: &Self) -> bool {
        let other: &Node = other.element();
        self.element().is_same_node(Some(other))
    }
}
