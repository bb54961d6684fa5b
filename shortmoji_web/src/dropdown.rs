//! 页面上唯一的下拉框：挂在 `documentElement` 下，每次会话重新填充。

use shortmoji_core::{
    caret::{Point, Size},
    context::Dropdown,
    key_event::PointerTarget,
    model::Candidate,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, EventTarget, HtmlElement, Node, ScrollIntoViewOptions, ScrollLogicalPosition,
};

pub const DROPDOWN_ID: &str = "shortmoji-dropdown";
const ROW_CLASS: &str = "shortmoji-item";
const ROW_INDEX_ATTR: &str = "data-index";

/// 下拉框内联基础样式。
///
/// 定位坐标来自 `getBoundingClientRect`（视口坐标），所以用 `fixed`；
/// 宽度按内容收缩，`measure` 才能得到真实渲染尺寸。
pub const OVERLAY_BASE_CSS: &str = "position:fixed;left:0;top:0;z-index:2147483647;display:none;\
width:max-content;max-width:320px;max-height:240px;overflow-y:auto;box-sizing:border-box;";

pub struct OverlayDropdown {
    document: Document,
    root: HtmlElement,
}

impl OverlayDropdown {
    /// 创建下拉框并挂到文档根节点；整个页面生命周期只调用一次。
    pub fn install(document: &Document) -> Result<Self, JsValue> {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_id(DROPDOWN_ID);
        root.style().set_css_text(OVERLAY_BASE_CSS);
        document
            .document_element()
            .ok_or_else(|| JsValue::from_str("no document element"))?
            .append_child(&root)?;
        Ok(Self {
            document: document.clone(),
            root,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }

    fn rows(&self) -> Vec<Element> {
        let children = self.root.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn build_row(&self, index: usize, candidate: &Candidate, selected: bool) -> Result<Element, JsValue> {
        let row = self.document.create_element("div")?;
        row.set_class_name(ROW_CLASS);
        if selected {
            row.class_list().add_1("selected")?;
        }
        row.set_attribute(ROW_INDEX_ATTR, &index.to_string())?;

        let glyph = self.document.create_element("span")?;
        glyph.set_class_name("emoji");
        glyph.set_text_content(Some(candidate.glyph.as_str()));
        let label = self.document.create_element("span")?;
        label.set_class_name("shortcode");
        label.set_text_content(Some(candidate.label().as_str()));
        row.append_child(&glyph)?;
        row.append_child(&label)?;
        Ok(row)
    }
}

/// 指针按下的目标相对下拉框的位置。
pub fn pointer_target(root: &HtmlElement, target: Option<EventTarget>) -> PointerTarget {
    let Some(node) = target.and_then(|t| t.dyn_into::<Node>().ok()) else {
        return PointerTarget::Outside;
    };
    if !root.contains(Some(&node)) {
        return PointerTarget::Outside;
    }
    let element = match node.dyn_ref::<Element>() {
        Some(el) => Some(el.clone()),
        None => node.parent_element(),
    };
    element
        .and_then(|el| el.closest(&format!(".{ROW_CLASS}")).ok().flatten())
        .and_then(|row| row.get_attribute(ROW_INDEX_ATTR))
        .and_then(|i| i.parse().ok())
        .map_or(PointerTarget::Dropdown, PointerTarget::Row)
}

impl Dropdown for OverlayDropdown {
    fn populate(&mut self, candidates: &[Candidate], selected: usize) {
        self.root.set_inner_html("");
        for (i, c) in candidates.iter().enumerate() {
            match self.build_row(i, c, i == selected) {
                Ok(row) => {
                    if let Err(err) = self.root.append_child(&row) {
                        log::debug!("failed to append dropdown row: {err:?}");
                    }
                }
                Err(err) => log::debug!("failed to build dropdown row: {err:?}"),
            }
        }
    }

    fn highlight(&mut self, selected: usize) {
        for (i, row) in self.rows().iter().enumerate() {
            let _ = row.class_list().toggle_with_force("selected", i == selected);
            if i == selected {
                let opts = ScrollIntoViewOptions::new();
                opts.set_block(ScrollLogicalPosition::Nearest);
                row.scroll_into_view_with_scroll_into_view_options(&opts);
            }
        }
    }

    fn measure(&mut self) -> Size {
        let _ = self.root.class_list().add_1("visible");
        let _ = self.root.style().set_property("display", "block");
        Size::new(
            f64::from(self.root.offset_width()),
            f64::from(self.root.offset_height()),
        )
    }

    fn viewport(&self) -> Size {
        let Some(window) = web_sys::window() else {
            return Size::default();
        };
        let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(read(window.inner_width()), read(window.inner_height()))
    }

    fn move_to(&mut self, position: Point) {
        let style = self.root.style();
        let _ = style.set_property("left", &format!("{}px", position.x));
        let _ = style.set_property("top", &format!("{}px", position.y));
    }

    fn hide(&mut self) {
        let _ = self.root.class_list().remove_1("visible");
        let _ = self.root.style().set_property("display", "none");
        self.root.set_inner_html("");
    }

    fn is_visible(&self) -> bool {
        self.root.class_list().contains("visible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(css: &str) -> Vec<(&str, &str)> {
        css.split(';')
            .filter_map(|d| d.split_once(':'))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect()
    }

    #[test]
    fn overlay_is_fixed_and_starts_hidden() {
        let decls = declarations(OVERLAY_BASE_CSS);
        assert!(decls.contains(&("position", "fixed")));
        assert!(decls.contains(&("display", "none")));
        assert!(decls.contains(&("width", "max-content")));
    }
}
