//! `caret`：光标像素位置的计算与下拉框摆放策略。
//!
//! 这里只放纯数学：
//! - 扁平文本框没有原生光标矩形，需要宿主搭一个离屏“镜像”元素测量，本模块负责把测量结果映射回视口
//! - 富文本区域直接用折叠选区的矩形，本模块负责识别退化矩形
//! - `place`：右边界夹紧 + 底部溢出时翻到锚点上方

/// 视口坐标系中的点（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 对应 DOM 的 bounding client rect。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// 下拉框与视口右边缘的最小间距
pub const EDGE_MARGIN: f64 = 8.0;
/// 下拉框与锚点之间的垂直间距
pub const ANCHOR_GAP: f64 = 4.0;

/// 镜像元素的固定声明：离屏、不可见、与 textarea 相同的换行规则。
pub const MIRROR_BASE_CSS: &str = "position:fixed;left:-9999px;top:0;visibility:hidden;white-space:pre-wrap;word-wrap:break-word;";

/// 镜像元素需要从真实文本框复制的样式属性。
pub const MIRROR_PROPERTIES: [&str; 8] = [
    "font",
    "padding",
    "border",
    "box-sizing",
    "width",
    "letter-spacing",
    "text-indent",
    "line-height",
];

/// 从真实文本框复制来的计算样式（CSS 文本原样保存）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorStyle {
    pub properties: Vec<(&'static str, String)>,
}

impl MirrorStyle {
    /// `lookup` 按属性名返回计算样式值（通常是 `getComputedStyle(el).getPropertyValue`）。
    pub fn capture(mut lookup: impl FnMut(&str) -> String) -> Self {
        let properties = MIRROR_PROPERTIES
            .iter()
            .map(|&name| (name, lookup(name)))
            .collect();
        Self { properties }
    }

    /// 生成镜像元素的完整 `style` 文本。
    pub fn css_text(&self) -> String {
        let mut css = String::from(MIRROR_BASE_CSS);
        for (name, value) in &self.properties {
            if value.is_empty() {
                continue;
            }
            css.push_str(name);
            css.push(':');
            css.push_str(value);
            css.push(';');
        }
        css
    }
}

/// 解析计算样式中的像素值（`"16px"`、`"1.5"`）；`normal` 等关键字返回 `None`。
pub fn parse_css_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v).trim();
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 行高（像素）：优先 `line-height`，`normal` 时按字号 * 1.2，再不行用 16px。
pub fn line_height_px(line_height: &str, font_size: &str) -> f64 {
    parse_css_px(line_height)
        .or_else(|| parse_css_px(font_size).map(|fs| fs * 1.2))
        .unwrap_or(16.0)
}

/// 扁平文本框：把镜像中标记点的相对偏移映射到真实文本框上。
///
/// - `field`：真实文本框的矩形
/// - `mirror` / `marker`：镜像元素与零宽标记的矩形
/// - `scroll`：文本框当前的滚动偏移
/// - 结果加一个行高，使下拉框出现在文字行下方
pub fn field_caret(field: Rect, mirror: Rect, marker: Rect, scroll: Point, line_height: f64) -> Point {
    Point {
        x: field.left + (marker.left - mirror.left) - scroll.x,
        y: field.top + (marker.top - mirror.top) - scroll.y + line_height,
    }
}

/// 富文本区域：折叠选区矩形；原点处的零矩形表示没有渲染几何（例如空行），返回 `None`。
pub fn rich_caret(rect: Rect) -> Option<Point> {
    if rect.left == 0.0 && rect.top == 0.0 {
        return None;
    }
    Some(Point::new(rect.left, rect.bottom()))
}

/// 下拉框摆放：右侧至少留 `EDGE_MARGIN`；底部放不下时翻到锚点上方。
pub fn place(anchor: Point, dropdown: Size, viewport: Size) -> Point {
    let x = anchor
        .x
        .min(viewport.width - dropdown.width - EDGE_MARGIN)
        .max(0.0);
    let y = if anchor.y + dropdown.height > viewport.height {
        anchor.y - dropdown.height - ANCHOR_GAP
    } else {
        anchor.y + ANCHOR_GAP
    };
    Point::new(x, y)
}
