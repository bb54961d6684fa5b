//! `region`：宿主可编辑区域的统一能力接口。
//!
//! 两类区域：
//! - `Field`：扁平文本框（textarea / input），偏移是 value 字符串里的字符下标
//! - `Rich`：富文本区域（contenteditable），偏移是光标所在**单个文本节点**内的字符下标
//!
//! 所有偏移都按 Unicode 标量（`char`）计数；DOM 等使用 UTF-16 的宿主在边界处自行换算。

use thiserror::Error;

use crate::caret::Point;

/// 可编辑区域种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Field,
    Rich,
}

/// 判断一个元素是否是我们要处理的可编辑区域。
///
/// - `TEXTAREA` -> `Field`
/// - `INPUT` 且 type 属于 `"" / text / search / url / email` -> `Field`
/// - 其它 contenteditable 元素 -> `Rich`
pub fn classify(tag_name: &str, input_type: &str, is_content_editable: bool) -> Option<RegionKind> {
    if tag_name.eq_ignore_ascii_case("textarea") {
        return Some(RegionKind::Field);
    }
    if tag_name.eq_ignore_ascii_case("input") {
        const TEXT_TYPES: [&str; 5] = ["", "text", "search", "url", "email"];
        return TEXT_TYPES
            .iter()
            .any(|t| input_type.eq_ignore_ascii_case(t))
            .then_some(RegionKind::Field);
    }
    is_content_editable.then_some(RegionKind::Rich)
}

/// 替换失败的原因；调用方一律按 no-op 处理。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("no live selection")]
    NoSelection,
    #[error("cursor container is not a text node")]
    NotTextNode,
    #[error("range {start}..{end} out of bounds (len {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("host error: {0}")]
    Host(String),
}

/// 宿主可编辑区域（宿主拥有；engine 只持有可克隆的句柄）。
pub trait EditableRegion {
    /// 光标之前的全部文本（富文本：光标所在文本节点内、光标之前的部分）。
    ///
    /// 没有可用光标（无选区 / 光标不在文本节点）时返回 `None`。
    fn text_before_cursor(&self) -> Option<String>;

    /// 当前光标的字符偏移。
    fn cursor_offset(&self) -> Option<usize>;

    /// 把 `[start, end)` 替换为 `text`，焦点保留在区域上，光标落在插入文本之后。
    ///
    /// 实现应当走宿主原生的“插入文本”命令，使撤销历史与 input 事件如同用户亲手输入。
    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<(), RegionError>;

    /// 光标在视口坐标系中的位置（下拉框锚点）；拿不到可用位置时返回 `None`。
    fn locate_caret(&self) -> Option<Point>;

    /// 两个句柄是否指向同一个区域。
    fn same_region(&self, other: &Self) -> bool;
}

/// 字符偏移 -> 字节偏移；超出范围返回 `None`。
pub fn char_to_byte(s: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    match s.char_indices().nth(offset) {
        Some((b, _)) => Some(b),
        None => (s.chars().count() == offset).then_some(s.len()),
    }
}

/// 在 `s` 中把字符区间 `[start, end)` 替换为 `text`。
pub fn splice_chars(s: &mut String, start: usize, end: usize, text: &str) -> Result<(), RegionError> {
    let len = s.chars().count();
    let out_of_bounds = RegionError::OutOfBounds { start, end, len };
    if start > end {
        return Err(out_of_bounds);
    }
    let (Some(b0), Some(b1)) = (char_to_byte(s, start), char_to_byte(s, end)) else {
        return Err(out_of_bounds);
    };
    s.replace_range(b0..b1, text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_editable_elements() {
        assert_eq!(classify("TEXTAREA", "", false), Some(RegionKind::Field));
        assert_eq!(classify("INPUT", "", false), Some(RegionKind::Field));
        assert_eq!(classify("INPUT", "text", false), Some(RegionKind::Field));
        assert_eq!(classify("input", "Search", false), Some(RegionKind::Field));
        assert_eq!(classify("INPUT", "url", false), Some(RegionKind::Field));
        assert_eq!(classify("INPUT", "email", false), Some(RegionKind::Field));
        assert_eq!(classify("DIV", "", true), Some(RegionKind::Rich));
    }

    #[test]
    fn classify_rejects_other_inputs() {
        assert_eq!(classify("INPUT", "password", false), None);
        assert_eq!(classify("INPUT", "number", false), None);
        assert_eq!(classify("INPUT", "checkbox", false), None);
        assert_eq!(classify("DIV", "", false), None);
        assert_eq!(classify("SPAN", "", false), None);
    }

    #[test]
    fn splice_counts_chars_not_bytes() {
        let mut s = String::from("héllo :fi");
        splice_chars(&mut s, 6, 9, "🔥").unwrap();
        assert_eq!(s, "héllo 🔥");

        let mut s = String::from("ab");
        assert!(splice_chars(&mut s, 1, 5, "x").is_err());
        assert!(splice_chars(&mut s, 2, 1, "x").is_err());
        assert_eq!(s, "ab");
        splice_chars(&mut s, 2, 2, "c").unwrap();
        assert_eq!(s, "abc");
    }
}
