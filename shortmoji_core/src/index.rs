/// Emoji 索引抽象：core 不关心数据来自内置表、文件还是宿主注入。
///
/// 约定：
/// - 短码是小写字符串，字符集 `[a-z0-9_+\-]`
/// - 只读；engine 从不修改索引
/// - `entries` 按插入顺序迭代（排序的“自然顺序”依赖这一点）
pub trait EmojiIndex {
    /// 精确查询短码对应的字形。
    fn get(&self, shortcode: &str) -> Option<&str>;

    /// 按插入顺序迭代 `(shortcode, glyph)`。
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;

    fn len(&self) -> usize {
        self.entries().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 短码合法字符：`a-z 0-9 _ + -`
pub fn is_shortcode_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '+' | '-')
}

/// 非空且全部为合法字符。
pub fn is_valid_shortcode(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_shortcode_char)
}

/// 测试与演示用的小索引（插入顺序即 Vec 顺序）。
impl EmojiIndex for Vec<(String, String)> {
    fn get(&self, shortcode: &str) -> Option<&str> {
        self.iter()
            .find(|(sc, _)| sc == shortcode)
            .map(|(_, glyph)| glyph.as_str())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(self.iter().map(|(sc, glyph)| (sc.as_str(), glyph.as_str())))
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcode_charset() {
        assert!(is_valid_shortcode("+1"));
        assert!(is_valid_shortcode("100"));
        assert!(is_valid_shortcode("thumbs_up"));
        assert!(is_valid_shortcode("t-rex"));
        assert!(!is_valid_shortcode(""));
        assert!(!is_valid_shortcode("Smile"));
        assert!(!is_valid_shortcode("a b"));
        assert!(!is_valid_shortcode("a:b"));
    }

    #[test]
    fn vec_index_keeps_insertion_order() {
        let idx: Vec<(String, String)> = vec![
            ("zebra".into(), "🦓".into()),
            ("apple".into(), "🍎".into()),
        ];
        let keys: Vec<&str> = idx.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zebra", "apple"]);
        assert_eq!(idx.get("apple"), Some("🍎"));
        assert_eq!(idx.get("pear"), None);
        assert_eq!(idx.len(), 2);
    }
}
