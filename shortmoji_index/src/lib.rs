use std::{collections::HashMap, fs, io, path::Path};

use shortmoji_core::index::{EmojiIndex, is_valid_shortcode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: missing shortcode or glyph")]
    MissingField { line: usize },
    #[error("line {line}: invalid shortcode {shortcode:?}")]
    InvalidShortcode { line: usize, shortcode: String },
}

/// 插入有序的 emoji 表。
///
/// - `entries`：按插入顺序保存，搜索结果的组内顺序依赖它
/// - `lookup`：短码 -> 下标，精确查询
/// - 重复短码保留第一次出现的条目
#[derive(Debug, Clone, Default)]
pub struct EmojiTable {
    entries: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
}

impl EmojiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置表：`emojis` crate 中每个 emoji 的全部 gemoji 短码。
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for emoji in emojis::iter() {
            for shortcode in emoji.shortcodes() {
                if !is_valid_shortcode(shortcode) {
                    log::debug!("skipping shortcode {shortcode:?}");
                    continue;
                }
                table.insert(shortcode, emoji.as_str());
            }
        }
        log::debug!("builtin emoji table: {} shortcodes", table.len());
        table
    }

    /// 插入一条；重复短码被忽略并返回 `false`。
    pub fn insert(&mut self, shortcode: &str, glyph: &str) -> bool {
        if self.lookup.contains_key(shortcode) {
            log::warn!("duplicate shortcode {shortcode:?} ignored");
            return false;
        }
        self.lookup.insert(shortcode.to_owned(), self.entries.len());
        self.entries.push((shortcode.to_owned(), glyph.to_owned()));
        true
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let s = fs::read_to_string(path)?;
        Self::from_tsv_str(&s)
    }

    /// TSV 格式：
    ///
    /// - `shortcode<TAB>glyph`
    /// - 短码必须是 `[a-z0-9_+\-]+`
    /// - 允许 `#` 开头注释行与空行
    pub fn from_tsv_str(s: &str) -> Result<Self, IndexError> {
        let mut table = Self::new();
        for (idx, line) in s.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut it = trimmed.split('\t');
            let shortcode = it.next().unwrap_or("").trim();
            let glyph = it.next().unwrap_or("").trim();
            if shortcode.is_empty() || glyph.is_empty() {
                return Err(IndexError::MissingField { line: line_no });
            }
            if !is_valid_shortcode(shortcode) {
                return Err(IndexError::InvalidShortcode {
                    line: line_no,
                    shortcode: shortcode.to_owned(),
                });
            }
            table.insert(shortcode, glyph);
        }
        Ok(table)
    }
}

impl EmojiIndex for EmojiTable {
    fn get(&self, shortcode: &str) -> Option<&str> {
        self.lookup
            .get(shortcode)
            .map(|&i| self.entries[i].1.as_str())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(
            self.entries
                .iter()
                .map(|(sc, glyph)| (sc.as_str(), glyph.as_str())),
        )
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_keeps_order_and_skips_comments() {
        let t = EmojiTable::from_tsv_str("# emoji\nzap\t⚡\n\nant\t🐜\nzap\t🌩️\n").unwrap();
        let keys: Vec<&str> = t.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zap", "ant"]);
        assert_eq!(t.get("zap"), Some("⚡"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn tsv_reports_line_numbers() {
        let err = EmojiTable::from_tsv_str("ok\t👌\nbroken\n").unwrap_err();
        assert!(matches!(err, IndexError::MissingField { line: 2 }));

        let err = EmojiTable::from_tsv_str("# x\nBad Code\t❌\n").unwrap_err();
        assert!(matches!(err, IndexError::InvalidShortcode { line: 2, .. }));
    }
}
