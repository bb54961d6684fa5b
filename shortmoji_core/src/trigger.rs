//! `trigger`：只看光标前紧邻的后缀，判断是否存在触发。
//!
//! 1. 即时替换：文本以 `:body:` 结尾且 body 在索引中（需开启 auto replace）
//! 2. 补全：文本以 `:body` / `#body` 结尾，body 至少 2 个字符，触发符前是空白或文本开头
//!
//! body 字符集 `[a-z0-9_+\-]`，大小写不敏感，查询前统一转小写。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    index::EmojiIndex,
    model::TriggerHit,
    search::{PrefixRanker, Ranker, MAX_CANDIDATES},
};

static INSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_+\-]+):$").expect("instant trigger regex"));

static AUTOCOMPLETE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:#]([A-Za-z0-9_+\-]{2,})$").expect("autocomplete trigger regex"));

/// 检测触发；`before` 是光标之前的文本窗口。
pub fn detect<I>(index: &I, before: &str, instant_replace: bool, limit: usize) -> Option<TriggerHit>
where
    I: EmojiIndex + ?Sized,
{
    if before.is_empty() {
        return None;
    }

    if instant_replace {
        if let Some(hit) = detect_instant(index, before) {
            return Some(hit);
        }
    }

    let caps = AUTOCOMPLETE.captures(before)?;
    let whole = caps.get(0)?;
    let byte_start = whole.start();
    if let Some(prev) = before[..byte_start].chars().next_back() {
        // URL 端口、单词内的 #、时间戳等不算触发
        if !prev.is_whitespace() {
            return None;
        }
    }

    let candidates = PrefixRanker { index }.rank(&caps[1], limit);
    if candidates.is_empty() {
        return None;
    }
    Some(TriggerHit::Autocomplete {
        start: char_offset(before, byte_start),
        candidates,
    })
}

fn detect_instant<I>(index: &I, before: &str) -> Option<TriggerHit>
where
    I: EmojiIndex + ?Sized,
{
    let caps = INSTANT.captures(before)?;
    let shortcode = caps[1].to_ascii_lowercase();
    // 未知短码不是错误：交给补全规则（末尾冒号会让它也失败）
    let glyph = index.get(&shortcode)?;
    Some(TriggerHit::Instant {
        start: char_offset(before, caps.get(0)?.start()),
        glyph: glyph.to_owned(),
    })
}

fn char_offset(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// 默认上限的检测。
pub fn detect_default<I>(index: &I, before: &str, instant_replace: bool) -> Option<TriggerHit>
where
    I: EmojiIndex + ?Sized,
{
    detect(index, before, instant_replace, MAX_CANDIDATES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> Vec<(String, String)> {
        [
            ("smile", "😄"),
            ("smiley", "😃"),
            ("+1", "👍"),
            ("100", "💯"),
            ("fire", "🔥"),
            ("t-rex", "🦖"),
        ]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
    }

    fn instant(before: &str) -> Option<TriggerHit> {
        detect_default(&index(), before, true)
    }

    #[test]
    fn instant_hit_reports_opening_colon() {
        assert_eq!(
            instant("text :smile:"),
            Some(TriggerHit::Instant {
                start: 5,
                glyph: "😄".into()
            })
        );
        assert_eq!(
            instant(":+1:"),
            Some(TriggerHit::Instant {
                start: 0,
                glyph: "👍".into()
            })
        );
        assert_eq!(instant("a:t-rex:").map(|h| h.start()), Some(1));
    }

    #[test]
    fn instant_is_case_insensitive() {
        assert_eq!(
            instant("so :FIRE:"),
            Some(TriggerHit::Instant {
                start: 3,
                glyph: "🔥".into()
            })
        );
    }

    #[test]
    fn instant_offsets_count_chars() {
        assert_eq!(instant("日本 :100:").map(|h| h.start()), Some(3));
    }

    #[test]
    fn unknown_instant_falls_through_to_nothing() {
        assert_eq!(instant("text :nope:"), None);
    }

    #[test]
    fn disabled_instant_does_not_match() {
        assert_eq!(detect_default(&index(), "hello :smile:", false), None);
    }

    #[test]
    fn autocomplete_hit() {
        let Some(TriggerHit::Autocomplete { start, candidates }) = instant("hello :smi") else {
            panic!("expected autocomplete");
        };
        assert_eq!(start, 6);
        assert_eq!(candidates[0].shortcode, "smile");
        assert_eq!(candidates.len(), 2);

        let Some(TriggerHit::Autocomplete { start, .. }) = instant("#fi") else {
            panic!("expected autocomplete");
        };
        assert_eq!(start, 0);
    }

    #[test]
    fn autocomplete_after_newline_or_tab() {
        assert!(matches!(
            instant("line\n:fir"),
            Some(TriggerHit::Autocomplete { start: 5, .. })
        ));
        assert!(matches!(
            instant("a\t#smi"),
            Some(TriggerHit::Autocomplete { start: 2, .. })
        ));
    }

    #[test]
    fn short_or_empty_is_none() {
        assert_eq!(instant(""), None);
        assert_eq!(instant(":"), None);
        assert_eq!(instant(":s"), None);
        assert_eq!(instant("hi #"), None);
    }

    #[test]
    fn trigger_inside_word_is_none() {
        assert_eq!(instant("http://example.com:8080"), None);
        assert_eq!(instant("issue#smile"), None);
        assert_eq!(instant("at 12:10"), None);
    }

    #[test]
    fn zero_results_is_none() {
        assert_eq!(instant("hey :zzzzxxx"), None);
    }

    #[test]
    fn only_suffix_at_cursor_counts() {
        assert_eq!(instant(":smile: and more"), None);
        assert_eq!(instant(":smi "), None);
    }
}
