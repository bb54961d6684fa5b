use shortmoji_core::{
    index::{EmojiIndex, is_valid_shortcode},
    model::TriggerHit,
    search::{MAX_CANDIDATES, search},
    trigger::detect_default,
};
use shortmoji_index::EmojiTable;

#[test]
fn common_shortcodes_exist() {
    let t = EmojiTable::builtin();
    assert!(t.len() > 1500);
    assert_eq!(t.get("smile"), Some("😄"));
    assert_eq!(t.get("fire"), Some("🔥"));
    assert_eq!(t.get("rocket"), Some("🚀"));
    assert_eq!(t.get("tada"), Some("🎉"));
    assert_eq!(t.get("eyes"), Some("👀"));
    assert_eq!(t.get("100"), Some("💯"));
    assert_eq!(t.get("+1"), Some("👍"));
    assert_eq!(t.get("thumbsup"), t.get("+1"));
}

#[test]
fn every_builtin_shortcode_is_valid() {
    let t = EmojiTable::builtin();
    assert!(t.entries().all(|(sc, glyph)| is_valid_shortcode(sc) && !glyph.is_empty()));
}

#[test]
fn every_shortcode_triggers_instant_replace() {
    let t = EmojiTable::builtin();
    for (sc, glyph) in t.entries() {
        let before = format!("text :{sc}:");
        assert_eq!(
            detect_default(&t, &before, true),
            Some(TriggerHit::Instant {
                start: 5,
                glyph: glyph.to_owned()
            }),
            "shortcode {sc}"
        );
    }
}

#[test]
fn unknown_shortcode_is_not_replaced() {
    let t = EmojiTable::builtin();
    assert_eq!(detect_default(&t, "text :definitely_not_an_emoji:", true), None);
}

#[test]
fn search_ranks_prefix_first() {
    let t = EmojiTable::builtin();
    for q in ["smi", "heart", "sm", "cat", "x", "_"] {
        let r = search(&t, q);
        assert!(r.len() <= MAX_CANDIDATES);
        assert!(r.iter().all(|c| c.shortcode.contains(q)));
        let first_contains = r.iter().position(|c| !c.shortcode.starts_with(q));
        if let Some(i) = first_contains {
            assert!(r[i..].iter().all(|c| !c.shortcode.starts_with(q)), "query {q}");
        }
    }

    let r = search(&t, "heart");
    assert!(r.iter().any(|c| c.shortcode == "heart"));
    assert!(r.len() > 1);
    assert!(search(&t, "zzzzxxx").is_empty());
}

#[test]
fn autocomplete_against_builtin() {
    let t = EmojiTable::builtin();
    let Some(TriggerHit::Autocomplete { start, candidates }) = detect_default(&t, "hello :smi", true)
    else {
        panic!("expected autocomplete");
    };
    assert_eq!(start, 6);
    assert!(candidates.iter().any(|c| c.shortcode.starts_with("smi")));
    assert_eq!(detect_default(&t, "hello :smile:", false), None);
    assert_eq!(detect_default(&t, "http://example.com:8080", true), None);
}
