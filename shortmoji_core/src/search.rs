//! `search`：按查询串对索引排序取候选。
//!
//! 规则：查询转小写；短码以查询开头的为“前缀命中”，其余包含查询的为“包含命中”；
//! 前缀命中在前、包含命中在后，组内保持索引插入顺序，最后截断到上限。

use crate::{index::EmojiIndex, model::Candidate};

/// 下拉框最多展示的候选数
pub const MAX_CANDIDATES: usize = 8;

/// Ranker：把查询串变成有序候选。
pub trait Ranker {
    fn rank(&self, query: &str, limit: usize) -> Vec<Candidate>;
}

/// 基于索引的前缀优先排序器。
pub struct PrefixRanker<'a, I: ?Sized> {
    pub index: &'a I,
}

impl<'a, I> Ranker for PrefixRanker<'a, I>
where
    I: EmojiIndex + ?Sized,
{
    fn rank(&self, query: &str, limit: usize) -> Vec<Candidate> {
        let q = query.to_lowercase();
        let mut prefix: Vec<Candidate> = Vec::new();
        let mut contains: Vec<Candidate> = Vec::new();
        for (shortcode, glyph) in self.index.entries() {
            // 前缀组已满时，包含组不可能再进入结果
            if prefix.len() >= limit {
                break;
            }
            if shortcode.starts_with(&q) {
                prefix.push(Candidate::new(shortcode, glyph));
            } else if contains.len() < limit && shortcode.contains(&q) {
                contains.push(Candidate::new(shortcode, glyph));
            }
        }
        prefix.append(&mut contains);
        prefix.truncate(limit);
        prefix
    }
}

/// 快捷接口：默认上限下的搜索。
pub fn search<I>(index: &I, query: &str) -> Vec<Candidate>
where
    I: EmojiIndex + ?Sized,
{
    PrefixRanker { index }.rank(query, MAX_CANDIDATES)
}
