//! 发出接口：会话把原始字符区间交给持有者，由持有者决定如何脱敏与输出
//!
//! 两类回调分别对应普通数据与卡号数据；`text` 为原文（含分隔符），
//! `position` 为 `text[0]` 在整个流中的字符偏移。

/// 区间类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Plain,
    Card,
}

/// 会话的回调接口
pub trait SpanSink {
    fn on_plain(&mut self, text: &[char], position: u64);
    fn on_card(&mut self, text: &[char], position: u64);

    /// 按类别分发
    fn on_span(&mut self, kind: SpanKind, text: &[char], position: u64) {
        match kind {
            SpanKind::Plain => self.on_plain(text, position),
            SpanKind::Card => self.on_card(text, position),
        }
    }
}

/// 已发出区间的拥有型副本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub text: String,
    pub position: u64,
}

impl Span {
    /// 区间长度（字符数）
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// 按发出顺序记录全部区间
#[derive(Debug, Default, Clone)]
pub struct SpanCollector {
    pub spans: Vec<Span>,
}

impl SpanCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有区间首尾相接（应等于原始输入）
    pub fn concat(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// 仅卡号区间
    pub fn cards(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(|s| s.kind == SpanKind::Card)
    }

    /// 合并相邻同类区间（普通数据的切分位置不具语义）
    pub fn coalesced(&self) -> Vec<(SpanKind, String)> {
        let mut out: Vec<(SpanKind, String)> = Vec::new();
        for s in &self.spans {
            match out.last_mut() {
                Some((kind, text)) if *kind == s.kind && s.kind == SpanKind::Plain => {
                    text.push_str(&s.text)
                }
                _ => out.push((s.kind, s.text.clone())),
            }
        }
        out
    }

    fn on_span_owned(&mut self, kind: SpanKind, text: &[char], position: u64) {
        self.spans.push(Span { kind, text: text.iter().collect(), position });
    }
}

impl SpanSink for SpanCollector {
    fn on_plain(&mut self, text: &[char], position: u64) {
        self.on_span_owned(SpanKind::Plain, text, position);
    }

    fn on_card(&mut self, text: &[char], position: u64) {
        self.on_span_owned(SpanKind::Card, text, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_span_dispatches_by_kind() {
        let mut c = SpanCollector::new();
        c.on_span(SpanKind::Plain, &['a', 'b'], 0);
        c.on_span(SpanKind::Card, &['4', '2'], 2);
        assert_eq!(
            c.spans,
            vec![
                Span { kind: SpanKind::Plain, text: "ab".to_string(), position: 0 },
                Span { kind: SpanKind::Card, text: "42".to_string(), position: 2 },
            ]
        );
    }

    #[test]
    fn coalesced_merges_only_plain_runs() {
        let mut c = SpanCollector::new();
        c.on_plain(&['a'], 0);
        c.on_plain(&['b'], 1);
        c.on_card(&['1'], 2);
        c.on_card(&['2'], 3);
        assert_eq!(
            c.coalesced(),
            vec![
                (SpanKind::Plain, "ab".to_string()),
                (SpanKind::Card, "1".to_string()),
                (SpanKind::Card, "2".to_string()),
            ]
        );
        assert_eq!(c.concat(), "ab12");
        assert_eq!(c.cards().count(), 2);
    }
}
