//! 流式检测会话：逐字符分类、裁决并发出区间
//!
//! 状态机：
//! | 状态     | 数字                 | 单个空格/连字符 | 其他               |
//! |----------|----------------------|-----------------|--------------------|
//! | DATA     | → CC_DIGIT，记入数字 | 保持 DATA       | 保持 DATA          |
//! | CC_DIGIT | → CC_DIGIT，记入数字 | → CC_GAP        | 裁决，→ DATA       |
//! | CC_GAP   | → CC_DIGIT，记入数字 | 裁决，→ DATA    | 裁决，→ DATA       |
//!
//! 保证：整个会话期间发出的区间按顺序拼接后与输入完全一致，不重叠、不遗漏。
use tracing::{debug, trace};

use crate::error::Result;
use crate::options::MaskerOptions;
use crate::resolver::{MatchResolver, Verdict};
use crate::sink::{SpanKind, SpanSink};
use crate::window::CharWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    CcDigit,
    CcGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit(u8),
    Gap,
    Other,
}

#[inline]
fn classify(c: char) -> CharClass {
    match c {
        '0'..='9' => CharClass::Digit(c as u8 - b'0'),
        ' ' | '-' => CharClass::Gap,
        _ => CharClass::Other,
    }
}

/// 会话统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub chars_seen: u64,
    pub plain_spans: u64,
    pub card_spans: u64,
    pub card_chars: u64,
}

/// 单个字符流的检测会话，独占全部缓冲
pub struct Session<S: SpanSink> {
    sink: S,
    window: CharWindow,
    resolver: MatchResolver,
    state: State,
    stats: SessionStats,
}

impl<S: SpanSink> Session<S> {
    /// 使用默认选项创建
    pub fn new(sink: S) -> Self {
        Self::build(sink, &MaskerOptions::default())
    }

    pub fn with_options(sink: S, opts: &MaskerOptions) -> Result<Self> {
        opts.validate()?;
        Ok(Self::build(sink, opts))
    }

    fn build(sink: S, opts: &MaskerOptions) -> Self {
        Self {
            sink,
            window: CharWindow::new(opts.window_capacity),
            resolver: MatchResolver::new(),
            state: State::Data,
            stats: SessionStats::default(),
        }
    }

    /// 输入一个字符；可能同步触发零个或多个回调
    pub fn append(&mut self, c: char) {
        if self.window.is_full() {
            self.spill();
        }
        let pos = self.window.push(c);
        self.stats.chars_seen += 1;

        match (self.state, classify(c)) {
            (_, CharClass::Digit(d)) => {
                self.state = State::CcDigit;
                match self.resolver.push_digit(d, pos, self.window.base()) {
                    Verdict::Matched { start, len } => trace!(start, len, "valid window"),
                    Verdict::Broken => self.resolve(),
                    Verdict::Pending => {}
                }
            }
            (State::CcDigit, CharClass::Gap) => self.state = State::CcGap,
            (State::Data, _) => {}
            // 连续分隔符或其他字符：结束当前候选
            (State::CcDigit | State::CcGap, _) => self.resolve(),
        }
    }

    /// 依次输入字符串中的每个字符
    pub fn append_str(&mut self, s: &str) {
        for c in s.chars() {
            self.append(c);
        }
    }

    /// 结束流：发出全部缓冲内容。可重复调用，之后的调用不产生回调
    pub fn close(&mut self) {
        self.resolve();
        let end = self.window.next();
        self.emit(SpanKind::Plain, end);
        debug_assert!(self.window.is_empty());
        self.window.clear();
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 结束流并交还回调对象
    pub fn into_sink(mut self) -> S {
        self.close();
        self.sink
    }

    /// 裁决：有软匹配则发出其前缀与卡号区间，后缀留待下次；否则全部作为普通数据发出
    fn resolve(&mut self) {
        match self.resolver.take_soft_match() {
            Some(m) => {
                debug!(start = m.start, len = m.end - m.start, "card data resolved");
                self.emit(SpanKind::Plain, m.start);
                self.emit(SpanKind::Card, m.end);
            }
            None => {
                let end = self.window.next();
                self.emit(SpanKind::Plain, end);
            }
        }
        self.resolver.reset();
        self.state = State::Data;
    }

    /// 窗口已满：发出已确定的部分，只保留后续判定仍需要的字符
    fn spill(&mut self) {
        if let Some(m) = self.resolver.soft_match() {
            debug!(start = m.start, end = m.end, "window full, flushing soft match");
            self.emit(SpanKind::Plain, m.start);
            self.emit(SpanKind::Card, m.end);
            self.resolver.carry_soft_match();
        } else if let Some(oldest) = self.resolver.oldest_digit() {
            debug!(keep_from = oldest, "window full, flushing data before digit run");
            self.emit(SpanKind::Plain, oldest);
        } else {
            let end = self.window.next();
            self.emit(SpanKind::Plain, end);
        }
        assert!(!self.window.is_full(), "window spill released nothing");
    }

    fn emit(&mut self, kind: SpanKind, end: u64) {
        let Self { sink, window, stats, .. } = self;
        window.take(end, |text, pos| {
            match kind {
                SpanKind::Plain => stats.plain_spans += 1,
                SpanKind::Card => {
                    stats.card_spans += 1;
                    stats.card_chars += text.len() as u64;
                }
            }
            sink.on_span(kind, text, pos);
        });
    }
}

impl<S: SpanSink> Extend<char> for Session<S> {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        for c in iter {
            self.append(c);
        }
    }
}
