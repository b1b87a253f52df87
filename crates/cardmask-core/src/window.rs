//! 字符窗口（CharWindow）
//!
//! 保存“尚未发出”的原始字符：
//! - 预分配固定容量，不会增长；满时由会话决定先发出哪一部分；
//! - 位置使用流内绝对偏移（`base` 为最早保留字符的偏移，单调递增），
//!   数字记录与候选匹配都直接引用绝对偏移，发出后无需重新换算。
use std::collections::VecDeque;

/// 默认容量（字符数）
pub const DEFAULT_WINDOW_CAPACITY: usize = 1024;
/// 容量下限
pub const MIN_WINDOW_CAPACITY: usize = 1024;

#[derive(Debug)]
pub(crate) struct CharWindow {
    chars: VecDeque<char>,
    capacity: usize,
    base: u64,
}

impl CharWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self { chars: VecDeque::with_capacity(capacity), capacity, base: 0 }
    }

    /// 写入一个字符，返回其流内偏移
    pub(crate) fn push(&mut self, c: char) -> u64 {
        assert!(!self.is_full(), "char window overflow at {}", self.next());
        let pos = self.next();
        self.chars.push_back(c);
        pos
    }

    pub(crate) fn is_full(&self) -> bool {
        self.chars.len() == self.capacity
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    /// 最早保留字符的流内偏移
    pub(crate) fn base(&self) -> u64 {
        self.base
    }

    /// 下一个写入字符的流内偏移（写游标）
    pub(crate) fn next(&self) -> u64 {
        self.base + self.chars.len() as u64
    }

    /// 将 `[base, end)` 作为连续切片交给 `f`，随后释放这段字符
    ///
    /// 空区间不调用 `f`。`end` 越界视为程序错误。
    pub(crate) fn take<F>(&mut self, end: u64, f: F)
    where
        F: FnOnce(&[char], u64),
    {
        assert!(
            end >= self.base && end <= self.next(),
            "take({end}) outside window [{}, {})",
            self.base,
            self.next()
        );
        let n = (end - self.base) as usize;
        if n == 0 {
            return;
        }
        let slice = self.chars.make_contiguous();
        f(&slice[..n], self.base);
        self.chars.drain(..n);
        self.base = end;
    }

    /// 丢弃全部内容并把偏移归零（新流）
    pub(crate) fn clear(&mut self) {
        self.chars.clear();
        self.base = 0;
    }
}
