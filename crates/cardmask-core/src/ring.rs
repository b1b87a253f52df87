//! 数字环（DigitRing）：最近 16 个数字及其在字符窗口中的偏移
use crate::luhn::contribution;

/// 卡号最短长度
pub const MIN_CARD_LEN: usize = 14;
/// 卡号最长长度（同时是数字环容量）
pub const MAX_CARD_LEN: usize = 16;

/// 单个数字记录，创建后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DigitRecord {
    pub(crate) value: u8,
    /// 流内绝对偏移
    pub(crate) position: u64,
    /// 不加倍时的贡献
    pub(crate) plain: u8,
    /// 加倍时的贡献
    pub(crate) doubled: u8,
}

impl DigitRecord {
    pub(crate) fn new(value: u8, position: u64) -> Self {
        Self {
            value,
            position,
            plain: contribution(value, false),
            doubled: contribution(value, true),
        }
    }

    #[inline]
    pub(crate) fn contribution(&self, doubled: bool) -> u8 {
        if doubled { self.doubled } else { self.plain }
    }
}

/// 固定容量环形缓冲；`head` 指向最早的记录
#[derive(Debug)]
pub(crate) struct DigitRing {
    slots: [Option<DigitRecord>; MAX_CARD_LEN],
    head: usize,
    len: usize,
}

impl DigitRing {
    pub(crate) fn new() -> Self {
        Self { slots: [None; MAX_CARD_LEN], head: 0, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot(&self, logical: usize) -> usize {
        debug_assert!(logical < MAX_CARD_LEN);
        (self.head + logical) % MAX_CARD_LEN
    }

    /// 追加记录；环满时淘汰并返回最早的一条
    pub(crate) fn push(&mut self, rec: DigitRecord) -> Option<DigitRecord> {
        debug_assert!(rec.value < 10);
        if let Some(newest) = self.back(0) {
            debug_assert!(rec.position > newest.position, "digit offsets must increase");
        }
        if self.len == MAX_CARD_LEN {
            let evicted = self.slots[self.head].replace(rec);
            self.head = (self.head + 1) % MAX_CARD_LEN;
            evicted
        } else {
            let idx = self.slot(self.len);
            self.slots[idx] = Some(rec);
            self.len += 1;
            None
        }
    }

    /// 距最新记录 `distance` 位的记录（0 为最新）
    pub(crate) fn back(&self, distance: usize) -> Option<&DigitRecord> {
        if distance >= self.len {
            return None;
        }
        self.slots[self.slot(self.len - 1 - distance)].as_ref()
    }

    pub(crate) fn oldest(&self) -> Option<&DigitRecord> {
        if self.is_empty() { None } else { self.slots[self.head].as_ref() }
    }

    pub(crate) fn clear(&mut self) {
        self.slots = [None; MAX_CARD_LEN];
        self.head = 0;
        self.len = 0;
    }

    /// 从旧到新的数字值（测试用）
    #[cfg(test)]
    pub(crate) fn values(&self) -> Vec<u8> {
        (0..self.len).rev().filter_map(|d| self.back(d)).map(|r| r.value).collect()
    }
}
