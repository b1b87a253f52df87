//! 候选匹配裁决（MatchResolver）
//!
//! 每来一个数字：数字环至少 14 位时，按长度 min(环长, 16)..=14 降序取第一个通过校验的窗口。
//! - 命中：建立或扩展软匹配（soft match），起点取更早者；
//! - 未命中且已有软匹配：上一步的匹配即为最终结果，需立即发出（`Broken`）；
//! - 环超过 16 位时由 `DigitRing` 淘汰最早的数字，长串数字可持续滑动判定。
use crate::ring::{DigitRecord, DigitRing, MAX_CARD_LEN, MIN_CARD_LEN};
use crate::scorer::LuhnScorer;

/// 软匹配：已通过校验、仍可能继续延长的区间（流内绝对偏移，`end` 不含）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SoftMatch {
    pub(crate) start: u64,
    pub(crate) end: u64,
}

/// 单个数字的裁决结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// 尚无候选
    Pending,
    /// 以该数字结尾的窗口通过校验
    Matched { start: u64, len: usize },
    /// 已有软匹配无法延长，须立即发出
    Broken,
}

#[derive(Debug)]
pub(crate) struct MatchResolver {
    ring: DigitRing,
    scorer: LuhnScorer,
    soft: Option<SoftMatch>,
}

impl MatchResolver {
    pub(crate) fn new() -> Self {
        Self { ring: DigitRing::new(), scorer: LuhnScorer::new(), soft: None }
    }

    /// 记入一个数字；`floor` 为字符窗口当前的最早偏移，软匹配起点不会早于它
    pub(crate) fn push_digit(&mut self, value: u8, position: u64, floor: u64) -> Verdict {
        let rec = DigitRecord::new(value, position);
        self.scorer.push(&rec, &self.ring);
        self.ring.push(rec);

        if self.ring.len() < MIN_CARD_LEN {
            return Verdict::Pending;
        }

        let longest = self.scorer.max_len().min(MAX_CARD_LEN);
        let found = (MIN_CARD_LEN..=longest).rev().find(|&len| self.scorer.is_valid(len));
        match found {
            Some(len) => {
                let window_start = match self.ring.back(len - 1) {
                    Some(first) => first.position,
                    None => unreachable!("ring holds fewer than {len} digits"),
                };
                let start = match self.soft {
                    Some(prev) => prev.start.min(window_start).max(floor),
                    None => window_start,
                };
                self.soft = Some(SoftMatch { start, end: position + 1 });
                Verdict::Matched { start: window_start, len }
            }
            None if self.soft.is_some() => Verdict::Broken,
            None => Verdict::Pending,
        }
    }

    pub(crate) fn soft_match(&self) -> Option<SoftMatch> {
        self.soft
    }

    /// 取走软匹配（发出后调用）
    pub(crate) fn take_soft_match(&mut self) -> Option<SoftMatch> {
        self.soft.take()
    }

    /// 窗口溢出时：已发出部分不再属于候选，候选以空区间 `[end, end)` 延续
    pub(crate) fn carry_soft_match(&mut self) {
        if let Some(soft) = self.soft.as_mut() {
            soft.start = soft.end;
        }
    }

    /// 仍需保留以便后续判定的最早数字偏移
    pub(crate) fn oldest_digit(&self) -> Option<u64> {
        self.ring.oldest().map(|r| r.position)
    }

    /// 清空数字环、计分与软匹配（每次裁决发出后调用）
    pub(crate) fn reset(&mut self) {
        self.ring.clear();
        self.scorer.clear();
        self.soft = None;
    }
}
