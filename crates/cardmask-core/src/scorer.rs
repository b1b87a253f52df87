//! 增量 Luhn 计分（LuhnScorer）
//!
//! 对每个候选长度 L ∈ [14, 16]，维护以最新数字结尾、长度为 L 的窗口上的两个累计和：
//! - `plain`：最新数字不加倍（即该窗口的 Luhn 和）；
//! - `shifted`：最新数字加倍（下一个数字到来后，所有数字的角色互换）。
//!
//! 新数字 x 进入时：
//! `plain' = x + shifted - 离开数字在 plain 下的贡献`，
//! `shifted' = D[x] + plain - 离开数字在 shifted 下的贡献`，
//! 离开数字为旧窗口中距最新数字 L-1 位者（不足 L 位时没有）。每步 O(1)。
use crate::ring::{DigitRecord, DigitRing, MAX_CARD_LEN, MIN_CARD_LEN};

const LENGTHS: usize = MAX_CARD_LEN - MIN_CARD_LEN + 1;

#[derive(Debug, Clone, Copy, Default)]
struct WindowSum {
    plain: u16,
    shifted: u16,
}

#[derive(Debug)]
pub(crate) struct LuhnScorer {
    sums: [WindowSum; LENGTHS],
    /// 当前连续数字个数（封顶于 MAX_CARD_LEN）
    seen: usize,
}

impl LuhnScorer {
    pub(crate) fn new() -> Self {
        Self { sums: [WindowSum::default(); LENGTHS], seen: 0 }
    }

    /// 记入新数字；`ring` 为记入前的数字环
    pub(crate) fn push(&mut self, digit: &DigitRecord, ring: &DigitRing) {
        debug_assert_eq!(ring.len(), self.seen, "scorer and ring out of step");
        for (i, sum) in self.sums.iter_mut().enumerate() {
            let len = MIN_CARD_LEN + i;
            // 离开数字在新窗口中距最新位为 len：plain 下奇数距离加倍，shifted 相反
            let (leave_plain, leave_shifted) = match ring.back(len - 1) {
                Some(old) => (
                    old.contribution(len % 2 == 1) as u16,
                    old.contribution(len % 2 == 0) as u16,
                ),
                None => (0, 0),
            };
            let plain = digit.plain as u16 + sum.shifted - leave_plain;
            let shifted = digit.doubled as u16 + sum.plain - leave_shifted;
            *sum = WindowSum { plain, shifted };
        }
        self.seen = (self.seen + 1).min(MAX_CARD_LEN);
    }

    /// 以最新数字结尾、长度为 `len` 的窗口是否通过校验
    pub(crate) fn is_valid(&self, len: usize) -> bool {
        assert!((MIN_CARD_LEN..=MAX_CARD_LEN).contains(&len), "unsupported window length {len}");
        self.seen >= len && self.sums[len - MIN_CARD_LEN].plain % 10 == 0
    }

    /// 当前可判定的最长窗口
    pub(crate) fn max_len(&self) -> usize {
        self.seen
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luhn;

    fn feed(scorer: &mut LuhnScorer, ring: &mut DigitRing, digits: &[u8]) {
        for &d in digits {
            let pos = ring.back(0).map_or(0, |r| r.position + 1);
            let rec = DigitRecord::new(d, pos);
            scorer.push(&rec, ring);
            ring.push(rec);
        }
    }

    #[test]
    fn validates_sixteen_digit_card() {
        let mut scorer = LuhnScorer::new();
        let mut ring = DigitRing::new();
        feed(&mut scorer, &mut ring, &luhn::digits("4111111111111111"));
        assert!(scorer.is_valid(16));
        assert!(!scorer.is_valid(15));
    }

    #[test]
    fn short_run_is_never_valid() {
        let mut scorer = LuhnScorer::new();
        let mut ring = DigitRing::new();
        feed(&mut scorer, &mut ring, &[0; 13]);
        assert_eq!(scorer.max_len(), 13);
        assert!(!scorer.is_valid(14));
        feed(&mut scorer, &mut ring, &[0]);
        assert!(scorer.is_valid(14));
        assert!(!scorer.is_valid(15));
    }

    #[quickcheck_macros::quickcheck]
    fn matches_rescan_oracle(raw: Vec<u8>) -> bool {
        let digits: Vec<u8> = raw.into_iter().map(|b| b % 10).collect();
        let mut scorer = LuhnScorer::new();
        let mut ring = DigitRing::new();
        for (n, &d) in digits.iter().enumerate() {
            let rec = DigitRecord::new(d, n as u64);
            scorer.push(&rec, &ring);
            ring.push(rec);
            for len in MIN_CARD_LEN..=MAX_CARD_LEN {
                let expected = n + 1 >= len && luhn::is_valid(&digits[n + 1 - len..=n]);
                if scorer.is_valid(len) != expected {
                    return false;
                }
            }
        }
        true
    }
}
