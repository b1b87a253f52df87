//! Luhn 校验（从零计算的版本）
//!
//! 流式引擎使用 `scorer` 中的增量求和；这里的实现逐位重算，
//! 作为差分测试的对照（oracle），同时对外提供校验位计算等工具函数。

/// 数字加倍后的 Luhn 取值：`2d`，大于 9 时减 9
pub const LUHN_DOUBLED: [u8; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// 单个数字在 Luhn 求和中的贡献
#[inline]
pub(crate) fn contribution(digit: u8, doubled: bool) -> u8 {
    assert!(digit < 10, "not a decimal digit: {digit}");
    if doubled { LUHN_DOUBLED[digit as usize] } else { digit }
}

/// 整段数字是否通过 Luhn 校验（最右一位为校验位，不加倍）
pub fn is_valid(digits: &[u8]) -> bool {
    if digits.is_empty() {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(k, &d)| contribution(d, k % 2 == 1) as u32)
        .sum();
    sum % 10 == 0
}

/// 计算追加到 `payload` 末尾后可使整体通过校验的数字
pub fn check_digit(payload: &[u8]) -> u8 {
    // 追加一位后，payload 的最右一位处于“加倍”位置
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(k, &d)| contribution(d, k % 2 == 0) as u32)
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// 提取文本中的 ASCII 数字（忽略分隔符及其他字符）
pub fn digits(text: &str) -> Vec<u8> {
    text.bytes().filter(u8::is_ascii_digit).map(|b| b - b'0').collect()
}

/// 暴力搜索第一个合法窗口：起点升序，同起点时长度降序
///
/// 返回 `(offset, len)`；仅用于测试对照，复杂度 O(n·(max-min))。
pub fn find_window(digits: &[u8], min_len: usize, max_len: usize) -> Option<(usize, usize)> {
    assert!(min_len > 0 && min_len <= max_len, "bad window bounds {min_len}..={max_len}");
    for start in 0..digits.len() {
        let longest = max_len.min(digits.len() - start);
        for len in (min_len..=longest).rev() {
            if is_valid(&digits[start..start + len]) {
                return Some((start, len));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4111 1111 1111 1111")]
    #[case("4242 4242 4242 4242")]
    #[case("18")]
    #[case("56613959932537")]
    fn accepts_valid_numbers(#[case] number: &str) {
        assert!(is_valid(&digits(number)), "{number}");
    }

    #[rstest]
    #[case("4111 1111 1111 1112")]
    #[case("1234 5678 9012 3456")]
    #[case("")]
    fn rejects_invalid_numbers(#[case] number: &str) {
        assert!(!is_valid(&digits(number)), "{number}");
    }

    #[rstest]
    #[case("411111111111111", 1)]
    #[case("41111111111111", 6)]
    #[case("4111111111111", 4)]
    #[case("567", 8)]
    #[case("3", 4)]
    fn computes_check_digit(#[case] payload: &str, #[case] expected: u8) {
        let mut d = digits(payload);
        assert_eq!(check_digit(&d), expected);
        d.push(expected);
        assert!(is_valid(&d));
    }

    #[test]
    fn digits_skips_separators() {
        assert_eq!(digits("4111-1111 11a1"), vec![4, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn find_window_prefers_earliest_then_longest() {
        let d = digits("111811");
        assert_eq!(find_window(&d, 2, 2), Some((2, 2)));
        assert_eq!(find_window(&digits("18"), 2, 2), Some((0, 2)));
        assert_eq!(find_window(&digits("1111"), 2, 2), None);
    }

    #[quickcheck_macros::quickcheck]
    fn appended_check_digit_validates(raw: Vec<u8>) -> bool {
        let payload: Vec<u8> = raw.into_iter().map(|b| b % 10).collect();
        let mut full = payload.clone();
        full.push(check_digit(&payload));
        is_valid(&full)
    }
}
