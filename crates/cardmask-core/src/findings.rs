//! 扫描模式下的命中项
use serde::Serialize;

use crate::redact::mask_digits;
use crate::sink::SpanSink;

/// 单个命中（对应 result.json 的单个元素）；卡号原文不落盘，只输出掩码后的文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub file: String,
    /// 字符偏移
    pub offset: u64,
    /// 字符数（含分隔符）
    pub length: usize,
    pub masked: String,
}

/// 收集卡号区间的回调；普通数据直接丢弃
pub(crate) struct FindingSink {
    file: String,
    mask_char: char,
    pub(crate) findings: Vec<Finding>,
}

impl FindingSink {
    pub(crate) fn new(file: &str, mask_char: char) -> Self {
        Self { file: file.to_string(), mask_char, findings: Vec::new() }
    }
}

impl SpanSink for FindingSink {
    fn on_plain(&mut self, _text: &[char], _position: u64) {}

    fn on_card(&mut self, text: &[char], position: u64) {
        // 窗口溢出时同一串数字会分段发出，相邻的卡号区间合并为一个命中
        if let Some(last) = self.findings.last_mut() {
            if last.offset + last.length as u64 == position {
                last.length += text.len();
                last.masked.push_str(&mask_digits(text, self.mask_char));
                return;
            }
        }
        self.findings.push(Finding {
            file: self.file.clone(),
            offset: position,
            length: text.len(),
            masked: mask_digits(text, self.mask_char),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_card_spans_merge() {
        let mut sink = FindingSink::new("f", 'X');
        let a: Vec<char> = "0000".chars().collect();
        sink.on_card(&a, 10);
        sink.on_card(&a, 14);
        sink.on_plain(&['x'], 18);
        sink.on_card(&a, 19);
        assert_eq!(sink.findings.len(), 2);
        assert_eq!(sink.findings[0].length, 8);
        assert_eq!(sink.findings[0].masked, "XXXXXXXX");
        assert_eq!(sink.findings[1].offset, 19);
    }
}
