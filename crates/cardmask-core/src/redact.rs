//! 持有者侧脱敏：卡号区间内的 ASCII 数字替换为掩码字符，其余字符原样保留
use encoding_rs::{CoderResult, Encoder, Encoding, UTF_8};
use std::io::{self, Write};

use crate::sink::SpanSink;

/// 默认掩码字符
pub const DEFAULT_MASK_CHAR: char = 'X';

/// 替换 ASCII 数字，保留分隔符
pub fn mask_digits(text: &[char], mask_char: char) -> String {
    text.iter().map(|&c| if c.is_ascii_digit() { mask_char } else { c }).collect()
}

/// 将区间编码后写入 `W` 的回调实现
///
/// 回调本身不能返回错误：第一次写失败后记下错误并跳过后续写入，由 `finish` 返回。
/// 目标字符集无法表示的字符按 encoding_rs 的规则写成数字字符引用（`&#NNNN;`）。
pub struct RedactingWriter<W: Write> {
    inner: W,
    mask_char: char,
    scratch: String,
    /// None 表示直接写 UTF-8
    encoder: Option<Encoder>,
    encoded: Vec<u8>,
    error: Option<io::Error>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, mask_char: char) -> Self {
        Self::with_encoding(inner, mask_char, UTF_8)
    }

    pub fn with_encoding(inner: W, mask_char: char, encoding: &'static Encoding) -> Self {
        // UTF-16 等编码的输出端由 encoding_rs 映射为 UTF-8
        let encoder = (encoding.output_encoding() != UTF_8).then(|| encoding.new_encoder());
        Self { inner, mask_char, scratch: String::new(), encoder, encoded: Vec::new(), error: None }
    }

    fn write_encoded(&mut self, last: bool) {
        let Some(encoder) = self.encoder.as_mut() else {
            if let Err(e) = self.inner.write_all(self.scratch.as_bytes()) {
                self.error = Some(e);
            }
            return;
        };
        let mut src = self.scratch.as_str();
        loop {
            self.encoded.clear();
            let (result, read, _) = encoder.encode_from_utf8_to_vec(src, &mut self.encoded, last);
            src = &src[read..];
            if let Err(e) = self.inner.write_all(&self.encoded) {
                self.error = Some(e);
                return;
            }
            match result {
                CoderResult::InputEmpty => return,
                CoderResult::OutputFull => self.encoded.reserve(src.len() + 16),
            }
        }
    }

    fn write_chars(&mut self, text: &[char], mask: bool) {
        if self.error.is_some() {
            return;
        }
        self.scratch.clear();
        if mask {
            self.scratch.push_str(&mask_digits(text, self.mask_char));
        } else {
            self.scratch.extend(text);
        }
        self.write_encoded(false);
    }

    /// 刷新并交还底层写入器；若此前写入失败，返回记下的第一个错误
    pub fn finish(mut self) -> io::Result<W> {
        if self.error.is_none() && self.encoder.is_some() {
            // 有状态编码（如 ISO-2022-JP）需要写出收尾序列
            self.scratch.clear();
            self.write_encoded(true);
        }
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> SpanSink for RedactingWriter<W> {
    fn on_plain(&mut self, text: &[char], _position: u64) {
        self.write_chars(text, false);
    }

    fn on_card(&mut self, text: &[char], _position: u64) {
        self.write_chars(text, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn masks_digits_but_keeps_separators() {
        assert_eq!(mask_digits(&chars("4111-1111 1111 1111"), 'X'), "XXXX-XXXX XXXX XXXX");
        assert_eq!(mask_digits(&chars("5-1"), '*'), "*-*");
    }

    #[test]
    fn writer_redacts_card_spans_only() {
        let mut w = RedactingWriter::new(Vec::new(), 'X');
        w.on_plain(&chars("card: "), 0);
        w.on_card(&chars("4111 1111 1111 1111"), 6);
        w.on_plain(&chars(" ü\n"), 25);
        let out = w.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "card: XXXX XXXX XXXX XXXX ü\n");
    }

    #[test]
    fn writer_encodes_into_target_charset() {
        let mut w = RedactingWriter::with_encoding(Vec::new(), 'X', encoding_rs::WINDOWS_1252);
        w.on_plain(&chars("café "), 0);
        w.on_card(&chars("4111-1111-1111-1111"), 5);
        w.on_plain(&chars(" €"), 24);
        let out = w.finish().unwrap();
        assert_eq!(out, b"caf\xe9 XXXX-XXXX-XXXX-XXXX \x80");
    }

    #[test]
    fn unmappable_chars_become_references() {
        let mut w = RedactingWriter::with_encoding(Vec::new(), 'X', encoding_rs::WINDOWS_1252);
        w.on_plain(&chars("a\u{4e2d}b"), 0);
        assert_eq!(w.finish().unwrap(), b"a&#20013;b");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_reported_on_finish() {
        let mut w = RedactingWriter::new(Broken, 'X');
        w.on_plain(&chars("a"), 0);
        w.on_card(&chars("1"), 1);
        let err = w.finish().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
