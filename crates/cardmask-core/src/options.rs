//! 掩码/扫描选项与统计信息（模块）
use encoding_rs::{Encoding, UTF_8};

use crate::error::{MaskerError, Result};
use crate::redact::DEFAULT_MASK_CHAR;
use crate::window::{DEFAULT_WINDOW_CAPACITY, MIN_WINDOW_CAPACITY};

/// 单个会话的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskerOptions {
    /// 字符窗口容量（字符数）；超过该长度的未决内容会被分段发出
    pub window_capacity: usize,
    /// 卡号数字的替换字符（由输出端使用，核心不关心）
    pub mask_char: char,
    /// 输入解码与输出编码使用的字符集（默认 UTF-8）
    pub encoding: &'static Encoding,
}

impl Default for MaskerOptions {
    fn default() -> Self {
        Self { window_capacity: DEFAULT_WINDOW_CAPACITY, mask_char: DEFAULT_MASK_CHAR, encoding: UTF_8 }
    }
}

impl MaskerOptions {
    /// 按 WHATWG 标签设置字符集，例如 "utf-8"、"latin1"、"shift_jis"
    pub fn set_charset(&mut self, label: &str) -> Result<()> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| MaskerError::UnknownCharset(label.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_capacity < MIN_WINDOW_CAPACITY {
            return Err(MaskerError::WindowTooSmall {
                got: self.window_capacity,
                min: MIN_WINDOW_CAPACITY,
            });
        }
        if self.mask_char.is_ascii_digit() {
            return Err(MaskerError::DigitMaskChar(self.mask_char));
        }
        Ok(())
    }
}

/// 目录扫描选项
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub masker: MaskerOptions,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub findings: usize,
}
