//! 配置文件加载（TOML）
//!
//! 所有字段可选；命令行参数优先于文件中的值（由 CLI 决定覆盖顺序）。
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::options::ScanOptions;

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskerConfig {
    #[serde(default)]
    pub window_capacity: Option<usize>,
    #[serde(default)]
    pub mask_char: Option<char>,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl MaskerConfig {
    pub fn from_toml(txt: &str) -> Result<Self> {
        Ok(toml::from_str(txt)?)
    }

    /// 从 TOML 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let txt = std::fs::read_to_string(path)?;
        Self::from_toml(&txt)
    }

    /// 将文件中出现的字段写入选项，并校验结果
    pub fn apply(&self, opts: &mut ScanOptions) -> Result<()> {
        if let Some(cap) = self.window_capacity {
            opts.masker.window_capacity = cap;
        }
        if let Some(c) = self.mask_char {
            opts.masker.mask_char = c;
        }
        if let Some(label) = &self.charset {
            opts.masker.set_charset(label)?;
        }
        if self.threads.is_some() {
            opts.threads = self.threads;
        }
        if self.max_file_size.is_some() {
            opts.max_file_size = self.max_file_size;
        }
        opts.masker.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaskerError;
    use std::io::Write;

    #[test]
    fn applies_present_fields_only() {
        let cfg = MaskerConfig::from_toml("mask_char = \"#\"\ncharset = \"shift_jis\"\nthreads = 2\n").unwrap();
        let mut opts = ScanOptions::default();
        cfg.apply(&mut opts).unwrap();
        assert_eq!(opts.masker.mask_char, '#');
        assert_eq!(opts.masker.window_capacity, 1024);
        assert_eq!(opts.masker.encoding, encoding_rs::SHIFT_JIS);
        assert_eq!(opts.threads, Some(2));
        assert_eq!(opts.max_file_size, None);
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        let err = MaskerConfig::from_toml("separators = \" -\"").unwrap_err();
        assert!(matches!(err, MaskerError::Config(_)));
    }

    #[test]
    fn unknown_charset_is_rejected() {
        let cfg = MaskerConfig::from_toml("charset = \"no-such-charset\"").unwrap();
        let mut opts = ScanOptions::default();
        assert!(matches!(cfg.apply(&mut opts), Err(MaskerError::UnknownCharset(_))));
    }

    #[test]
    fn apply_validates() {
        let cfg = MaskerConfig { window_capacity: Some(10), ..Default::default() };
        let mut opts = ScanOptions::default();
        assert!(matches!(cfg.apply(&mut opts), Err(MaskerError::WindowTooSmall { .. })));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window_capacity = 4096\nmax_file_size = 5242880").unwrap();
        let cfg = MaskerConfig::load(file.path()).unwrap();
        assert_eq!(cfg.window_capacity, Some(4096));
        assert_eq!(cfg.max_file_size, Some(5_242_880));
    }
}
