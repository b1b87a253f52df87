//! 错误类型（库层使用 thiserror，驱动层/CLI 使用 anyhow 包装）
use thiserror::Error;

/// 掩码库的错误
#[derive(Debug, Error)]
pub enum MaskerError {
    /// 字符窗口容量小于下限
    #[error("window capacity {got} is below the minimum of {min}")]
    WindowTooSmall { got: usize, min: usize },

    /// 掩码字符不可为 ASCII 数字（否则输出仍可被识别为卡号）
    #[error("mask char {0:?} must not be an ASCII digit")]
    DigitMaskChar(char),

    /// 无法识别的字符集名称
    #[error("unknown charset {0:?}")]
    UnknownCharset(String),

    /// 配置文件解析失败
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = MaskerError> = std::result::Result<T, E>;
