//! 卡号流式检测与掩码核心库
//!
//! 设计要点：
//! - 逐字符处理：状态机分类字符，数字进入固定容量的数字环，增量维护 14–16 位窗口的 Luhn 和，
//!   每个字符 O(1) 摊还开销。
//! - 发出的区间首尾相接即为原始输入：普通数据与卡号数据（含分隔符原文）互不重叠、不遗漏。
//! - 内存有界：字符窗口与数字环容量固定；超长数字串滑动判定，窗口满时分段发出。
//! - 核心不做 I/O，也不决定替换字符；脱敏方式由回调持有者决定（见 `redact`）。

mod config;
mod error;
mod findings;
pub mod luhn;
mod options;
mod redact;
mod resolver;
mod ring;
mod scan;
mod scorer;
mod session;
mod sink;
mod window;

pub use config::MaskerConfig;
pub use error::{MaskerError, Result};
pub use findings::Finding;
pub use options::{MaskerOptions, ScanOptions, ScanStats};
pub use redact::{mask_digits, RedactingWriter, DEFAULT_MASK_CHAR};
pub use ring::{MAX_CARD_LEN, MIN_CARD_LEN};
pub use scan::{mask_stream, scan_and_write, scan_file};
pub use session::{Session, SessionStats};
pub use sink::{Span, SpanCollector, SpanKind, SpanSink};
pub use window::{DEFAULT_WINDOW_CAPACITY, MIN_WINDOW_CAPACITY};
