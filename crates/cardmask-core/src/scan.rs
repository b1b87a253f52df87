//! 驱动层：流式掩码与目录扫描
//!
//! 核心会话只处理字符；这里负责读取、按选项中的字符集解码（有损）与输出。
use anyhow::{Context, Result};
use encoding_rs::{CoderResult, Encoding};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::findings::{Finding, FindingSink};
use crate::options::{MaskerOptions, ScanOptions, ScanStats};
use crate::redact::RedactingWriter;
use crate::session::{Session, SessionStats};
use crate::sink::SpanSink;

const READ_CHUNK: usize = 8 * 1024;

/// 分块读取字节，增量解码后送入会话
///
/// 解码器跨块保留半个多字节序列，块边界不影响检测；非法序列替换为 U+FFFD。
fn feed_decoded<R: Read, S: SpanSink>(
    reader: &mut R,
    encoding: &'static Encoding,
    session: &mut Session<S>,
) -> io::Result<()> {
    let mut decoder = encoding.new_decoder();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut text = String::with_capacity(READ_CHUNK * 3);
    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let last = n == 0;
        let mut src = &buf[..n];
        loop {
            text.clear();
            let (result, read, _) = decoder.decode_to_string(src, &mut text, last);
            src = &src[read..];
            session.append_str(&text);
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => text.reserve(src.len() * 3 + 16),
            }
        }
        if last {
            return Ok(());
        }
    }
}

/// 从 `reader` 读取文本，将卡号数字替换为掩码字符后写入 `writer`（输入输出使用同一字符集）
pub fn mask_stream<R: Read, W: Write>(mut reader: R, writer: W, opts: &MaskerOptions) -> Result<SessionStats> {
    let sink = RedactingWriter::with_encoding(writer, opts.mask_char, opts.encoding);
    let mut session = Session::with_options(sink, opts)?;
    feed_decoded(&mut reader, opts.encoding, &mut session).context("read input")?;
    session.close();
    let stats = session.stats();
    session.into_sink().finish().context("write output")?;
    debug!(chars = stats.chars_seen, cards = stats.card_spans, "stream masked");
    Ok(stats)
}

/// 扫描单个文件，返回命中项（按偏移升序）
pub fn scan_file(path: &Path, name: &str, opts: &MaskerOptions) -> Result<Vec<Finding>> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut session = Session::with_options(FindingSink::new(name, opts.mask_char), opts)?;
    feed_decoded(&mut file, opts.encoding, &mut session).with_context(|| format!("read {}", path.display()))?;
    Ok(session.into_sink().findings)
}

/// 扫描目录并将命中项以 JSON 数组流式写入 `out`
/// 稳定性保证：文件按文件名排序输出；文件内命中按偏移升序
pub fn scan_and_write(input_dir: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    opts.masker.validate()?;
    info!(input = %input_dir.display(), "starting scan");

    let mut files: Vec<PathBuf> = vec![];
    // 只扫描一层目录
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("walk {}", input_dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    let mut writer = FindingWriter::new(out);
    if threads > 1 && files.len() > 1 {
        scan_parallel(&files, &mut writer, opts, threads)?;
    } else {
        for path in &files {
            let outcome = scan_one(path, opts);
            writer.write(outcome)?;
        }
    }
    let stats = writer.finish()?;
    info!(
        files_scanned = stats.files_scanned,
        files_skipped = stats.files_skipped,
        findings = stats.findings,
        "scan finished"
    );
    Ok(stats)
}

/// 单个文件的扫描结果；None 表示被跳过
type Outcome = Option<Vec<Finding>>;

fn scan_one(path: &Path, opts: &ScanOptions) -> Outcome {
    let name = path.file_name().and_then(|s| s.to_str())?;
    if let Some(max) = opts.max_file_size {
        match std::fs::metadata(path) {
            Ok(md) if md.len() > max => {
                debug!(file = name, size = md.len(), "skipping large file");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(file = name, error = %e, "metadata failed");
                return None;
            }
        }
    }
    match scan_file(path, name, &opts.masker) {
        Ok(findings) => Some(findings),
        Err(e) => {
            warn!(file = name, error = %e, "skipping unreadable file");
            None
        }
    }
}

/// 并行调度：
/// - Rayon 线程池并行扫描，每个文件一个独立会话
/// - 单线程 Writer 按 idx 重排后写出，保证稳定顺序
fn scan_parallel(files: &[PathBuf], writer: &mut FindingWriter<'_>, opts: &ScanOptions, threads: usize) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("build rayon pool")?;
    let (tx, rx) = channel::bounded::<(usize, Outcome)>(256);

    let indexed: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    let scan_opts = opts.clone();
    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            indexed.par_iter().for_each_with(tx, |tx, (idx, path)| {
                let _ = tx.send((*idx, scan_one(path, &scan_opts)));
            });
        });
        // tx 的全部副本随 for_each_with 结束而释放，rx 随之关闭
    });

    let mut next_idx = 0usize;
    let mut pending: BTreeMap<usize, Outcome> = BTreeMap::new();
    let mut result = Ok(());
    for (idx, outcome) in rx.iter() {
        pending.insert(idx, outcome);
        while let Some(outcome) = pending.remove(&next_idx) {
            if result.is_ok() {
                result = writer.write(outcome);
            }
            next_idx += 1;
        }
    }

    if scan_thread.join().is_err() {
        anyhow::bail!("scan worker panicked");
    }
    result?;
    debug_assert!(pending.is_empty() && next_idx == files.len());
    Ok(())
}

/// 流式写 JSON 数组并累计统计
struct FindingWriter<'a> {
    out: &'a mut dyn Write,
    first: bool,
    stats: ScanStats,
}

impl<'a> FindingWriter<'a> {
    fn new(out: &'a mut dyn Write) -> Self {
        Self { out, first: true, stats: ScanStats::default() }
    }

    fn write(&mut self, outcome: Outcome) -> Result<()> {
        let findings = match outcome {
            Some(f) => f,
            None => {
                self.stats.files_skipped += 1;
                return Ok(());
            }
        };
        self.stats.files_scanned += 1;
        for f in &findings {
            if self.first {
                write!(self.out, "[")?;
                self.first = false;
            } else {
                write!(self.out, ",")?;
            }
            serde_json::to_writer(&mut *self.out, f)?;
            self.stats.findings += 1;
        }
        Ok(())
    }

    fn finish(self) -> Result<ScanStats> {
        if self.first {
            write!(self.out, "[")?;
        }
        write!(self.out, "]")?;
        self.out.flush()?;
        Ok(self.stats)
    }
}
