use anyhow::{Context, Result};
use cardmask_core::{mask_stream, scan_and_write, MaskerConfig, ScanOptions};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "cardmask", version, about = "支付卡号流式检测与掩码")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 掩码：卡号中的数字替换为掩码字符，其余内容原样输出
    Mask {
        /// 输入文件（默认标准输入）
        #[arg(long)]
        input: Option<PathBuf>,

        /// 输入与输出的字符集（默认 UTF-8，例如 latin1、shift_jis）
        #[arg(long)]
        charset: Option<String>,

        /// 输出文件（默认标准输出）
        #[arg(long)]
        output: Option<PathBuf>,

        /// 掩码字符（默认 X）
        #[arg(long)]
        mask_char: Option<char>,

        /// 配置文件路径（TOML）
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// 扫描目录并生成 result.json（只记录位置与掩码后的文本）
    Scan {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./result.json")]
        output: PathBuf,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 配置文件路径（TOML）
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Mask { input, charset, output, mask_char, config } => {
            let mut opts = load_options(config.as_deref())?;
            if let Some(c) = mask_char {
                opts.masker.mask_char = c;
            }
            if let Some(label) = &charset {
                opts.masker.set_charset(label)?;
            }
            opts.masker.validate()?;

            let reader: Box<dyn Read> = match &input {
                Some(path) => Box::new(File::open(path).with_context(|| format!("open {}", path.display()))?),
                None => Box::new(io::stdin().lock()),
            };
            let writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(File::create(path).with_context(|| format!("create {}", path.display()))?),
                None => Box::new(io::stdout().lock()),
            };
            let stats = mask_stream(reader, BufWriter::new(writer), &opts.masker).context("mask failed")?;
            info!(
                charset = opts.masker.encoding.name(),
                chars = stats.chars_seen,
                cards = stats.card_spans,
                "mask finished"
            );
        }
        Commands::Scan { input, output, threads, max_file_size, config } => {
            let mut opts = load_options(config.as_deref())?;
            // 命令行参数优先于配置文件
            if let Some(n) = parse_threads(&threads) {
                opts.threads = Some(n);
            }
            if max_file_size.is_some() {
                opts.max_file_size = max_file_size;
            }
            info!(?input, ?output, "starting scan");

            // 以缓冲方式打开输出文件，按 JSON 数组流式写入
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);
            let stats = scan_and_write(&input, &mut out, &opts).context("scan and write failed")?;
            out.flush().context("flush output")?;

            info!(files_scanned = stats.files_scanned, findings = stats.findings, "scan finished");
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只输出掩码后的数据
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 加载配置文件（可选）并合并到默认选项
fn load_options(config: Option<&Path>) -> Result<ScanOptions> {
    let mut opts = ScanOptions::default();
    if let Some(path) = config {
        let cfg = MaskerConfig::load(path).with_context(|| format!("load config {}", path.display()))?;
        cfg.apply(&mut opts)?;
    }
    Ok(opts)
}

/// 解析线程参数："auto" 或非法值返回 None（保持默认/配置值）
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
