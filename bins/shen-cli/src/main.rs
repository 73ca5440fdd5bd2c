//! shen - 深度相机采集命令行工具
//!
//! 连接 MINI 类结构光深度扫描仪, 采集指定帧数, 写出两个多页
//! TIFF: 深度序列 (16 位) 和辅助灰度序列 (8 位).

mod logging;

use clap::Parser;
use log::{info, warn};
use std::process;

use shen_core::{ScanFrame, ShenError, ShenResult};
use shen_device::{DeviceConfig, Scanner};
use shen_format::{IoContext, TiffMuxer};

#[derive(Parser, Debug)]
#[command(name = "shen-cli", version, about = "纯 Rust 深度相机采集工具")]
struct Cli {
    /// 设备地址 (IP 或主机名)
    #[arg(short, long)]
    addr: Option<String>,

    /// 连接配置 JSON 文件 (命令行参数优先)
    #[arg(long)]
    config: Option<String>,

    /// 采集帧数
    #[arg(short = 'n', long, default_value_t = 1)]
    frames: usize,

    /// 深度序列输出路径
    #[arg(long, default_value = "depth.tif")]
    depth_output: String,

    /// 辅助灰度序列输出路径
    #[arg(long, default_value = "other.tif")]
    aux_output: String,

    /// 深度增益 (1-16)
    #[arg(long)]
    gain: Option<u8>,

    /// 跳过 MINI 预调优寄存器写入
    #[arg(long)]
    skip_tuning: bool,

    /// 解复用扫描回退量 (字节, 固件相关: 4 或 10)
    #[arg(long)]
    rewind: Option<usize>,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    logging::init("shen-cli", cli.verbose);

    let config = match resolve_config(&cli) {
        Some(config) => config,
        None => {
            print_banner();
            return;
        }
    };

    if let Err(e) = run(&cli, config) {
        eprintln!("错误: {e}");
        process::exit(1);
    }
}

/// 汇总配置文件与命令行参数 (命令行优先)
fn resolve_config(cli: &Cli) -> Option<DeviceConfig> {
    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("错误: 无法读取配置文件 '{path}': {e}");
                process::exit(1);
            }
        },
        None => None,
    };

    if let Some(addr) = &cli.addr {
        config = match config.take() {
            Some(mut config) => {
                config.host = addr.clone();
                Some(config)
            }
            None => Some(DeviceConfig::new(addr.clone())),
        };
    }
    if let Some(rewind) = cli.rewind {
        if let Some(config) = config.as_mut() {
            config.rewind = rewind;
        }
    }
    config
}

fn load_config(path: &str) -> ShenResult<DeviceConfig> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| ShenError::InvalidData(format!("配置解析失败: {e}")))
}

fn run(cli: &Cli, config: DeviceConfig) -> ShenResult<()> {
    eprintln!(
        "shen 版本 {} -- 纯 Rust 深度相机采集工具",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("设备: {}", config.host);

    let scanner = Scanner::open(config);

    // 清理上次会话可能残留的流
    scanner.close_streams()?;

    if let Some(version) = scanner.firmware_version()? {
        info!("固件版本: {}", version.trim());
    }
    if let Some(reso) = scanner.depth_resolution()? {
        info!("设备上报深度分辨率: {reso}");
    }

    if !cli.skip_tuning {
        scanner.configure()?;
    }
    if let Some(gain) = cli.gain {
        scanner.set_depth_gain(gain)?;
    }

    info!("开始采集 {} 帧", cli.frames);
    let frames = scanner.acquire(cli.frames)?;
    if frames.len() < cli.frames {
        warn!("仅采集到 {}/{} 帧", frames.len(), cli.frames);
    }
    if frames.is_empty() {
        return Err(ShenError::InvalidData("码流中未找到任何帧".into()));
    }

    write_depth_sequence(&cli.depth_output, &frames)?;
    write_aux_sequence(&cli.aux_output, &frames)?;

    eprintln!();
    eprintln!("采集完成:");
    eprintln!("  帧数: {}", frames.len());
    eprintln!("  深度序列: {}", cli.depth_output);
    eprintln!("  辅助序列: {}", cli.aux_output);
    Ok(())
}

/// 深度序列写入多页 TIFF (16 位灰度)
fn write_depth_sequence(path: &str, frames: &[ScanFrame]) -> ShenResult<()> {
    let mut io = IoContext::open_write(path)?;
    let mut muxer = TiffMuxer::new();
    muxer.write_header(&mut io)?;
    for frame in frames {
        muxer.write_depth_page(&mut io, &frame.depth)?;
    }
    muxer.finish(&mut io)
}

/// 辅助序列写入多页 TIFF (8 位灰度)
fn write_aux_sequence(path: &str, frames: &[ScanFrame]) -> ShenResult<()> {
    let mut io = IoContext::open_write(path)?;
    let mut muxer = TiffMuxer::new();
    muxer.write_header(&mut io)?;
    for frame in frames {
        muxer.write_gray_page(&mut io, &frame.aux)?;
    }
    muxer.finish(&mut io)
}

// ============================================================
// UI
// ============================================================

/// 打印版本横幅
fn print_banner() {
    println!(
        "shen 版本 {} -- 纯 Rust 深度相机采集工具",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("用法: shen-cli -a <设备地址> [选项]");
    println!();
    println!("选项:");
    println!("  -a <地址>           设备地址 (IP 或主机名)");
    println!("  --config <文件>     连接配置 JSON 文件");
    println!("  -n <帧数>           采集帧数 (默认 1)");
    println!("  --depth-output <文件> 深度序列输出路径 (默认 depth.tif)");
    println!("  --aux-output <文件>   辅助序列输出路径 (默认 other.tif)");
    println!("  --gain <1-16>       深度增益");
    println!("  --skip-tuning       跳过 MINI 预调优寄存器写入");
    println!("  --rewind <字节>     解复用扫描回退量 (固件相关: 4 或 10)");
    println!();
    println!("示例:");
    println!("  shen-cli -a 192.168.1.14 -n 2                采集 2 帧");
    println!("  shen-cli -a 192.168.1.14 --gain 1            最低增益采集");
    println!("  shen-cli --config mini.json --rewind 10      另一类固件");
    println!();
    println!("使用 --help 查看完整用法.");
}
