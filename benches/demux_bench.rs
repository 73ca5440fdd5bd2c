//! Shen 帧流解复用性能基准测试.
//!
//! 覆盖同步标记逐字节扫描与整帧切分两条路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use shen::core::SensorGeometry;
use shen::format::demux::{FRAME_MARKER, FrameDemuxer};

/// 构造 k 帧 MINI 全幅合成码流 (帧间 6 字节填充)
fn build_stream(geometry: SensorGeometry, k: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity((geometry.payload_bytes() + 10) * k);
    for i in 0..k {
        buf.extend_from_slice(&FRAME_MARKER);
        for _ in 0..geometry.pixel_count() {
            buf.extend_from_slice(&(1000 + i as u16).to_le_bytes());
        }
        buf.extend(std::iter::repeat_n(50u8, geometry.aux_bytes()));
        buf.extend(std::iter::repeat_n(0xEEu8, 6));
    }
    buf
}

fn bench_demux_mini(c: &mut Criterion) {
    let buf = build_stream(SensorGeometry::MINI, 4);
    let demuxer = FrameDemuxer::mini();
    c.bench_function("demux_mini_4_frames", |b| {
        b.iter(|| {
            let frames = demuxer.split(black_box(&buf), 4);
            assert_eq!(frames.len(), 4);
        });
    });
}

fn bench_scan_no_marker(c: &mut Criterion) {
    // 无标记缓冲区: 纯逐字节扫描路径
    let buf = vec![0x55u8; 2 * 1024 * 1024];
    let demuxer = FrameDemuxer::mini();
    c.bench_function("scan_2mb_no_marker", |b| {
        b.iter(|| {
            let frames = demuxer.split(black_box(&buf), 1);
            assert!(frames.is_empty());
        });
    });
}

criterion_group!(benches, bench_demux_mini, bench_scan_no_marker);
criterion_main!(benches);
