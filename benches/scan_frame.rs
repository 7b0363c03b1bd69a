use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qr_scan::camera::ReplaySource;
use qr_scan::encode::render_payload;
use qr_scan::{Decoder, FrameBuffer, FrameReplayCamera, Payload, ResultPanel, RqrrDecoder, ScanController};

fn bench_decode_rendered_code(c: &mut Criterion) {
    let payload = Payload::new("https://example.com/account/42/pay/").unwrap();
    let frame = render_payload(&payload, 4).unwrap();
    let decoder = RqrrDecoder::new();
    c.bench_function("decode_rendered_code", |b| {
        b.iter(|| decoder.decode(black_box(&frame)))
    });
}

fn bench_decode_blank_vga(c: &mut Criterion) {
    let frame = FrameBuffer::from_luma(640, 480, &vec![255u8; 640 * 480]).unwrap();
    let decoder = RqrrDecoder::new();
    c.bench_function("decode_blank_640x480", |b| {
        b.iter(|| decoder.decode(black_box(&frame)))
    });
}

fn bench_controller_tick(c: &mut Criterion) {
    let payload = Payload::new("HELLO").unwrap();
    let frame = render_payload(&payload, 6).unwrap();
    let mut camera = FrameReplayCamera::from_frames(vec![frame]).repeat(true);
    let mut controller: ScanController<RqrrDecoder, ResultPanel, ReplaySource> =
        ScanController::new(RqrrDecoder::new(), ResultPanel::new(), ResultPanel::new());
    controller.start_camera(&mut camera).unwrap();
    c.bench_function("controller_tick", |b| b.iter(|| controller.tick()));
}

criterion_group!(
    benches,
    bench_decode_rendered_code,
    bench_decode_blank_vga,
    bench_controller_tick
);
criterion_main!(benches);
