//! Integration tests for the scan controller
//!
//! Covers both scan paths end to end: camera start, frame ticks driven by the
//! frame loop, and file selections, with the result containers checked after
//! each step.

use qr_scan::camera::{CameraConstraints, CameraProvider, ReadyState, VideoSource};
use qr_scan::encode::render_payload;
use qr_scan::scheduler::ImmediateClock;
use qr_scan::tools::save_rgba;
use qr_scan::{
    BytesFile, CameraError, CaptureError, FacingMode, FrameBuffer, FrameLoop, FrameReplayCamera,
    NO_CODE_FOUND, PathFile, Payload, ResultContent, ResultPanel, RqrrDecoder, ScanController,
    SelectedFile, TickOutcome, UploadOutcome,
};
use std::cell::Cell;
use std::io;
use std::rc::Rc;

/// Video feed with a fixed frame and a scripted ready state
struct StaticVideo {
    frame: FrameBuffer,
    ready: ReadyState,
}

impl VideoSource for StaticVideo {
    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn draw_frame(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        target.draw_rgba(self.frame.width(), self.frame.height(), self.frame.data());
        Ok(())
    }
}

/// Provider that hands out one scripted result
struct ScriptedCamera {
    result: Option<Result<StaticVideo, CameraError>>,
    requested: Option<CameraConstraints>,
}

impl ScriptedCamera {
    fn granting(video: StaticVideo) -> Self {
        Self {
            result: Some(Ok(video)),
            requested: None,
        }
    }

    fn denying(reason: &str) -> Self {
        Self {
            result: Some(Err(CameraError::PermissionDenied(reason.to_string()))),
            requested: None,
        }
    }
}

impl CameraProvider for ScriptedCamera {
    type Source = StaticVideo;

    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<StaticVideo, CameraError> {
        self.requested = Some(*constraints);
        self.result
            .take()
            .unwrap_or_else(|| Err(CameraError::Unavailable("already acquired".to_string())))
    }
}

/// File that counts reads
struct CountingFile {
    bytes: Vec<u8>,
    reads: Rc<Cell<usize>>,
}

impl SelectedFile for CountingFile {
    fn name(&self) -> &str {
        "counting.png"
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.bytes.clone())
    }
}

struct FailingFile;

impl SelectedFile for FailingFile {
    fn name(&self) -> &str {
        "broken.png"
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read blocked"))
    }
}

fn qr_frame(text: &str) -> FrameBuffer {
    render_payload(&Payload::new(text).unwrap(), 4).unwrap()
}

fn png_bytes(frame: &FrameBuffer) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    save_rgba(frame, &path).unwrap();
    std::fs::read(&path).unwrap()
}

fn blank_frame() -> FrameBuffer {
    FrameBuffer::from_luma(64, 48, &vec![255u8; 64 * 48]).unwrap()
}

fn controller<V: VideoSource>() -> ScanController<RqrrDecoder, ResultPanel, V> {
    ScanController::new(RqrrDecoder::new(), ResultPanel::new(), ResultPanel::new())
}

#[test]
fn test_undecodable_stream_never_writes_result() {
    let mut ctl = controller();
    let mut camera = ScriptedCamera::granting(StaticVideo {
        frame: blank_frame(),
        ready: ReadyState::HaveEnoughData,
    });
    ctl.start_camera(&mut camera).unwrap();

    let summary = FrameLoop::new(ImmediateClock).with_tick_limit(25).run(&mut ctl);

    assert_eq!(summary.ticks, 25);
    assert_eq!(summary.decoded, 0);
    assert_eq!(ctl.scan_result().writes(), 0);
    assert!(ctl.scan_result().content().is_none());
}

#[test]
fn test_camera_requests_environment_facing() {
    let mut ctl = controller();
    let mut camera = ScriptedCamera::granting(StaticVideo {
        frame: blank_frame(),
        ready: ReadyState::HaveEnoughData,
    });
    ctl.start_camera(&mut camera).unwrap();
    assert_eq!(camera.requested.unwrap().facing, FacingMode::Environment);
    assert!(ctl.has_camera());
}

#[test]
fn test_one_tick_renders_hello_link() {
    let mut ctl = controller();
    let mut camera = ScriptedCamera::granting(StaticVideo {
        frame: qr_frame("HELLO"),
        ready: ReadyState::HaveEnoughData,
    });
    ctl.start_camera(&mut camera).unwrap();

    let outcome = ctl.tick();

    assert_eq!(outcome, TickOutcome::Decoded(Payload::new("HELLO").unwrap()));
    let content = ctl.scan_result().content().unwrap();
    assert_eq!(content.href(), Some("HELLO"));
    assert_eq!(content.text(), "HELLO");
    assert_eq!(
        ctl.scan_result().to_html(),
        r#"<a class="underline text-blue-700" href="HELLO">HELLO</a>"#
    );
    assert_eq!(ctl.upload_result().writes(), 0);
}

#[test]
fn test_tick_skipped_until_enough_data() {
    let mut ctl = controller();
    let mut camera = ScriptedCamera::granting(StaticVideo {
        frame: qr_frame("HELLO"),
        ready: ReadyState::HaveCurrentData,
    });
    ctl.start_camera(&mut camera).unwrap();

    assert_eq!(ctl.tick(), TickOutcome::NotReady);
    assert_eq!(ctl.scan_result().writes(), 0);
}

#[test]
fn test_failed_decode_keeps_previous_scan_result() {
    let frames = vec![qr_frame("first"), blank_frame(), blank_frame()];
    let mut camera = FrameReplayCamera::from_frames(frames);
    let mut ctl = controller();
    ctl.start_camera(&mut camera).unwrap();

    let summary = FrameLoop::new(ImmediateClock).with_tick_limit(5).run(&mut ctl);

    // the loop keeps ticking after the replay ends
    assert_eq!(summary.ticks, 5);
    assert_eq!(summary.decoded, 1);
    assert_eq!(ctl.scan_result().writes(), 1);
    assert_eq!(ctl.scan_result().content().unwrap().href(), Some("first"));
}

#[test]
fn test_new_decode_replaces_previous_scan_result() {
    let mut camera = FrameReplayCamera::from_frames(vec![qr_frame("one"), qr_frame("two")]);
    let mut ctl = controller();
    ctl.start_camera(&mut camera).unwrap();

    ctl.tick();
    ctl.tick();

    assert_eq!(ctl.scan_result().writes(), 2);
    assert_eq!(ctl.scan_result().content().unwrap().text(), "two");
}

#[test]
fn test_stop_handle_ends_loop() {
    let mut camera = FrameReplayCamera::from_frames(vec![blank_frame()]).repeat(true);
    let mut ctl = controller();
    ctl.start_camera(&mut camera).unwrap();

    let mut frame_loop = FrameLoop::new(ImmediateClock);
    let stop = frame_loop.stop_handle();
    let summary = frame_loop.run_with(&mut ctl, |_, _| {
        stop.stop();
    });
    assert_eq!(summary.ticks, 1);

    // a stopped loop never ticks again
    let summary = frame_loop.run(&mut ctl);
    assert_eq!(summary.ticks, 0);
}

#[test]
fn test_upload_without_code_shows_message() {
    let mut ctl = controller::<StaticVideo>();
    let file = BytesFile::new("blank.png", png_bytes(&blank_frame()));

    let outcome = ctl.handle_file_selection(vec![file]);

    assert!(matches!(outcome, UploadOutcome::NotFound));
    let content = ctl.upload_result().content().unwrap();
    assert_eq!(content, &ResultContent::message(NO_CODE_FOUND));
    assert_eq!(content.text(), "No QR code found.");
    assert_eq!(content.href(), None);
    assert!(!ctl.upload_result().to_html().contains("<a"));
}

#[test]
fn test_upload_with_url_shows_link() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pay.png");
    save_rgba(&qr_frame("https://example.com"), &path).unwrap();

    let mut ctl = controller::<StaticVideo>();
    let outcome = ctl.handle_file_selection(vec![PathFile::new(&path)]);

    assert!(matches!(outcome, UploadOutcome::Decoded(ref p) if p.as_str() == "https://example.com"));
    let content = ctl.upload_result().content().unwrap();
    assert_eq!(content.href(), Some("https://example.com"));
    assert_eq!(content.text(), "https://example.com");
    assert_eq!(ctl.scan_result().writes(), 0);
}

#[test]
fn test_upload_uses_only_first_file() {
    let reads = Rc::new(Cell::new(0));
    let first = CountingFile {
        bytes: png_bytes(&qr_frame("first")),
        reads: reads.clone(),
    };
    let second = CountingFile {
        bytes: png_bytes(&qr_frame("second")),
        reads: reads.clone(),
    };

    let mut ctl = controller::<StaticVideo>();
    ctl.handle_file_selection(vec![first, second]);

    assert_eq!(reads.get(), 1);
    assert_eq!(ctl.upload_result().content().unwrap().text(), "first");
}

#[test]
fn test_empty_selection_is_noop() {
    let mut ctl = controller::<StaticVideo>();
    ctl.handle_file_selection(vec![BytesFile::new("a.png", png_bytes(&qr_frame("kept")))]);
    assert_eq!(ctl.upload_result().writes(), 1);

    let outcome = ctl.handle_file_selection(Vec::<CountingFile>::new());

    assert!(matches!(outcome, UploadOutcome::Empty));
    assert_eq!(ctl.upload_result().writes(), 1);
    assert_eq!(ctl.upload_result().content().unwrap().text(), "kept");
    assert_eq!(ctl.scan_result().writes(), 0);
}

#[test]
fn test_read_failure_is_silent() {
    let mut ctl = controller::<StaticVideo>();
    let outcome = ctl.handle_file_selection(vec![FailingFile]);
    assert!(matches!(outcome, UploadOutcome::Failed(_)));
    assert_eq!(ctl.upload_result().writes(), 0);
}

#[test]
fn test_malformed_image_is_silent() {
    let mut ctl = controller::<StaticVideo>();
    let outcome = ctl.handle_file_selection(vec![BytesFile::new("x.png", b"\x89PNG garbage".to_vec())]);
    assert!(matches!(outcome, UploadOutcome::Failed(_)));
    assert!(ctl.upload_result().content().is_none());
}

#[test]
fn test_camera_denial_reports_reason() {
    let mut ctl = controller();
    let mut camera = ScriptedCamera::denying("Permission denied by user");

    let err = ctl.start_camera(&mut camera).unwrap_err();

    assert_eq!(err.reason(), "Permission denied by user");
    let text = ctl.scan_result().content().unwrap().text().to_string();
    assert!(text.starts_with("Camera error:"));
    assert!(text.contains("Permission denied by user"));
    assert_eq!(ctl.scan_result().content().unwrap().href(), None);
    assert!(!ctl.has_camera());
    assert_eq!(ctl.tick(), TickOutcome::Idle);
}

#[test]
fn test_payload_markup_is_escaped() {
    let mut camera = FrameReplayCamera::from_frames(vec![qr_frame(r#""><img src=x onerror=alert(1)>"#)]);
    let mut ctl = controller();
    ctl.start_camera(&mut camera).unwrap();
    ctl.tick();

    let html = ctl.scan_result().to_html();
    assert!(!html.contains("<img"));
    assert!(html.contains("&quot;&gt;&lt;img src=x onerror=alert(1)&gt;"));
}
