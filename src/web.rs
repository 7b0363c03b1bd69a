//! Browser bindings for the scan page
//!
//! Looks up the page elements by id, requests the camera through
//! `getUserMedia` and drives frame ticks from `requestAnimationFrame`.
//! Uploaded files are read with `Blob.arrayBuffer()` and decoded with the
//! same image path as native uploads.

use crate::camera::{CameraConstraints, ReadyState, VideoSource};
use crate::controller::ScanController;
use crate::decoder::RqrrDecoder;
use crate::error::{CameraError, CaptureError};
use crate::models::FrameBuffer;
use crate::render::{LINK_CLASS, ResultContent, ResultSurface};
use crate::scheduler::StopHandle;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, EventTarget, HtmlCanvasElement,
    HtmlInputElement, HtmlVideoElement, MediaStream, MediaStreamConstraints,
};

/// Element ids the page is expected to provide
pub mod ids {
    /// Camera preview
    pub const VIDEO: &str = "video";
    /// Offscreen canvas used to sample frames
    pub const CANVAS: &str = "canvas";
    /// Button that starts the camera (optional)
    pub const START_BUTTON: &str = "start-btn";
    /// Camera path result container
    pub const SCAN_RESULT: &str = "scan-result";
    /// File picker (optional)
    pub const FILE_INPUT: &str = "file-input";
    /// Upload path result container
    pub const UPLOAD_RESULT: &str = "upload-result";
}

/// Result container backed by a DOM element
///
/// Links are built with `createElement`/`setAttribute`/`textContent`, so the
/// payload never reaches the page as markup.
pub struct DomResultSurface {
    document: Document,
    element: Element,
}

impl DomResultSurface {
    /// Wrap an existing element
    pub fn new(document: Document, element: Element) -> Self {
        Self { document, element }
    }

    fn try_render(&self, content: &ResultContent) -> Result<(), JsValue> {
        self.element.set_text_content(None);
        match content {
            ResultContent::Link(payload) => {
                let link = self.document.create_element("a")?;
                link.set_attribute("class", LINK_CLASS)?;
                link.set_attribute("href", payload.as_str())?;
                link.set_text_content(Some(payload.as_str()));
                self.element.append_child(&link)?;
            }
            ResultContent::Message(text) => self.element.set_text_content(Some(text)),
        }
        Ok(())
    }
}

impl ResultSurface for DomResultSurface {
    fn render(&mut self, content: &ResultContent) {
        if let Err(err) = self.try_render(content) {
            warn!(?err, "failed to update result element");
        }
    }
}

/// Live `<video>` element sampled through a 2D canvas
pub struct VideoElementSource {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl VideoElementSource {
    /// Pair a playing video element with the canvas used to sample it
    pub fn new(video: HtmlVideoElement, canvas: HtmlCanvasElement) -> Result<Self, CameraError> {
        let context = canvas
            .get_context("2d")
            .map_err(camera_error)?
            .ok_or_else(|| CameraError::Other("2d canvas context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| CameraError::Other("unexpected canvas context type".to_string()))?;
        Ok(Self {
            video,
            canvas,
            context,
        })
    }
}

impl VideoSource for VideoElementSource {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u16(self.video.ready_state())
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.video.video_width(), self.video.video_height())
    }

    fn draw_frame(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        let (width, height) = (target.width(), target.height());
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &self.video,
                0.0,
                0.0,
                width as f64,
                height as f64,
            )
            .map_err(capture_error)?;
        let image_data = self
            .context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(capture_error)?;
        let pixels = image_data.data();
        if !target.draw_rgba(image_data.width(), image_data.height(), &pixels.0) {
            return Err(CaptureError::Backend("image data size mismatch".to_string()));
        }
        Ok(())
    }
}

fn js_error_field(err: &JsValue, field: &str) -> Option<String> {
    js_sys::Reflect::get(err, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_string())
}

fn js_error_message(err: &JsValue) -> String {
    js_error_field(err, "message")
        .filter(|m| !m.is_empty())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn camera_error(err: JsValue) -> CameraError {
    let message = js_error_message(&err);
    match js_error_field(&err, "name").as_deref() {
        Some("NotAllowedError") | Some("SecurityError") => CameraError::PermissionDenied(message),
        Some("NotFoundError") | Some("NotReadableError") | Some("OverconstrainedError") => {
            CameraError::Unavailable(message)
        }
        _ => CameraError::Other(message),
    }
}

fn capture_error(err: JsValue) -> CaptureError {
    CaptureError::Backend(js_error_message(&err))
}

async fn request_camera(constraints: CameraConstraints) -> Result<MediaStream, CameraError> {
    let window =
        web_sys::window().ok_or_else(|| CameraError::Unavailable("no window".to_string()))?;
    let devices = window.navigator().media_devices().map_err(camera_error)?;

    let video = js_sys::Object::new();
    js_sys::Reflect::set(
        &video,
        &JsValue::from_str("facingMode"),
        &JsValue::from_str(constraints.facing.as_str()),
    )
    .map_err(camera_error)?;
    let request = MediaStreamConstraints::new();
    request.set_video(&video.into());

    let promise = devices
        .get_user_media_with_constraints(&request)
        .map_err(camera_error)?;
    let stream = JsFuture::from(promise).await.map_err(camera_error)?;
    stream.dyn_into::<MediaStream>().map_err(camera_error)
}

type PageController = ScanController<RqrrDecoder, DomResultSurface, VideoElementSource>;

struct PageState {
    controller: RefCell<PageController>,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    stop: StopHandle,
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

fn required<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    element_by_id(document, id)
        .ok_or_else(|| JsValue::from_str(&format!("missing page element #{id}")))
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        warn!(?err, "requestAnimationFrame failed");
    }
}

fn start_frame_loop(state: Rc<PageState>) {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if state.stop.is_stopped() {
            // drop the closure to end the loop
            let _ = next.borrow_mut().take();
            return;
        }
        state.controller.borrow_mut().tick();
        if let Some(cb) = next.borrow().as_ref() {
            request_animation_frame(cb);
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = callback.borrow().as_ref() {
        request_animation_frame(cb);
    }
}

async fn start_camera(state: Rc<PageState>) {
    let constraints = state.controller.borrow().config().camera_constraints();
    let result = match request_camera(constraints).await {
        Ok(stream) => {
            state.video.set_src_object(Some(&stream));
            if let Err(err) = state.video.play() {
                debug!(?err, "video.play() rejected");
            }
            VideoElementSource::new(state.video.clone(), state.canvas.clone())
        }
        Err(err) => Err(err),
    };

    let attached = state.controller.borrow_mut().attach_camera(result).is_ok();
    if attached {
        start_frame_loop(state);
    }
}

/// Event listener that detaches itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // must run before the closure is freed, or the next event throws
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            warn!(?err, event = self.event, "failed to remove listener");
        }
    }
}

async fn read_and_scan(state: Rc<PageState>, file: web_sys::File) {
    match JsFuture::from(file.array_buffer()).await {
        Ok(buffer) => {
            let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
            state.controller.borrow_mut().handle_image_bytes(&bytes);
        }
        Err(err) => debug!(?err, "failed to read selected file"),
    }
}

/// Scan page mounted on the current document
///
/// Owns the button and file listeners. Dropping it (`free()` from JS)
/// removes them from the page and stops the frame loop on the next tick.
#[wasm_bindgen]
pub struct ScanPage {
    state: Rc<PageState>,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ScanPage {
    /// Bind to the page elements and register the button and file listeners
    #[wasm_bindgen(constructor)]
    pub fn mount() -> Result<ScanPage, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let video: HtmlVideoElement = required(&document, ids::VIDEO)?;
        let canvas: HtmlCanvasElement = required(&document, ids::CANVAS)?;
        let scan_result: Element = required(&document, ids::SCAN_RESULT)?;
        let upload_result: Element = required(&document, ids::UPLOAD_RESULT)?;

        let controller = ScanController::new(
            RqrrDecoder::new(),
            DomResultSurface::new(document.clone(), scan_result),
            DomResultSurface::new(document.clone(), upload_result),
        );

        let state = Rc::new(PageState {
            controller: RefCell::new(controller),
            video,
            canvas,
            stop: StopHandle::new(),
        });
        let mut listeners = Vec::new();

        if let Some(button) = document.get_element_by_id(ids::START_BUTTON) {
            let state = state.clone();
            let on_click = Closure::wrap(Box::new(move |_event: Event| {
                spawn_local(start_camera(state.clone()));
            }) as Box<dyn FnMut(Event)>);
            listeners.push(Listener::attach(button.into(), "click", on_click)?);
        }

        if let Some(input) = element_by_id::<HtmlInputElement>(&document, ids::FILE_INPUT) {
            let state = state.clone();
            let target = input.clone();
            let on_change = Closure::wrap(Box::new(move |_event: Event| {
                let Some(file) = target.files().and_then(|files| files.get(0)) else {
                    return;
                };
                spawn_local(read_and_scan(state.clone(), file));
            }) as Box<dyn FnMut(Event)>);
            listeners.push(Listener::attach(input.into(), "change", on_change)?);
        }

        Ok(ScanPage {
            state,
            _listeners: listeners,
        })
    }

    /// Stop the camera frame loop; it cannot be restarted
    pub fn stop(&self) {
        self.state.stop.stop();
    }

    /// True once a camera stream is attached
    #[wasm_bindgen(getter)]
    pub fn camera_attached(&self) -> bool {
        self.state.controller.borrow().has_camera()
    }
}

impl Drop for ScanPage {
    fn drop(&mut self) {
        self.state.stop.stop();
    }
}
