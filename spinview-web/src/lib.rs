//! spinview web - the viewer in a browser canvas
//!
//! The page creates a `WebViewer` for a canvas and asks it to load a model.
//! Mouse and touch input drive the shared stage; coasting runs on
//! `requestAnimationFrame`.
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Promise, Uint8Array};
use log::{debug, info, warn};
use spinview_core::{
    CoastTask, FrameRequest, FrameScheduler, PointerPosition, Stage, TouchPhase, TouchPoint,
    TouchTracker, ViewerConfig, Viewport,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{HtmlCanvasElement, MouseEvent, Response, TouchEvent, TouchList, Window};

mod renderer;

use renderer::CanvasRenderer;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (e.g. module re-evaluated) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
}

/// State shared by every browser callback
struct Viewer {
    window: Window,
    canvas: HtmlCanvasElement,
    renderer: CanvasRenderer,
    stage: RefCell<Stage>,
    touch: RefCell<TouchTracker>,
}

/// `MouseEvent.button` of the primary (usually left) button
const PRIMARY_BUTTON: i16 = 0;

impl Viewer {
    /// Pointer position relative to the canvas' top-left corner
    fn canvas_position(&self, client_x: i32, client_y: i32) -> PointerPosition {
        let rect = self.canvas.get_bounding_client_rect();
        PointerPosition::new(
            (client_x as f64 - rect.left()) as f32,
            (client_y as f64 - rect.top()) as f32,
        )
    }

    fn touch_points(&self, touches: &TouchList) -> Vec<TouchPoint> {
        (0..touches.length())
            .filter_map(|index| touches.item(index))
            .map(|touch| {
                TouchPoint::new(
                    touch.identifier(),
                    self.canvas_position(touch.client_x(), touch.client_y()),
                )
            })
            .collect()
    }

    /// Match the drawing buffer to the displayed size
    fn fit_canvas(&self) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.stage.borrow_mut().resize(width, height);
    }

    fn draw(&self) {
        let stage = self.stage.borrow();
        let viewport = stage.viewport();
        self.renderer.draw(
            stage.scene().background,
            &stage.project(),
            viewport.width as f64,
            viewport.height as f64,
        );
    }
}

/// Frame scheduler backed by `requestAnimationFrame`
struct AnimationFrames {
    viewer: Rc<Viewer>,
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&mut self, task: CoastTask) {
        let viewer = self.viewer.clone();
        let callback = Closure::once_into_js(move || {
            let request = viewer.stage.borrow_mut().coast_frame(task);
            if request == FrameRequest::Continue {
                AnimationFrames { viewer }.request_frame(task);
            }
        });
        if let Err(err) = self
            .viewer
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            warn!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

fn start_coast(viewer: &Rc<Viewer>, task: Option<CoastTask>) {
    if let Some(task) = task {
        AnimationFrames {
            viewer: viewer.clone(),
        }
        .request_frame(task);
    }
}

#[wasm_bindgen]
pub struct WebViewer {
    viewer: Rc<Viewer>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Attach a viewer to a canvas. `config_toml` overrides the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_toml: Option<String>) -> Result<WebViewer, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let config = match config_toml {
            Some(text) => ViewerConfig::from_toml_str(&text)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => ViewerConfig::default(),
        };

        let viewport = Viewport::new(canvas.client_width() as u32, canvas.client_height() as u32);
        let viewer = Rc::new(Viewer {
            renderer: CanvasRenderer::new(&canvas)?,
            stage: RefCell::new(Stage::new(viewport, config)),
            touch: RefCell::new(TouchTracker::new()),
            window,
            canvas,
        });
        viewer.fit_canvas();

        install_listeners(&viewer)?;
        start_render_loop(&viewer)?;
        info!("viewer attached to canvas");
        Ok(WebViewer { viewer })
    }

    /// Fetch an STL file and attach it. Input before it resolves is ignored.
    #[wasm_bindgen(js_name = loadModel)]
    pub fn load_model(&self, url: String) -> Promise {
        let viewer = self.viewer.clone();
        future_to_promise(async move {
            let response: Response = JsFuture::from(viewer.window.fetch_with_str(&url))
                .await?
                .dyn_into()?;
            if !response.ok() {
                return Err(JsValue::from_str(&format!(
                    "fetching {} failed with status {}",
                    url,
                    response.status()
                )));
            }
            let buffer = JsFuture::from(response.array_buffer()?).await?;
            let bytes = Uint8Array::new(&buffer).to_vec();
            debug!("fetched {} bytes from {}", bytes.len(), url);

            viewer
                .stage
                .borrow_mut()
                .load_stl(&bytes, model_name(&url))
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = isModelLoaded)]
    pub fn is_model_loaded(&self) -> bool {
        self.viewer.stage.borrow().is_model_loaded()
    }

    #[wasm_bindgen(js_name = resetOrientation)]
    pub fn reset_orientation(&self) {
        self.viewer.stage.borrow_mut().reset_orientation();
    }
}

/// File stem of the last URL path segment
fn model_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    if stem.is_empty() {
        "model"
    } else {
        stem
    }
}

fn install_listeners(viewer: &Rc<Viewer>) -> Result<(), JsValue> {
    // Press starts on the canvas; moves and release are tracked on the window
    // so a drag keeps going when the pointer leaves the canvas.
    let mousedown = {
        let viewer = viewer.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            if e.button() != PRIMARY_BUTTON {
                return;
            }
            let position = viewer.canvas_position(e.client_x(), e.client_y());
            if viewer.stage.borrow_mut().pointer_down(position) {
                e.prevent_default();
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    viewer
        .canvas
        .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
    mousedown.forget();

    let mousemove = {
        let viewer = viewer.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            let position = viewer.canvas_position(e.client_x(), e.client_y());
            viewer.stage.borrow_mut().pointer_move(position);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    viewer
        .window
        .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
    mousemove.forget();

    let mouseup = {
        let viewer = viewer.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            if e.button() != PRIMARY_BUTTON {
                return;
            }
            let task = viewer.stage.borrow_mut().pointer_up();
            start_coast(&viewer, task);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    viewer
        .window
        .add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
    mouseup.forget();

    for (name, phase) in [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::Cancel),
    ] {
        let touch = {
            let viewer = viewer.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                // Keep the page from scrolling or zooming under the finger
                e.prevent_default();
                let touches = viewer.touch_points(&e.touches());
                let changed = viewer.touch_points(&e.changed_touches());
                let event = viewer.touch.borrow_mut().event(phase, &touches, &changed);
                if let Some(event) = event {
                    let task = viewer.stage.borrow_mut().handle_pointer(event);
                    start_coast(&viewer, task);
                }
            }) as Box<dyn FnMut(TouchEvent)>)
        };
        viewer
            .canvas
            .add_event_listener_with_callback(name, touch.as_ref().unchecked_ref())?;
        touch.forget();
    }

    let blur = {
        let viewer = viewer.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            viewer.stage.borrow_mut().cancel_interaction();
            viewer.touch.replace(TouchTracker::new());
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    viewer
        .window
        .add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
    blur.forget();

    let resize = {
        let viewer = viewer.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            viewer.fit_canvas();
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    viewer
        .window
        .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();

    Ok(())
}

fn start_render_loop(viewer: &Rc<Viewer>) -> Result<(), JsValue> {
    let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let closure_cell_loop = closure_cell.clone();
    let viewer_loop = viewer.clone();

    *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        viewer_loop.draw();
        if let Some(callback) = closure_cell_loop.borrow().as_ref() {
            if let Err(err) = viewer_loop
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
            {
                warn!("render loop stopped: {:?}", err);
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = closure_cell.borrow().as_ref() {
        viewer
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}
