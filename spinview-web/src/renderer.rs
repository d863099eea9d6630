//! Canvas 2D painter: fills projected triangles back to front
use spinview_core::ProjectedTriangle;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { context })
    }

    /// Paint a frame. `triangles` must already be sorted far to near.
    pub fn draw(&self, background: [u8; 3], triangles: &[ProjectedTriangle], width: f64, height: f64) {
        let ctx = &self.context;
        ctx.set_fill_style_str(&css_color(background));
        ctx.fill_rect(0.0, 0.0, width, height);

        for triangle in triangles {
            let color = css_color(triangle.shaded_color());
            let [a, b, c] = triangle.points;
            ctx.begin_path();
            ctx.move_to(a.0 as f64, a.1 as f64);
            ctx.line_to(b.0 as f64, b.1 as f64);
            ctx.line_to(c.0 as f64, c.1 as f64);
            ctx.close_path();
            ctx.set_fill_style_str(&color);
            ctx.fill();
            // Hairline stroke hides the seams between adjacent triangles
            ctx.set_stroke_style_str(&color);
            ctx.stroke();
        }
    }
}

pub fn css_color([r, g, b]: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", r, g, b)
}
