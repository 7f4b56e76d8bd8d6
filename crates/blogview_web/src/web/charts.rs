//! Canvas chart surface.
//!
//! One `requestAnimationFrame` loop per surface. A draw replaces the running
//! animation; the superseded draw's "finished" promise resolves right away so
//! nothing awaiting it hangs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use blogview::chart::{ChartConfig, ChartFrame, ChartKind, Transition};
use blogview::renderer::ChartSurface;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const SERIES_COLORS: [&str; 8] = [
    "#7aa2ff", // blue
    "#fbbf24", // amber
    "#4ade80", // green
    "#fb7185", // pink/red
    "#a78bfa", // purple
    "#22c55e", // bright green
    "#60a5fa", // light blue
    "#e879f9", // magenta
];

const BG: &str = "#ffffff";
const AXIS: &str = "#444444";
const GRID: &str = "rgba(0, 0, 0, 0.08)";
const TEXT: &str = "#222222";

fn series_color(i: usize) -> &'static str {
    SERIES_COLORS[i % SERIES_COLORS.len()]
}

/// Signals for one draw.
pub(super) struct DrawHandle {
    /// First frame painted.
    pub ready: js_sys::Promise,
    /// Animation reached its final frame (or was replaced by a newer draw).
    pub finished: js_sys::Promise,
}

struct Animation {
    transition: Transition,
    start: Option<f64>,
    ready: Option<js_sys::Function>,
    finished: Option<js_sys::Function>,
}

impl Animation {
    fn settle(&mut self) {
        for f in [self.ready.take(), self.finished.take()].into_iter().flatten() {
            let _ = f.call0(&JsValue::UNDEFINED);
        }
    }
}

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub(super) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    anim: Rc<RefCell<Option<Animation>>>,
    tick: TickSlot,
    raf_id: Rc<Cell<Option<i32>>>,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    Ok(canvas
        .get_context("2d")
        .map_err(|_| "get_context failed")?
        .ok_or("no 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "cast failed")?)
}

fn find_or_create_canvas(container_id: &str) -> Result<HtmlCanvasElement, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document".to_string())?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| format!("no element #{container_id}"))?;

    if let Some(existing) = container
        .query_selector("canvas")
        .map_err(|_| "query_selector failed".to_string())?
    {
        return existing
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "canvas cast failed".to_string());
    }

    let canvas = document
        .create_element("canvas")
        .map_err(|_| "document: create_element failed".to_string())?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "document: canvas cast failed".to_string())?;
    container
        .append_child(&canvas)
        .map_err(|_| "append_child failed".to_string())?;
    Ok(canvas)
}

fn schedule(tick: &Weak<RefCell<Option<Closure<dyn FnMut(f64)>>>>, raf_id: &Cell<Option<i32>>) {
    let Some(slot) = tick.upgrade() else {
        return;
    };
    let slot = slot.borrow();
    let (Some(cb), Some(window)) = (slot.as_ref(), web_sys::window()) else {
        return;
    };
    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        raf_id.set(Some(id));
    }
}

impl CanvasSurface {
    fn new(canvas: HtmlCanvasElement, config: &ChartConfig) -> Result<Self, String> {
        canvas.set_width(config.width);
        canvas.set_height(config.height);
        let ctx = context_2d(&canvas)?;

        let anim: Rc<RefCell<Option<Animation>>> = Rc::new(RefCell::new(None));
        let tick: TickSlot = Rc::new(RefCell::new(None));
        let raf_id = Rc::new(Cell::new(None));

        let cb = {
            let anim = anim.clone();
            let tick_weak = Rc::downgrade(&tick);
            let raf_id = raf_id.clone();
            Closure::wrap(Box::new(move |ts: f64| {
                raf_id.set(None);
                let mut done = true;
                if let Some(a) = anim.borrow_mut().as_mut() {
                    let start = *a.start.get_or_insert(ts);
                    let progress = a.transition.progress_at(ts - start);
                    if let Err(e) = paint(&ctx, &a.transition.frame(progress)) {
                        web_sys::console::warn_1(&JsValue::from_str(&format!("chart: {e}")));
                    }
                    if let Some(r) = a.ready.take() {
                        let _ = r.call0(&JsValue::UNDEFINED);
                    }
                    done = progress >= 1.0;
                    if done {
                        a.settle();
                    }
                }
                if done {
                    anim.borrow_mut().take();
                } else {
                    schedule(&tick_weak, &raf_id);
                }
            }) as Box<dyn FnMut(f64)>)
        };
        *tick.borrow_mut() = Some(cb);

        Ok(Self {
            canvas,
            anim,
            tick,
            raf_id,
        })
    }
}

impl ChartSurface for CanvasSurface {
    type Error = String;
    type Handle = DrawHandle;

    fn bind(container_id: &str, config: &ChartConfig) -> Result<Self, String> {
        let canvas = find_or_create_canvas(container_id)?;
        Self::new(canvas, config)
    }

    fn draw(&mut self, container_id: &str, transition: Transition) -> Result<DrawHandle, String> {
        if !self.canvas.is_connected() {
            *self = Self::bind(container_id, &transition.spec().config)?;
        }
        let cfg = &transition.spec().config;
        if self.canvas.width() != cfg.width || self.canvas.height() != cfg.height {
            self.canvas.set_width(cfg.width);
            self.canvas.set_height(cfg.height);
        }

        if let Some(mut old) = self.anim.borrow_mut().take() {
            old.settle();
        }

        let mut ready_fn = None;
        let ready = js_sys::Promise::new(&mut |resolve, _reject| ready_fn = Some(resolve));
        let mut finished_fn = None;
        let finished = js_sys::Promise::new(&mut |resolve, _reject| finished_fn = Some(resolve));

        *self.anim.borrow_mut() = Some(Animation {
            transition,
            start: None,
            ready: ready_fn,
            finished: finished_fn,
        });
        if self.raf_id.get().is_none() {
            schedule(&Rc::downgrade(&self.tick), &self.raf_id);
        }

        Ok(DrawHandle { ready, finished })
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        if let (Some(id), Some(w)) = (self.raf_id.take(), web_sys::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        if let Some(mut a) = self.anim.borrow_mut().take() {
            a.settle();
        }
    }
}

/// Paint one laid-out frame.
pub(super) fn paint(ctx: &CanvasRenderingContext2d, frame: &ChartFrame) -> Result<(), String> {
    let plot = frame.plot;

    ctx.set_fill_style_str(BG);
    ctx.fill_rect(0.0, 0.0, frame.width, frame.height);

    // Title
    ctx.set_fill_style_str(TEXT);
    ctx.set_font(&format!("bold {}px sans-serif", frame.title_font_px));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(&frame.title, frame.width / 2.0, plot.y / 2.0)
        .map_err(|_| "fill_text failed")?;

    // Value axis grid + labels
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("right");
    ctx.set_line_width(1.0);
    for t in &frame.y_ticks {
        ctx.set_stroke_style_str(GRID);
        ctx.begin_path();
        ctx.move_to(plot.x, t.pos);
        ctx.line_to(plot.x + plot.w, t.pos);
        ctx.stroke();
        ctx.fill_text(&t.label, plot.x - 6.0, t.pos)
            .map_err(|_| "fill_text failed")?;
    }

    // Axes
    ctx.set_stroke_style_str(AXIS);
    ctx.begin_path();
    ctx.move_to(plot.x, plot.y);
    ctx.line_to(plot.x, plot.y + plot.h);
    ctx.line_to(plot.x + plot.w, plot.y + plot.h);
    ctx.stroke();

    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    for t in &frame.x_ticks {
        ctx.fill_text(&t.label, t.pos, plot.y + plot.h + 6.0)
            .map_err(|_| "fill_text failed")?;
    }

    match frame.kind {
        ChartKind::Column => {
            for b in &frame.bars {
                ctx.set_fill_style_str(series_color(b.series));
                ctx.fill_rect(b.rect.x, b.rect.y, b.rect.w, b.rect.h);
            }
        }
        ChartKind::Line => {
            ctx.set_line_width(2.0);
            for l in &frame.lines {
                let color = series_color(l.series);
                ctx.set_stroke_style_str(color);
                ctx.begin_path();
                for (i, &(x, y)) in l.points.iter().enumerate() {
                    if i == 0 {
                        ctx.move_to(x, y);
                    } else {
                        ctx.line_to(x, y);
                    }
                }
                ctx.stroke();

                ctx.set_fill_style_str(color);
                for &(x, y) in &l.points {
                    ctx.begin_path();
                    ctx.arc(x, y, 2.5, 0.0, std::f64::consts::PI * 2.0).ok();
                    ctx.fill();
                }
            }
        }
    }

    if let Some(names) = &frame.legend {
        ctx.set_font("11px sans-serif");
        ctx.set_text_align("left");
        ctx.set_text_baseline("middle");
        let x = plot.x + plot.w - 120.0;
        for (i, name) in names.iter().enumerate() {
            let y = plot.y + 10.0 + 16.0 * i as f64;
            ctx.set_fill_style_str(series_color(i));
            ctx.fill_rect(x, y - 5.0, 10.0, 10.0);
            ctx.set_fill_style_str(TEXT);
            ctx.fill_text(name, x + 16.0, y)
                .map_err(|_| "fill_text failed")?;
        }
    }

    Ok(())
}
