//! Applies core effects to the live document and the background canvas.

use std::f64::consts::TAU;

use folio_core::Effects;
use folio_protocol::{DomCommand, ElementId, RenderCommand, Size, ThemeToken, TooltipId};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, CssStyleDeclaration, Document, Element, HtmlCanvasElement, HtmlElement,
    ScrollBehavior, ScrollToOptions, SvgElement, Window,
};

use crate::theme::{css_color, glow_filter};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub fn tooltip_element_id(id: TooltipId) -> String {
    format!("folio-tooltip-{}", id.0)
}

struct Canvas {
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

/// Everything here takes `&self`: applying a command can fire DOM events
/// synchronously (focus, blur), and their handlers apply effects too.
pub struct Surface {
    window: Window,
    document: Document,
    canvas: Option<Canvas>,
}

impl Surface {
    pub fn new(window: Window, document: Document, canvas: Option<&ElementId>) -> Result<Self, JsValue> {
        let canvas = match canvas {
            Some(id) => Some(open_canvas(&document, id)?),
            None => None,
        };
        Ok(Self {
            window,
            document,
            canvas,
        })
    }

    pub fn resize_canvas(&self, size: Size) {
        if let Some(canvas) = &self.canvas {
            canvas.element.set_width(size.width.max(0.0) as u32);
            canvas.element.set_height(size.height.max(0.0) as u32);
        }
    }

    pub fn apply(&self, effects: &Effects) {
        for command in &effects.dom {
            if let Err(err) = self.apply_dom(command) {
                warn!(?err, ?command, "dom command failed");
            }
        }
        if !effects.render.is_empty()
            && let Some(canvas) = &self.canvas
            && let Err(err) = draw(&canvas.context, &effects.render)
        {
            warn!(?err, "canvas draw failed");
        }
        if let Some(target) = effects.scroll_to {
            let options = ScrollToOptions::new();
            options.set_top(target.top);
            options.set_behavior(if target.smooth {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Instant
            });
            self.window.scroll_to_with_scroll_to_options(&options);
        }
    }

    fn element(&self, id: &ElementId) -> Result<Element, JsValue> {
        self.document
            .get_element_by_id(id.as_str())
            .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))
    }

    fn apply_dom(&self, command: &DomCommand) -> Result<(), JsValue> {
        match command {
            DomCommand::AddClass { target, class } => self.element(target)?.class_list().add_1(class),
            DomCommand::RemoveClass { target, class } => self.element(target)?.class_list().remove_1(class),
            DomCommand::SetText { target, text } => {
                self.element(target)?.set_text_content(Some(text));
                Ok(())
            }
            DomCommand::SetAttribute { target, name, value } => self.element(target)?.set_attribute(name, value),
            DomCommand::SetStyle {
                target,
                property,
                value,
            } => {
                let style = style_of(&self.element(target)?)?;
                if value.is_empty() {
                    style.remove_property(property).map(|_| ())
                } else {
                    style.set_property(property, value)
                }
            }
            DomCommand::ReplaceChildren { target, html } => {
                self.element(target)?.set_inner_html(html);
                Ok(())
            }
            DomCommand::SpawnSvgCircle {
                parent,
                id,
                center,
                radius,
            } => {
                let circle = self.document.create_element_ns(Some(SVG_NS), "circle")?;
                circle.set_id(id.as_str());
                circle.set_attribute("class", "data-capsule")?;
                circle.set_attribute("cx", &center.x.to_string())?;
                circle.set_attribute("cy", &center.y.to_string())?;
                circle.set_attribute("r", &radius.to_string())?;
                circle.set_attribute("fill", css_color(ThemeToken::CapsuleFill))?;
                style_of(&circle)?.set_property("filter", &glow_filter(ThemeToken::CapsuleFill, 4.0))?;
                self.element(parent)?.append_child(&circle)?;
                Ok(())
            }
            DomCommand::ShowTooltip {
                id,
                anchor,
                title,
                detail,
            } => {
                let tooltip = self.document.create_element("div")?;
                tooltip.set_id(&tooltip_element_id(*id));
                tooltip.set_class_name("pipeline-tooltip");
                tooltip.set_attribute("role", "tooltip")?;
                let heading = self.document.create_element("div")?;
                heading.set_class_name("tooltip-title");
                heading.set_text_content(Some(title));
                let metric = self.document.create_element("div")?;
                metric.set_class_name("tooltip-metric");
                metric.set_text_content(Some(detail));
                tooltip.append_child(&heading)?;
                tooltip.append_child(&metric)?;

                let style = style_of(&tooltip)?;
                style.set_property("position", "fixed")?;
                style.set_property("left", &format!("{}px", anchor.x))?;
                style.set_property("top", &format!("{}px", anchor.y))?;
                style.set_property("transform", "translate(-50%, -100%)")?;

                let body = self
                    .document
                    .body()
                    .ok_or_else(|| JsValue::from_str("document has no body"))?;
                body.append_child(&tooltip)?;
                Ok(())
            }
            DomCommand::RemoveTooltip { id } => {
                if let Some(tooltip) = self.document.get_element_by_id(&tooltip_element_id(*id)) {
                    tooltip.remove();
                } else {
                    debug!(id = id.0, "tooltip already gone");
                }
                Ok(())
            }
            DomCommand::Focus { target } => {
                let element = self.element(target)?;
                if let Some(html) = element.dyn_ref::<HtmlElement>() {
                    html.focus()
                } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
                    svg.focus()
                } else {
                    Err(JsValue::from_str("element is not focusable"))
                }
            }
        }
    }
}

fn open_canvas(document: &Document, id: &ElementId) -> Result<Canvas, JsValue> {
    let element = document
        .get_element_by_id(id.as_str())
        .ok_or_else(|| JsValue::from_str(&format!("no canvas #{id}")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let context = element
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok(Canvas { element, context })
}

fn style_of(element: &Element) -> Result<CssStyleDeclaration, JsValue> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        Ok(html.style())
    } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
        Ok(svg.style())
    } else {
        Err(JsValue::from_str("element has no inline style"))
    }
}

fn draw(ctx: &CanvasRenderingContext2d, commands: &[RenderCommand]) -> Result<(), JsValue> {
    for command in commands {
        match command {
            RenderCommand::ClearRect { rect } => ctx.clear_rect(rect.x, rect.y, rect.w, rect.h),
            RenderCommand::FillRect { rect, color, alpha } => {
                ctx.set_global_alpha(*alpha);
                ctx.set_fill_style_str(css_color(*color));
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            RenderCommand::FillCircle {
                center,
                radius,
                color,
                alpha,
                glow,
            } => {
                ctx.set_global_alpha(*alpha);
                ctx.set_fill_style_str(css_color(*color));
                if let Some(blur) = glow {
                    ctx.set_shadow_blur(*blur);
                    ctx.set_shadow_color(css_color(*color));
                }
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
                ctx.fill();
                if glow.is_some() {
                    ctx.set_shadow_blur(0.0);
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
                alpha,
            } => {
                ctx.set_global_alpha(*alpha);
                ctx.set_stroke_style_str(css_color(*color));
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
            } => {
                ctx.set_global_alpha(1.0);
                ctx.set_fill_style_str(css_color(*color));
                ctx.set_font(&format!("{font_size}px monospace"));
                ctx.fill_text(text, position.x, position.y)?;
            }
        }
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}
