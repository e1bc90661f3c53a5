//! Page state shared by every event listener.
//!
//! Handlers compute effects while holding the state borrow, release it, and
//! only then apply the effects. Applying `Focus` fires focus/blur listeners
//! synchronously, and those re-enter here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use folio_core::content::ResumeContent;
use folio_core::debounce::Debouncer;
use folio_core::{Effects, FolioConfig, LayoutSnapshot, PageEvent, PageInventory, Portfolio};
use folio_protocol::{ElementId, Rect};
use tracing::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ErrorEvent, Event, EventTarget, KeyboardEvent, MediaQueryListEvent, Window};

use crate::inventory::{self, CONFIG_SCRIPT_ID, CONTENT_SCRIPT_ID};
use crate::scheduler::RafScheduler;
use crate::surface::Surface;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

struct State {
    page: Portfolio,
    scheduler: RafScheduler,
    /// Coalesces scroll/resize bursts into one layout pass.
    layout: Debouncer,
    /// Handle of the clock interval, cleared on dispose.
    interval: Option<i32>,
}

#[derive(Clone)]
pub struct Host {
    window: Window,
    document: Document,
    state: Rc<RefCell<Option<State>>>,
    surface: Rc<Surface>,
}

impl Host {
    /// Read config and content, scan the page, start the core and wire
    /// every listener. Listeners live for the page's lifetime.
    pub fn boot() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let mut config = match inventory::json_script(&document, CONFIG_SCRIPT_ID) {
            Some(text) => FolioConfig::from_json(text.as_bytes()).unwrap_or_else(|err| {
                warn!(%err, "config rejected; using defaults");
                FolioConfig::default()
            }),
            None => FolioConfig::default(),
        };
        let reduced_query = window.match_media(REDUCED_MOTION_QUERY)?;
        if let Some(query) = &reduced_query {
            config.reduced_motion |= query.matches();
        }
        let content = match inventory::json_script(&document, CONTENT_SCRIPT_ID) {
            Some(text) => ResumeContent::from_json(text.as_bytes()).unwrap_or_else(|err| {
                warn!(%err, "content unreadable");
                ResumeContent::default()
            }),
            None => ResumeContent::default(),
        };

        let found = inventory::scan(&window, &document);
        let surface = Rc::new(Surface::new(
            window.clone(),
            document.clone(),
            found.background_canvas.as_ref(),
        )?);
        surface.resize_canvas(found.viewport);

        let host = Host {
            window: window.clone(),
            document,
            state: Rc::new(RefCell::new(None)),
            surface,
        };
        let mut scheduler = RafScheduler::new(window);
        scheduler.install(host.frame_callback());

        let debounce_ms = config.debounce_ms;
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let (page, effects) = Portfolio::init(config, content, found.clone(), seed, &mut scheduler)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        *host.state.borrow_mut() = Some(State {
            page,
            scheduler,
            layout: Debouncer::new(debounce_ms),
            interval: None,
        });
        host.surface.apply(&effects);
        host.observe_now();

        host.listen(&found)?;
        if let Some(query) = reduced_query {
            let h = host.clone();
            on(&query, "change", move |event| {
                if let Some(change) = event.dyn_ref::<MediaQueryListEvent>() {
                    h.dispatch(PageEvent::ReducedMotionChanged {
                        reduced: change.matches(),
                    });
                }
            })?;
        }
        info!("folio started");
        Ok(())
    }

    fn now(&self) -> f64 {
        self.window
            .performance()
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    fn dispatch(&self, event: PageEvent) -> Effects {
        let effects = {
            let mut slot = self.state.borrow_mut();
            let Some(State { page, scheduler, .. }) = slot.as_mut() else {
                return Effects::default();
            };
            page.handle(event, scheduler)
        };
        self.surface.apply(&effects);
        effects
    }

    fn frame_callback(&self) -> Closure<dyn FnMut(f64)> {
        let h = self.clone();
        Closure::new(move |now_ms: f64| {
            let effects = {
                let mut slot = h.state.borrow_mut();
                let Some(State { page, scheduler, .. }) = slot.as_mut() else {
                    return;
                };
                let Some(token) = scheduler.take_fired() else {
                    return;
                };
                page.handle(PageEvent::Frame { token, now_ms }, scheduler)
            };
            h.surface.apply(&effects);
        })
    }

    fn dispose(&self) {
        let effects = {
            let mut slot = self.state.borrow_mut();
            let Some(State {
                page,
                scheduler,
                layout,
                interval,
            }) = slot.as_mut()
            else {
                return;
            };
            layout.cancel();
            if let Some(handle) = interval.take() {
                self.window.clear_interval_with_handle(handle);
            }
            page.dispose(scheduler)
        };
        self.surface.apply(&effects);
    }

    fn trigger_layout(&self, now_ms: f64) {
        if let Some(state) = self.state.borrow_mut().as_mut() {
            state.layout.trigger(now_ms);
        }
    }

    /// Measure every observed element and run an observation pass.
    fn observe_now(&self) {
        let ids = match self.state.borrow().as_ref() {
            Some(state) => state.page.observed(),
            None => return,
        };
        if ids.is_empty() {
            return;
        }
        let viewport = inventory::viewport(&self.window);
        let bounds: HashMap<ElementId, Rect> = ids
            .into_iter()
            .filter_map(|id| {
                let rect = self.document.get_element_by_id(id.as_str())?.get_bounding_client_rect();
                Some((id, Rect::new(rect.left(), rect.top(), rect.width(), rect.height())))
            })
            .collect();
        self.dispatch(PageEvent::Layout(LayoutSnapshot {
            viewport: Rect::from_size(viewport),
            bounds,
        }));
    }

    fn listen(&self, found: &PageInventory) -> Result<(), JsValue> {
        let h = self.clone();
        on(&self.window, "scroll", move |_| {
            let now_ms = h.now();
            let scroll_y = h.window.scroll_y().unwrap_or(0.0);
            let document_height = h
                .document
                .document_element()
                .map_or(0.0, |root| f64::from(root.scroll_height()));
            let viewport_height = inventory::viewport(&h.window).height;
            h.trigger_layout(now_ms);
            h.dispatch(PageEvent::Scroll {
                now_ms,
                scroll_y,
                document_height,
                viewport_height,
            });
        })?;

        let h = self.clone();
        on(&self.window, "resize", move |_| {
            let size = inventory::viewport(&h.window);
            h.surface.resize_canvas(size);
            h.trigger_layout(h.now());
            h.dispatch(PageEvent::Resize {
                width: size.width,
                height: size.height,
            });
        })?;

        let h = self.clone();
        on(&self.window, "pagehide", move |_| h.dispose())?;

        on(&self.window, "error", |event| {
            if let Some(err) = event.dyn_ref::<ErrorEvent>() {
                error!(
                    message = %err.message(),
                    file = %err.filename(),
                    line = err.lineno(),
                    "uncaught error"
                );
            }
        })?;

        for station in &found.stations {
            self.listen_station(station)?;
        }

        for link in &found.nav_links {
            let Some(element) = self.document.get_element_by_id(link.link.as_str()) else {
                continue;
            };
            let h = self.clone();
            let section = link.section.clone();
            on(&element, "click", move |event| {
                let Some(target) = h.document.get_element_by_id(section.as_str()) else {
                    return;
                };
                let section_top = target.get_bounding_client_rect().top() + h.window.scroll_y().unwrap_or(0.0);
                if h.dispatch(PageEvent::NavigateTo { section_top }).prevent_default {
                    event.prevent_default();
                }
            })?;
        }

        for (category, tab) in &found.skill_tabs {
            let Some(element) = self.document.get_element_by_id(tab.as_str()) else {
                continue;
            };
            let h = self.clone();
            let category = category.clone();
            on(&element, "click", move |_| {
                h.dispatch(PageEvent::SelectSkillTab {
                    category: category.clone(),
                    now_ms: h.now(),
                });
            })?;
        }

        let interval_ms = self
            .state
            .borrow()
            .as_ref()
            .map_or(16.0, |s| s.page.config().debounce_ms);
        let h = self.clone();
        let tick = Closure::<dyn FnMut()>::new(move || {
            let now_ms = h.now();
            let layout_due = h
                .state
                .borrow_mut()
                .as_mut()
                .is_some_and(|s| s.layout.poll(now_ms));
            if layout_due {
                h.observe_now();
            }
            h.dispatch(PageEvent::Tick { now_ms });
        });
        let handle = self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            interval_ms.round() as i32,
        )?;
        tick.forget();
        if let Some(state) = self.state.borrow_mut().as_mut() {
            state.interval = Some(handle);
        }
        Ok(())
    }

    fn listen_station(&self, station: &ElementId) -> Result<(), JsValue> {
        let Some(element) = self.document.get_element_by_id(station.as_str()) else {
            return Ok(());
        };

        for kind in ["mouseenter", "focus"] {
            let h = self.clone();
            let target = station.clone();
            let el = element.clone();
            let hover = kind == "mouseenter";
            on(&element, kind, move |_| {
                let bounds = client_rect(&el);
                h.dispatch(if hover {
                    PageEvent::PointerEnter {
                        target: target.clone(),
                        bounds,
                    }
                } else {
                    PageEvent::Focus {
                        target: target.clone(),
                        bounds,
                    }
                });
            })?;
        }

        let h = self.clone();
        let target = station.clone();
        on(&element, "mouseleave", move |_| {
            h.dispatch(PageEvent::PointerLeave { target: target.clone() });
        })?;

        let h = self.clone();
        let target = station.clone();
        on(&element, "blur", move |_| {
            h.dispatch(PageEvent::Blur { target: target.clone() });
        })?;

        let h = self.clone();
        let target = station.clone();
        on(&element, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let effects = h.dispatch(PageEvent::KeyDown {
                target: target.clone(),
                key,
            });
            if effects.prevent_default {
                event.prevent_default();
            }
        })
    }
}

fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Attach a listener for the page's lifetime.
fn on(target: &EventTarget, kind: &str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
