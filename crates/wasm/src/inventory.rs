//! One pass over the document at startup to find what the page offers.
//!
//! Elements the core must address but that carry no `id` get a generated one,
//! since every command targets elements by id.

use folio_core::PageInventory;
use folio_core::activation::NavLink;
use folio_protocol::{ElementId, Size};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Window};

pub const CONFIG_SCRIPT_ID: &str = "folio-config";
pub const CONTENT_SCRIPT_ID: &str = "folio-content";

const BACKGROUND_CANVASES: [&str; 2] = ["neural-network", "matrix-canvas"];

pub fn viewport(window: &Window) -> Size {
    let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(px(window.inner_width()), px(window.inner_height()))
}

/// Text of a `<script type="application/json">` block, if present.
pub fn json_script(document: &Document, id: &str) -> Option<String> {
    document.get_element_by_id(id).and_then(|el| el.text_content())
}

pub fn scan(window: &Window, document: &Document) -> PageInventory {
    let inventory = PageInventory {
        viewport: viewport(window),
        nav_links: nav_links(document),
        fade_targets: all(document, "section, [data-fade-in]")
            .iter()
            .enumerate()
            .map(|(i, el)| ensure_id(el, format!("folio-fade-{i}")))
            .collect(),
        stat_counters: stat_counters(document),
        stations: all(document, ".pipeline-svg circle")
            .iter()
            .enumerate()
            .map(|(i, el)| ensure_id(el, format!("pipeline-station-{i}")))
            .collect(),
        pipeline_steps: all(document, ".pipeline-step")
            .iter()
            .enumerate()
            .map(|(i, el)| ensure_id(el, format!("pipeline-step-{i}")))
            .collect(),
        pipeline_connectors: all(document, ".pipeline-connector")
            .iter()
            .enumerate()
            .map(|(i, el)| ensure_id(el, format!("pipeline-connector-{i}")))
            .collect(),
        background_canvas: BACKGROUND_CANVASES
            .iter()
            .find(|id| document.get_element_by_id(id).is_some())
            .map(|id| ElementId::from(*id)),
        pipeline_svg: one(document, ".pipeline-svg", "pipeline-svg"),
        typing: one(document, ".typing-text", "typing-text"),
        navbar: by_id(document, "navbar"),
        progress_bar: by_id(document, "scroll-progress"),
        loading_screen: by_id(document, "loading-screen"),
        metric_fill: one(document, ".metric-fill", "metric-fill"),
        experience: by_id(document, "experience-timeline"),
        projects: by_id(document, "projects-grid"),
        skills: by_id(document, "skills-content"),
        skill_tabs: all(document, ".skill-tab[data-category]")
            .iter()
            .enumerate()
            .filter_map(|(i, el)| {
                let category = el.get_attribute("data-category")?;
                Some((category, ensure_id(el, format!("skill-tab-{i}"))))
            })
            .collect(),
    };
    debug!(
        nav_links = inventory.nav_links.len(),
        fade_targets = inventory.fade_targets.len(),
        stations = inventory.stations.len(),
        pipeline_steps = inventory.pipeline_steps.len(),
        "page scanned"
    );
    inventory
}

fn nav_links(document: &Document) -> Vec<NavLink> {
    all(document, ".nav-link[href^='#'], .main-nav a[href^='#']")
        .iter()
        .enumerate()
        .filter_map(|(i, link)| {
            let href = link.get_attribute("href")?;
            let section = href.trim_start_matches('#');
            if section.is_empty() || document.get_element_by_id(section).is_none() {
                warn!(%href, "nav link points at no section");
                return None;
            }
            Some(NavLink {
                section: section.into(),
                link: ensure_id(link, format!("folio-nav-{i}")),
            })
        })
        .collect()
}

fn stat_counters(document: &Document) -> Vec<(ElementId, u64)> {
    all(document, ".stat-number[data-target]")
        .iter()
        .enumerate()
        .filter_map(|(i, el)| {
            let raw = el.get_attribute("data-target")?;
            match raw.trim().parse::<u64>() {
                Ok(target) => Some((ensure_id(el, format!("folio-stat-{i}")), target)),
                Err(err) => {
                    warn!(%raw, %err, "stat target is not a whole number");
                    None
                }
            }
        })
        .collect()
}

fn all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        warn!(selector, "invalid selector");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn one(document: &Document, selector: &str, fallback_id: &str) -> Option<ElementId> {
    let element = document.query_selector(selector).ok().flatten()?;
    Some(ensure_id(&element, fallback_id.to_string()))
}

fn by_id(document: &Document, id: &str) -> Option<ElementId> {
    document.get_element_by_id(id).map(|_| ElementId::from(id))
}

fn ensure_id(element: &Element, fallback: String) -> ElementId {
    let id = element.id();
    if id.is_empty() {
        element.set_id(&fallback);
        ElementId::from(fallback)
    } else {
        ElementId::from(id)
    }
}
