//! The page root: builds every controller from a [`PageInventory`] and routes
//! host events to them.

use std::collections::HashMap;

use folio_protocol::{DomCommand, ElementId, Rect, RenderCommand, Size};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::activation::{NavLink, ScrollActivation};
use crate::animator::{Animator, Background, CapsuleTrack, PipelineTrack};
use crate::chrome::ScrollChrome;
use crate::config::FolioConfig;
use crate::content::{ResumeContent, SkillsPanel};
use crate::counter::{CounterController, StatCounter};
use crate::debounce::Debouncer;
use crate::error::FolioError;
use crate::fade_in::FadeInController;
use crate::pipeline_steps::StepCycler;
use crate::scheduler::{FrameScheduler, FrameToken};
use crate::timeline::Timeline;
use crate::tooltip::{NavKey, TooltipManager, TooltipTarget};
use crate::tracker::{ElementLayout, IntersectionTracker};
use crate::typing::Typewriter;

const VISIBLE: &str = "visible";

/// Everything the host found on the page at startup. Absent elements are
/// `None` or empty; the controllers that need them come up inactive.
#[derive(Debug, Clone, Default)]
pub struct PageInventory {
    pub viewport: Size,
    /// Navigation links paired with the section each one targets.
    pub nav_links: Vec<NavLink>,
    pub fade_targets: Vec<ElementId>,
    /// Stat elements and the value each counts up to.
    pub stat_counters: Vec<(ElementId, u64)>,
    /// Pipeline station circles in document order.
    pub stations: Vec<ElementId>,
    /// Pipeline diagram steps and the connectors between them, in document
    /// order.
    pub pipeline_steps: Vec<ElementId>,
    pub pipeline_connectors: Vec<ElementId>,
    pub background_canvas: Option<ElementId>,
    pub pipeline_svg: Option<ElementId>,
    pub typing: Option<ElementId>,
    pub navbar: Option<ElementId>,
    pub progress_bar: Option<ElementId>,
    pub loading_screen: Option<ElementId>,
    pub metric_fill: Option<ElementId>,
    pub experience: Option<ElementId>,
    pub projects: Option<ElementId>,
    pub skills: Option<ElementId>,
    /// (category, tab element)
    pub skill_tabs: Vec<(String, ElementId)>,
}

/// Viewport box and element bounds measured in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    pub viewport: Rect,
    pub bounds: HashMap<ElementId, Rect>,
}

impl ElementLayout for LayoutSnapshot {
    fn bounds(&self, id: &ElementId) -> Option<Rect> {
        self.bounds.get(id).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Scroll {
        now_ms: f64,
        scroll_y: f64,
        document_height: f64,
        viewport_height: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Layout(LayoutSnapshot),
    /// Periodic clock tick for timed, non-frame work.
    Tick {
        now_ms: f64,
    },
    Frame {
        token: FrameToken,
        now_ms: f64,
    },
    PointerEnter {
        target: ElementId,
        bounds: Rect,
    },
    PointerLeave {
        target: ElementId,
    },
    Focus {
        target: ElementId,
        bounds: Rect,
    },
    Blur {
        target: ElementId,
    },
    KeyDown {
        target: ElementId,
        key: String,
    },
    /// A navigation link was clicked; `section_top` is the section's
    /// document offset.
    NavigateTo {
        section_top: f64,
    },
    SelectSkillTab {
        category: String,
        now_ms: f64,
    },
    ReducedMotionChanged {
        reduced: bool,
    },
}

/// What the host should do in response to an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    pub dom: Vec<DomCommand>,
    pub render: Vec<RenderCommand>,
    /// Scroll the window to this offset.
    pub scroll_to: Option<ScrollTo>,
    /// The event was consumed and its default action should be suppressed.
    pub prevent_default: bool,
}

impl Effects {
    pub fn dom(dom: Vec<DomCommand>) -> Self {
        Self {
            dom,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dom.is_empty() && self.render.is_empty() && self.scroll_to.is_none() && !self.prevent_default
    }
}

/// A window scroll request. `smooth` is off under reduced motion, so the
/// page jumps instead of animating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTo {
    pub top: f64,
    pub smooth: bool,
}

/// A controller whose required elements were checked once at startup.
#[derive(Debug)]
pub enum Controller<T> {
    Active(T),
    Inactive(FolioError),
}

impl<T> Controller<T> {
    fn from_result(result: Result<T, FolioError>) -> Self {
        match result {
            Ok(controller) => Self::Active(controller),
            Err(err) => {
                warn!(%err, "controller disabled");
                Self::Inactive(err)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn active(&self) -> Option<&T> {
        match self {
            Self::Active(controller) => Some(controller),
            Self::Inactive(_) => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Active(controller) => Some(controller),
            Self::Inactive(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScrollMetrics {
    scroll_y: f64,
    document_height: f64,
    viewport_height: f64,
}

#[derive(Debug)]
pub struct Portfolio {
    config: FolioConfig,
    content: ResumeContent,
    reduced_motion: bool,
    nav_tracker: IntersectionTracker,
    fade_tracker: IntersectionTracker,
    counter_tracker: IntersectionTracker,
    navigation: Controller<ScrollActivation>,
    fade_in: FadeInController,
    counters: CounterController,
    tooltips: Controller<TooltipManager>,
    skills: Controller<SkillsPanel>,
    typewriter: Controller<Typewriter>,
    steps: Controller<StepCycler>,
    animator: Controller<Animator>,
    chrome: ScrollChrome,
    progress_debounce: Debouncer,
    last_scroll: Option<ScrollMetrics>,
    /// Staged reveals. Each is anchored at the first tick after it was
    /// queued.
    timelines: Vec<Timeline<DomCommand>>,
    /// Set by `dispose`; every later event is ignored.
    disposed: bool,
}

impl Portfolio {
    /// Build every controller and return the commands that set up the page.
    /// Only an invalid `config` fails; missing elements and content disable
    /// the affected parts.
    pub fn init(
        config: FolioConfig,
        content: ResumeContent,
        inventory: PageInventory,
        seed: u64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<(Self, Effects), FolioError> {
        config.validate()?;
        let reduced = config.reduced_motion;
        let mut dom = Vec::new();
        let mut timelines = Vec::new();

        let mut nav_tracker = IntersectionTracker::new(config.navigation.observer.clone());
        let mut navigation = Controller::from_result(ScrollActivation::new(
            inventory.nav_links,
            config.navigation.active_class.clone(),
        ));
        if let Some(nav) = navigation.active_mut() {
            for section in nav.sections() {
                nav_tracker.register(section.clone());
            }
            dom.extend(nav.init(config.navigation.default_section.as_deref()));
        }

        let mut fade_tracker = IntersectionTracker::new(config.fade_in.observer.clone());
        let mut fade_in = FadeInController::new(inventory.fade_targets, config.fade_in.visible_class.clone());
        dom.extend(fade_in.init(&mut fade_tracker, reduced));

        let mut counter_tracker = IntersectionTracker::new(config.counters.observer.clone());
        let mut counters = CounterController::new(
            inventory
                .stat_counters
                .into_iter()
                .map(|(id, target)| StatCounter::new(id, target))
                .collect(),
            config.counters.duration_ms,
        );
        dom.extend(counters.init(&mut counter_tracker, reduced));

        if inventory.stations.len() != config.pipeline.stations.len() {
            warn!(
                found = inventory.stations.len(),
                configured = config.pipeline.stations.len(),
                "station count mismatch; extra stations get no tooltip"
            );
        }
        let targets = inventory
            .stations
            .into_iter()
            .zip(&config.pipeline.stations)
            .map(|(id, station)| TooltipTarget {
                id,
                title: station.title.clone(),
                detail: station.metric.clone(),
            })
            .collect();
        let tooltips = Controller::from_result(TooltipManager::new(targets));
        if let Some(manager) = tooltips.active() {
            dom.extend(manager.init());
        }

        let stagger = |i: usize| config.reveal.stagger_base_ms + i as f64 * config.reveal.stagger_step_ms;
        for (section, container, markup) in [
            ("experience", &inventory.experience, content.experience_markup()),
            ("projects", &inventory.projects, content.project_markup()),
        ] {
            let Some(container) = container else {
                warn!(section, "no container element; section not populated");
                continue;
            };
            match markup {
                Ok(populated) => {
                    let (command, items) = populated.into_command(container);
                    dom.push(command);
                    timelines.push(Timeline::from_steps(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, id)| (stagger(i), DomCommand::add_class(id, VISIBLE))),
                    ));
                }
                Err(err) => warn!(%err, "section not populated"),
            }
        }

        let skills_result = inventory
            .skills
            .ok_or_else(|| FolioError::missing_element("skills", "#skills-content"))
            .and_then(|container| SkillsPanel::new(container, inventory.skill_tabs));
        let mut skills = Controller::from_result(skills_result);
        if let Some(panel) = skills.active_mut() {
            let selection = panel.select(SkillsPanel::DEFAULT_CATEGORY, &content);
            dom.extend(selection.tabs);
            match selection.panel {
                Ok((replace, items)) => {
                    dom.push(replace);
                    timelines.push(skill_reveal(&items, config.reveal.skill_reveal_ms));
                }
                Err(err) => warn!(%err, "skills not populated"),
            }
        }

        let typewriter_result = inventory
            .typing
            .ok_or_else(|| FolioError::missing_element("typing", "#typing-text"))
            .and_then(|target| {
                Typewriter::new(target, config.typing.clone())
                    .ok_or_else(|| FolioError::missing_data("typing", "phrases"))
            });
        let mut typewriter = Controller::from_result(typewriter_result);
        if reduced && let Some(writer) = typewriter.active_mut() {
            dom.push(writer.settle());
        }

        let mut steps = Controller::from_result(StepCycler::new(
            inventory.pipeline_steps,
            inventory.pipeline_connectors,
            config.pipeline.step_interval_ms,
        ));
        if reduced && let Some(cycler) = steps.active_mut() {
            dom.extend(cycler.settle());
        }

        let mut page_steps = Vec::new();
        if let Some(screen) = &inventory.loading_screen {
            page_steps.push((config.reveal.loading_screen_ms, DomCommand::add_class(screen, "hidden")));
        }
        if let Some(fill) = &inventory.metric_fill {
            page_steps.push((config.reveal.metric_fill_ms, DomCommand::add_class(fill, "animated")));
        }
        timelines.push(Timeline::from_steps(page_steps));

        let chrome = ScrollChrome::new(
            inventory.navbar,
            inventory.progress_bar,
            config.navbar_hide_after,
            config.scroll_offset,
        );

        let mut animator = Controller::from_result(build_animator(
            &config,
            inventory.background_canvas.is_some(),
            inventory.pipeline_svg,
            inventory.viewport,
            seed,
        ));
        if !reduced && let Some(animator) = animator.active_mut() {
            dom.extend(animator.start(scheduler));
        }

        if reduced {
            for timeline in &mut timelines {
                dom.extend(timeline.drain());
            }
            timelines.clear();
        }

        info!(
            reduced_motion = reduced,
            navigation = navigation.is_active(),
            tooltips = tooltips.is_active(),
            animator = animator.is_active(),
            fade_targets = fade_in.elements().len(),
            "portfolio initialized"
        );

        let portfolio = Self {
            progress_debounce: Debouncer::new(config.debounce_ms),
            config,
            content,
            reduced_motion: reduced,
            nav_tracker,
            fade_tracker,
            counter_tracker,
            navigation,
            fade_in,
            counters,
            tooltips,
            skills,
            typewriter,
            steps,
            animator,
            chrome,
            last_scroll: None,
            timelines,
            disposed: false,
        };
        Ok((portfolio, Effects::dom(dom)))
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn navigation(&self) -> &Controller<ScrollActivation> {
        &self.navigation
    }

    pub fn pipeline_steps(&self) -> &Controller<StepCycler> {
        &self.steps
    }

    pub fn fade_in(&self) -> &FadeInController {
        &self.fade_in
    }

    pub fn counters(&self) -> &CounterController {
        &self.counters
    }

    pub fn tooltips(&self) -> &Controller<TooltipManager> {
        &self.tooltips
    }

    pub fn skills(&self) -> &Controller<SkillsPanel> {
        &self.skills
    }

    pub fn animator(&self) -> &Controller<Animator> {
        &self.animator
    }

    pub fn chrome(&self) -> &ScrollChrome {
        &self.chrome
    }

    /// Elements the host must measure for the next [`PageEvent::Layout`].
    pub fn observed(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = Vec::new();
        for tracker in [&self.nav_tracker, &self.fade_tracker, &self.counter_tracker] {
            for element in tracker.elements() {
                if !ids.contains(&element.id) {
                    ids.push(element.id.clone());
                }
            }
        }
        ids
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn handle(&mut self, event: PageEvent, scheduler: &mut dyn FrameScheduler) -> Effects {
        if self.disposed {
            return Effects::default();
        }
        match event {
            PageEvent::Scroll {
                now_ms,
                scroll_y,
                document_height,
                viewport_height,
            } => {
                self.last_scroll = Some(ScrollMetrics {
                    scroll_y,
                    document_height,
                    viewport_height,
                });
                self.progress_debounce.trigger(now_ms);
                Effects::dom(self.chrome.on_scroll(scroll_y))
            }
            PageEvent::Resize { width, height } => {
                if let Some(animator) = self.animator.active_mut() {
                    animator.resize(Size::new(width, height));
                }
                Effects::default()
            }
            PageEvent::Layout(snapshot) => Effects::dom(self.observe(&snapshot)),
            PageEvent::Tick { now_ms } => Effects::dom(self.tick(now_ms)),
            PageEvent::Frame { token, now_ms } => {
                let Some(animator) = self.animator.active_mut() else {
                    return Effects::default();
                };
                match animator.on_frame(token, now_ms, scheduler) {
                    Some(frame) => Effects {
                        dom: frame.dom,
                        render: frame.render,
                        ..Effects::default()
                    },
                    None => Effects::default(),
                }
            }
            PageEvent::PointerEnter { target, bounds } | PageEvent::Focus { target, bounds } => {
                match self.tooltips.active_mut() {
                    Some(manager) => Effects::dom(manager.show(&target, bounds)),
                    None => Effects::default(),
                }
            }
            PageEvent::PointerLeave { target } | PageEvent::Blur { target } => match self.tooltips.active_mut() {
                Some(manager) if manager.is_target(&target) => Effects::dom(manager.hide()),
                _ => Effects::default(),
            },
            PageEvent::KeyDown { target, key } => {
                let focus = NavKey::from_key(&key).and_then(|nav| {
                    self.tooltips
                        .active()
                        .and_then(|manager| manager.navigate(&target, nav))
                });
                match focus {
                    Some(command) => Effects {
                        dom: vec![command],
                        prevent_default: true,
                        ..Effects::default()
                    },
                    None => Effects::default(),
                }
            }
            PageEvent::NavigateTo { section_top } => Effects {
                scroll_to: Some(ScrollTo {
                    top: self.chrome.scroll_target(section_top),
                    smooth: !self.reduced_motion,
                }),
                prevent_default: true,
                ..Effects::default()
            },
            PageEvent::SelectSkillTab { category, now_ms } => Effects::dom(self.select_skills(&category, now_ms)),
            PageEvent::ReducedMotionChanged { reduced } => {
                Effects::dom(self.set_reduced_motion(reduced, scheduler))
            }
        }
    }

    /// Stop the animator and all observation. Returns the commands that
    /// clear transient markers. Terminal: later events are ignored and a
    /// second call does nothing.
    pub fn dispose(&mut self, scheduler: &mut dyn FrameScheduler) -> Effects {
        if self.disposed {
            return Effects::default();
        }
        self.disposed = true;
        let mut dom = Vec::new();
        if let Some(animator) = self.animator.active_mut() {
            animator.stop(scheduler);
        }
        self.nav_tracker.unregister_all();
        if let Some(nav) = self.navigation.active_mut() {
            dom.extend(nav.clear());
        }
        self.fade_tracker.unregister_all();
        self.counter_tracker.unregister_all();
        if let Some(manager) = self.tooltips.active_mut() {
            dom.extend(manager.hide());
        }
        if let Some(writer) = self.typewriter.active_mut() {
            writer.stop();
        }
        if let Some(cycler) = self.steps.active_mut() {
            cycler.stop();
        }
        for timeline in &mut self.timelines {
            timeline.cancel();
        }
        self.timelines.clear();
        self.progress_debounce.cancel();
        debug!("portfolio disposed");
        Effects::dom(dom)
    }

    fn observe(&mut self, snapshot: &LayoutSnapshot) -> Vec<DomCommand> {
        let mut dom = Vec::new();
        if let Some(nav) = self.navigation.active_mut() {
            let changes = self.nav_tracker.observe(snapshot.viewport, snapshot);
            dom.extend(nav.handle_batch(&changes));
        }
        let changes = self.fade_tracker.observe(snapshot.viewport, snapshot);
        dom.extend(self.fade_in.handle_batch(&changes, &mut self.fade_tracker));
        for change in self.counter_tracker.observe(snapshot.viewport, snapshot) {
            self.counters.handle(&change, &mut self.counter_tracker);
        }
        dom
    }

    fn tick(&mut self, now_ms: f64) -> Vec<DomCommand> {
        let mut dom = Vec::new();
        if self.progress_debounce.poll(now_ms)
            && let Some(m) = self.last_scroll
            && let Some(command) = self.chrome.progress(m.scroll_y, m.document_height, m.viewport_height)
        {
            dom.push(command);
        }

        for timeline in &mut self.timelines {
            if !timeline.is_started() {
                timeline.start(now_ms);
            }
            dom.extend(timeline.poll(now_ms));
        }
        self.timelines.retain(|t| !t.is_finished());

        if !self.reduced_motion
            && let Some(writer) = self.typewriter.active_mut()
        {
            if !writer.is_running() {
                writer.start(now_ms);
            }
            dom.extend(writer.tick(now_ms));
        }
        if let Some(cycler) = self.steps.active_mut() {
            dom.extend(cycler.tick(now_ms));
        }

        dom.extend(self.counters.tick(now_ms));
        dom
    }

    fn select_skills(&mut self, category: &str, now_ms: f64) -> Vec<DomCommand> {
        let Some(panel) = self.skills.active_mut() else {
            return Vec::new();
        };
        let selection = panel.select(category, &self.content);
        let mut dom = selection.tabs;
        match selection.panel {
            Ok((replace, items)) => {
                dom.push(replace);
                let mut reveal = skill_reveal(&items, self.config.reveal.skill_reveal_ms);
                if self.reduced_motion {
                    dom.extend(reveal.drain());
                } else {
                    reveal.start(now_ms);
                    self.timelines.push(reveal);
                }
            }
            Err(err) => warn!(%err, category, "skills not populated"),
        }
        dom
    }

    fn set_reduced_motion(&mut self, reduced: bool, scheduler: &mut dyn FrameScheduler) -> Vec<DomCommand> {
        if reduced == self.reduced_motion {
            return Vec::new();
        }
        self.reduced_motion = reduced;
        info!(reduced, "reduced motion preference changed");

        if !reduced {
            if let Some(cycler) = self.steps.active_mut() {
                cycler.resume();
            }
            return match self.animator.active_mut() {
                Some(animator) => animator.start(scheduler),
                None => Vec::new(),
            };
        }

        let mut dom = Vec::new();
        if let Some(animator) = self.animator.active_mut() {
            animator.stop(scheduler);
        }
        if let Some(writer) = self.typewriter.active_mut() {
            dom.push(writer.settle());
        }
        if let Some(cycler) = self.steps.active_mut() {
            dom.extend(cycler.settle());
        }
        self.fade_in.dispose(&mut self.fade_tracker);
        dom.extend(self.fade_in.init(&mut self.fade_tracker, true));
        self.counter_tracker.unregister_all();
        dom.extend(self.counters.init(&mut self.counter_tracker, true));
        for timeline in &mut self.timelines {
            dom.extend(timeline.drain());
        }
        self.timelines.clear();
        dom
    }
}

fn skill_reveal(items: &[ElementId], delay_ms: f64) -> Timeline<DomCommand> {
    Timeline::from_steps(items.iter().map(|id| (delay_ms, DomCommand::add_class(id, VISIBLE))))
}

fn build_animator(
    config: &FolioConfig,
    has_canvas: bool,
    pipeline_svg: Option<ElementId>,
    viewport: Size,
    seed: u64,
) -> Result<Animator, FolioError> {
    if !has_canvas && pipeline_svg.is_none() {
        return Err(FolioError::missing_element("animator", "#neural-network, #matrix-canvas, .pipeline-svg"));
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let background = has_canvas.then(|| Background::build(&config.background, viewport, &mut rng));
    let pipeline = pipeline_svg.map(|svg| PipelineTrack::new(svg, CapsuleTrack::new(&config.pipeline, &mut rng)));
    Ok(Animator::new(background, pipeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    fn inventory() -> PageInventory {
        PageInventory {
            viewport: Size::new(800.0, 600.0),
            nav_links: vec![
                NavLink {
                    section: "home".into(),
                    link: "nav-home".into(),
                },
                NavLink {
                    section: "about".into(),
                    link: "nav-about".into(),
                },
            ],
            fade_targets: vec!["about".into()],
            stat_counters: vec![("stat-years".into(), 5)],
            stations: vec!["station-0".into(), "station-1".into()],
            pipeline_steps: vec!["step-0".into(), "step-1".into()],
            pipeline_connectors: vec!["connector-0".into()],
            background_canvas: Some("neural-network-canvas".into()),
            pipeline_svg: Some("pipeline-svg".into()),
            typing: Some("typing-text".into()),
            loading_screen: Some("loading-screen".into()),
            ..PageInventory::default()
        }
    }

    fn init(config: FolioConfig) -> (Portfolio, Effects, ManualScheduler) {
        let mut sched = ManualScheduler::new();
        let (page, effects) =
            Portfolio::init(config, ResumeContent::default(), inventory(), 7, &mut sched).unwrap();
        (page, effects, sched)
    }

    #[test]
    fn init_activates_default_section_and_starts_animator() {
        let (page, effects, sched) = init(FolioConfig::default());
        assert!(effects.dom.contains(&DomCommand::add_class(&"nav-home".into(), "active")));
        assert!(page.animator().active().is_some_and(Animator::is_running));
        assert_eq!(sched.outstanding().len(), 1);
        assert!(page.observed().contains(&"stat-years".into()));
    }

    #[test]
    fn missing_elements_disable_only_their_controller() {
        let mut sched = ManualScheduler::new();
        let (page, _) = Portfolio::init(
            FolioConfig::default(),
            ResumeContent::default(),
            PageInventory::default(),
            7,
            &mut sched,
        )
        .unwrap();
        assert!(matches!(page.navigation(), Controller::Inactive(FolioError::MissingElement { .. })));
        assert!(!page.tooltips().is_active());
        assert!(!page.animator().is_active());
        assert!(matches!(
            page.animator(),
            Controller::Inactive(FolioError::MissingElement { selector, .. })
                if selector == "#neural-network, #matrix-canvas, .pipeline-svg"
        ));
        assert!(!page.pipeline_steps().is_active());
        assert!(sched.outstanding().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = FolioConfig::default();
        config.navigation.observer.threshold = 2.0;
        let mut sched = ManualScheduler::new();
        let result = Portfolio::init(config, ResumeContent::default(), inventory(), 7, &mut sched);
        assert!(matches!(result, Err(FolioError::Config(_))));
    }

    #[test]
    fn loading_screen_hides_after_its_delay() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let first = page.handle(PageEvent::Tick { now_ms: 100.0 }, &mut sched);
        let hide = DomCommand::add_class(&"loading-screen".into(), "hidden");
        assert!(!first.dom.contains(&hide));
        let later = page.handle(PageEvent::Tick { now_ms: 1600.0 }, &mut sched);
        assert!(later.dom.contains(&hide));
    }

    #[test]
    fn key_navigation_moves_focus_and_consumes_key() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let effects = page.handle(
            PageEvent::KeyDown {
                target: "station-1".into(),
                key: "ArrowRight".into(),
            },
            &mut sched,
        );
        assert_eq!(
            effects.dom,
            vec![DomCommand::Focus {
                target: "station-0".into()
            }]
        );
        assert!(effects.prevent_default);

        let ignored = page.handle(
            PageEvent::KeyDown {
                target: "station-1".into(),
                key: "a".into(),
            },
            &mut sched,
        );
        assert!(ignored.is_empty());
    }

    #[test]
    fn navigate_to_offsets_for_header() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let effects = page.handle(PageEvent::NavigateTo { section_top: 500.0 }, &mut sched);
        assert_eq!(
            effects.scroll_to,
            Some(ScrollTo {
                top: 420.0,
                smooth: true
            })
        );
    }

    #[test]
    fn navigate_to_jumps_under_reduced_motion() {
        let config = FolioConfig {
            reduced_motion: true,
            ..FolioConfig::default()
        };
        let (mut page, _, mut sched) = init(config);
        let effects = page.handle(PageEvent::NavigateTo { section_top: 40.0 }, &mut sched);
        assert_eq!(
            effects.scroll_to,
            Some(ScrollTo {
                top: 0.0,
                smooth: false
            })
        );
    }

    #[test]
    fn progress_is_debounced_to_tick() {
        let mut config = FolioConfig::default();
        let mut inv = inventory();
        inv.progress_bar = Some("progress".into());
        config.debounce_ms = 16.0;
        let mut sched = ManualScheduler::new();
        let (mut page, _) = Portfolio::init(config, ResumeContent::default(), inv, 7, &mut sched).unwrap();

        for (t, y) in [(0.0, 100.0), (5.0, 200.0), (10.0, 300.0)] {
            page.handle(
                PageEvent::Scroll {
                    now_ms: t,
                    scroll_y: y,
                    document_height: 1600.0,
                    viewport_height: 600.0,
                },
                &mut sched,
            );
        }
        let progress = ElementId::from("progress");
        let early = page.handle(PageEvent::Tick { now_ms: 20.0 }, &mut sched);
        assert!(early.dom.iter().all(|c| c.target() != Some(&progress)));
        let fired = page.handle(PageEvent::Tick { now_ms: 26.0 }, &mut sched);
        assert!(fired.dom.contains(&DomCommand::set_style(&progress, "width", "30.0%")));
    }

    #[test]
    fn switching_to_reduced_motion_stops_everything() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let effects = page.handle(PageEvent::ReducedMotionChanged { reduced: true }, &mut sched);
        assert!(sched.outstanding().is_empty());
        assert!(effects.dom.contains(&DomCommand::add_class(&"about".into(), "visible")));
        assert!(effects.dom.contains(&DomCommand::set_text(&"stat-years".into(), "5")));
        assert!(effects.dom.contains(&DomCommand::add_class(&"loading-screen".into(), "hidden")));
        assert_eq!(page.fade_in().pending(), 0);

        page.handle(PageEvent::ReducedMotionChanged { reduced: false }, &mut sched);
        assert_eq!(sched.outstanding().len(), 1);
    }

    #[test]
    fn pipeline_steps_light_up_in_order_on_ticks() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let step0 = DomCommand::add_class(&"step-0".into(), "active");
        let step1 = DomCommand::add_class(&"step-1".into(), "active");
        let connector = DomCommand::add_class(&"connector-0".into(), "active");

        page.handle(PageEvent::Tick { now_ms: 0.0 }, &mut sched);
        let first = page.handle(PageEvent::Tick { now_ms: 1500.0 }, &mut sched);
        assert!(first.dom.contains(&step0));
        assert!(first.dom.contains(&DomCommand::remove_class(&"step-1".into(), "active")));
        let second = page.handle(PageEvent::Tick { now_ms: 3000.0 }, &mut sched);
        assert!(second.dom.contains(&step1));
        assert!(second.dom.contains(&connector));
        let reset = page.handle(PageEvent::Tick { now_ms: 4500.0 }, &mut sched);
        assert!(reset.dom.contains(&DomCommand::remove_class(&"step-0".into(), "active")));
    }

    #[test]
    fn reduced_motion_holds_pipeline_steps_lit() {
        let config = FolioConfig {
            reduced_motion: true,
            ..FolioConfig::default()
        };
        let (mut page, effects, mut sched) = init(config);
        assert!(effects.dom.contains(&DomCommand::add_class(&"connector-0".into(), "active")));
        assert!(page.pipeline_steps().active().is_some_and(StepCycler::is_stopped));
        page.handle(PageEvent::Tick { now_ms: 0.0 }, &mut sched);
        let later = page.handle(PageEvent::Tick { now_ms: 10_000.0 }, &mut sched);
        assert!(later.dom.iter().all(|c| c.target().is_none_or(|t| !t.as_str().starts_with("step-"))));

        page.handle(PageEvent::ReducedMotionChanged { reduced: false }, &mut sched);
        assert!(page.pipeline_steps().active().is_some_and(|c| !c.is_stopped()));
        page.handle(PageEvent::Tick { now_ms: 11_000.0 }, &mut sched);
        let resumed = page.handle(PageEvent::Tick { now_ms: 12_500.0 }, &mut sched);
        assert!(resumed.dom.contains(&DomCommand::add_class(&"step-0".into(), "active")));
    }

    #[test]
    fn dispose_stops_frames_and_observation() {
        let (mut page, _, mut sched) = init(FolioConfig::default());
        let effects = page.dispose(&mut sched);
        assert!(sched.outstanding().is_empty());
        assert!(page.observed().is_empty());
        assert!(effects.dom.contains(&DomCommand::remove_class(&"nav-home".into(), "active")));
        assert_eq!(page.navigation().active().and_then(ScrollActivation::active), None);
        assert!(page.pipeline_steps().active().is_some_and(StepCycler::is_stopped));
    }
}
