//! Integration tests: drive a whole `Portfolio` through scroll, layout,
//! pointer and clock events the way a browser host would, and check what the
//! page ends up showing.

use std::collections::HashSet;

use folio_core::activation::NavLink;
use folio_core::animator::Background;
use folio_core::content::ResumeContent;
use folio_core::scheduler::ManualScheduler;
use folio_core::{Effects, FolioConfig, LayoutSnapshot, PageEvent, PageInventory, Portfolio};
use folio_protocol::{DomCommand, ElementId, Rect, Size, TooltipId};

const SECTIONS: [&str; 6] = ["home", "about", "experience", "projects", "skills", "contact"];

fn inventory() -> PageInventory {
    PageInventory {
        viewport: Size::new(1200.0, 1000.0),
        nav_links: SECTIONS
            .iter()
            .map(|s| NavLink {
                section: (*s).into(),
                link: format!("nav-{s}").as_str().into(),
            })
            .collect(),
        fade_targets: vec!["card-a".into(), "card-b".into()],
        stat_counters: vec![("stat-projects".into(), 120)],
        stations: (0..4).map(|i| ElementId::from(format!("station-{i}"))).collect(),
        background_canvas: Some("neural-network-canvas".into()),
        pipeline_svg: Some("pipeline-svg".into()),
        typing: Some("typing-text".into()),
        experience: Some("experience-timeline".into()),
        ..PageInventory::default()
    }
}

fn viewport() -> Rect {
    Rect::new(0.0, 0.0, 1200.0, 1000.0)
}

/// Every section parked far below the fold unless overridden.
fn snapshot(placed: &[(&str, Rect)]) -> LayoutSnapshot {
    let mut snap = LayoutSnapshot {
        viewport: viewport(),
        ..LayoutSnapshot::default()
    };
    for (i, id) in SECTIONS.iter().chain(["card-a", "card-b", "stat-projects"].iter()).enumerate() {
        snap.bounds
            .insert((*id).into(), Rect::new(0.0, 5000.0 + i as f64 * 300.0, 1200.0, 200.0));
    }
    for (id, rect) in placed {
        snap.bounds.insert((*id).into(), *rect);
    }
    snap
}

fn band(y: f64) -> Rect {
    Rect::new(0.0, y, 1200.0, 200.0)
}

fn start(config: FolioConfig) -> (Portfolio, Effects, ManualScheduler) {
    // Controller warnings show up in failing test output.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut sched = ManualScheduler::new();
    let content = ResumeContent::from_json(
        br#"{"experience": [{"position": "Engineer"}, {"position": "Intern"}]}"#,
    )
    .expect("content parses");
    let (page, effects) =
        Portfolio::init(config, content, inventory(), 42, &mut sched).expect("default config is valid");
    (page, effects, sched)
}

fn active_links(commands: &[DomCommand], state: &mut HashSet<ElementId>) {
    for command in commands {
        match command {
            DomCommand::AddClass { target, class } if class == "active" => {
                state.insert(target.clone());
            }
            DomCommand::RemoveClass { target, class } if class == "active" => {
                state.remove(target);
            }
            _ => {}
        }
    }
}

#[test]
fn later_section_wins_while_earlier_still_intersects() {
    let (mut page, init, mut sched) = start(FolioConfig::default());
    let mut active = HashSet::new();
    active_links(&init.dom, &mut active);
    assert_eq!(active, HashSet::from([ElementId::from("nav-home")]));

    // Root box is y 80..400 for a 1000px viewport.
    let first = page.handle(
        PageEvent::Layout(snapshot(&[("experience", band(100.0)), ("projects", band(420.0))])),
        &mut sched,
    );
    active_links(&first.dom, &mut active);
    assert_eq!(active, HashSet::from([ElementId::from("nav-experience")]));

    let second = page.handle(
        PageEvent::Layout(snapshot(&[("experience", band(0.0)), ("projects", band(200.0))])),
        &mut sched,
    );
    assert_eq!(
        second.dom,
        vec![
            DomCommand::remove_class(&"nav-experience".into(), "active"),
            DomCommand::add_class(&"nav-projects".into(), "active"),
        ]
    );
    active_links(&second.dom, &mut active);
    assert_eq!(active, HashSet::from([ElementId::from("nav-projects")]));

    let nav = page.navigation().active().expect("navigation is active");
    assert_eq!(nav.active(), Some(&ElementId::from("projects")));
}

#[test]
fn same_batch_resolves_to_last_delivered() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    page.handle(
        PageEvent::Layout(snapshot(&[("experience", band(100.0)), ("projects", band(250.0))])),
        &mut sched,
    );
    let nav = page.navigation().active().expect("navigation is active");
    assert_eq!(nav.active(), Some(&ElementId::from("projects")));
}

#[test]
fn leaving_keeps_the_marker() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    page.handle(PageEvent::Layout(snapshot(&[("about", band(100.0))])), &mut sched);
    let out = page.handle(PageEvent::Layout(snapshot(&[])), &mut sched);
    assert!(out.dom.iter().all(|c| !matches!(c, DomCommand::RemoveClass { class, .. } if class == "active")));
    let nav = page.navigation().active().expect("navigation is active");
    assert_eq!(nav.active(), Some(&ElementId::from("about")));
}

#[test]
fn reduced_motion_at_init_reveals_everything_without_frames() {
    let config = FolioConfig {
        reduced_motion: true,
        ..FolioConfig::default()
    };
    let (mut page, init, mut sched) = start(config);

    for id in ["card-a", "card-b", "experience-0", "experience-1"] {
        assert!(
            init.dom.contains(&DomCommand::add_class(&id.into(), "visible")),
            "{id} should be visible at init"
        );
    }
    assert!(init.dom.contains(&DomCommand::set_text(&"stat-projects".into(), "120")));
    assert!(init.dom.contains(&DomCommand::set_text(
        &"typing-text".into(),
        "Software Engineer — Intelligent Automation"
    )));

    let animator = page.animator().active().expect("animator has a canvas");
    assert!(!animator.is_running());
    assert!(sched.outstanding().is_empty());
    assert_eq!(page.fade_in().pending(), 0);

    // Nothing animates on later ticks either.
    let tick = page.handle(PageEvent::Tick { now_ms: 5000.0 }, &mut sched);
    assert!(tick.dom.is_empty());
    assert!(sched.outstanding().is_empty());
}

#[test]
fn fade_in_latches_once() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    let visible = DomCommand::add_class(&"card-a".into(), "visible");

    let enter = page.handle(PageEvent::Layout(snapshot(&[("card-a", band(300.0))])), &mut sched);
    assert_eq!(enter.dom.iter().filter(|c| **c == visible).count(), 1);
    assert!(!page.observed().contains(&"card-a".into()));

    page.handle(PageEvent::Layout(snapshot(&[])), &mut sched);
    let again = page.handle(PageEvent::Layout(snapshot(&[("card-a", band(300.0))])), &mut sched);
    assert!(!again.dom.contains(&visible));
    assert_eq!(page.fade_in().pending(), 1);
}

#[test]
fn resize_keeps_positions_and_widens_bounds() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    page.handle(
        PageEvent::Resize {
            width: 800.0,
            height: 1000.0,
        },
        &mut sched,
    );
    let nodes_before = match page.animator().active().and_then(|a| a.background()) {
        Some(Background::Network(field)) => field.nodes().to_vec(),
        other => panic!("expected network background, got {other:?}"),
    };

    page.handle(
        PageEvent::Resize {
            width: 1200.0,
            height: 1000.0,
        },
        &mut sched,
    );

    let Some(Background::Network(field)) = page.animator().active().and_then(|a| a.background()) else {
        panic!("background vanished");
    };
    assert_eq!(field.nodes(), nodes_before.as_slice());
    assert_eq!(field.bounds(), Size::new(1200.0, 1000.0));

    // The next frame clears the whole new surface.
    let token = sched.fire().expect("animator requested a frame");
    let frame = page.handle(PageEvent::Frame { token, now_ms: 16.0 }, &mut sched);
    assert!(matches!(
        frame.render.first(),
        Some(folio_protocol::RenderCommand::ClearRect { rect }) if rect.w == 1200.0
    ));
}

#[test]
fn frames_keep_a_single_outstanding_request() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    let stale = sched.outstanding()[0];

    page.handle(PageEvent::ReducedMotionChanged { reduced: true }, &mut sched);
    page.handle(PageEvent::ReducedMotionChanged { reduced: false }, &mut sched);
    page.handle(PageEvent::ReducedMotionChanged { reduced: false }, &mut sched);
    assert_eq!(sched.outstanding().len(), 1);

    let ignored = page.handle(
        PageEvent::Frame {
            token: stale,
            now_ms: 16.0,
        },
        &mut sched,
    );
    assert!(ignored.render.is_empty());

    for i in 1..=5 {
        let token = sched.fire().expect("loop keeps requesting");
        let frame = page.handle(
            PageEvent::Frame {
                token,
                now_ms: i as f64 * 16.0,
            },
            &mut sched,
        );
        assert!(!frame.render.is_empty());
        assert!(frame.dom.iter().any(|c| matches!(c, DomCommand::SetAttribute { name, .. } if name == "cx")));
        assert_eq!(sched.outstanding().len(), 1);
    }
}

#[test]
fn capsules_are_spawned_once() {
    let (mut page, init, mut sched) = start(FolioConfig::default());
    let spawned = |dom: &[DomCommand]| {
        dom.iter()
            .filter(|c| matches!(c, DomCommand::SpawnSvgCircle { .. }))
            .count()
    };
    assert_eq!(spawned(&init.dom), 3);

    page.handle(PageEvent::ReducedMotionChanged { reduced: true }, &mut sched);
    let restart = page.handle(PageEvent::ReducedMotionChanged { reduced: false }, &mut sched);
    assert_eq!(spawned(&restart.dom), 0);
}

#[test]
fn interleaved_hover_and_focus_never_show_two_tooltips() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    let station = |i: usize| ElementId::from(format!("station-{i}"));
    let bounds = |i: usize| Rect::new(50.0 + i as f64 * 100.0, 50.0, 20.0, 20.0);

    let events = vec![
        PageEvent::PointerEnter {
            target: station(0),
            bounds: bounds(0),
        },
        PageEvent::PointerEnter {
            target: station(1),
            bounds: bounds(1),
        },
        PageEvent::Focus {
            target: station(2),
            bounds: bounds(2),
        },
        PageEvent::PointerLeave { target: station(0) },
        PageEvent::Focus {
            target: station(3),
            bounds: bounds(3),
        },
        PageEvent::PointerEnter {
            target: station(0),
            bounds: bounds(0),
        },
        PageEvent::Blur { target: station(3) },
        PageEvent::PointerLeave { target: station(0) },
    ];

    let mut live: HashSet<TooltipId> = HashSet::new();
    for event in events {
        let effects = page.handle(event, &mut sched);
        for command in &effects.dom {
            match command {
                DomCommand::ShowTooltip { id, .. } => {
                    live.insert(*id);
                }
                DomCommand::RemoveTooltip { id } => {
                    live.remove(id);
                }
                _ => {}
            }
            assert!(live.len() <= 1, "two tooltips live at once");
        }
    }
    assert!(live.is_empty());
    let manager = page.tooltips().active().expect("stations present");
    assert!(manager.live().is_none());
}

#[test]
fn tooltip_sits_above_its_station() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    let effects = page.handle(
        PageEvent::PointerEnter {
            target: "station-2".into(),
            bounds: Rect::new(250.0, 50.0, 20.0, 20.0),
        },
        &mut sched,
    );
    let shown = effects.dom.iter().find_map(|c| match c {
        DomCommand::ShowTooltip {
            anchor, title, detail, ..
        } => Some((*anchor, title.clone(), detail.clone())),
        _ => None,
    });
    let (anchor, title, detail) = shown.expect("tooltip shown");
    assert_eq!((anchor.x, anchor.y), (260.0, 40.0));
    assert_eq!(title, "AI Optimize");
    assert_eq!(detail, "Efficiency +23%");
}

#[test]
fn counter_reaches_target_after_two_seconds() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    page.handle(PageEvent::Layout(snapshot(&[("stat-projects", band(400.0))])), &mut sched);

    let mut last = None;
    let mut t = 1000.0;
    while t <= 3100.0 {
        let effects = page.handle(PageEvent::Tick { now_ms: t }, &mut sched);
        for command in effects.dom {
            if let DomCommand::SetText { target, text } = command
                && target == "stat-projects"
            {
                last = Some((t, text));
            }
        }
        t += 50.0;
    }
    assert_eq!(last, Some((3000.0, "120".to_string())));
    assert!(!page.counters().is_animating());
}

#[test]
fn experience_items_reveal_in_stagger() {
    let (mut page, init, mut sched) = start(FolioConfig::default());
    assert!(init.dom.iter().any(
        |c| matches!(c, DomCommand::ReplaceChildren { target, html } if target == "experience-timeline" && html.contains("Intern"))
    ));

    let reveal = |dom: &[DomCommand], id: &str| dom.contains(&DomCommand::add_class(&id.into(), "visible"));
    let t0 = page.handle(PageEvent::Tick { now_ms: 0.0 }, &mut sched);
    assert!(!reveal(&t0.dom, "experience-0"));
    let t100 = page.handle(PageEvent::Tick { now_ms: 100.0 }, &mut sched);
    assert!(reveal(&t100.dom, "experience-0"));
    assert!(!reveal(&t100.dom, "experience-1"));
    let t200 = page.handle(PageEvent::Tick { now_ms: 200.0 }, &mut sched);
    assert!(reveal(&t200.dom, "experience-1"));
}

#[test]
fn disposed_page_ignores_every_later_event() {
    let (mut page, _, mut sched) = start(FolioConfig::default());
    page.handle(PageEvent::Tick { now_ms: 0.0 }, &mut sched);
    let token = sched.outstanding()[0];

    page.dispose(&mut sched);
    assert!(page.is_disposed());
    assert!(sched.outstanding().is_empty());

    let later = [
        PageEvent::Tick { now_ms: 1000.0 },
        PageEvent::Frame { token, now_ms: 1016.0 },
        PageEvent::ReducedMotionChanged { reduced: true },
        PageEvent::ReducedMotionChanged { reduced: false },
        PageEvent::Layout(snapshot(&[("about", band(0.0))])),
    ];
    for event in later {
        assert!(page.handle(event, &mut sched).is_empty());
    }
    assert!(sched.outstanding().is_empty());
    assert!(page.dispose(&mut sched).is_empty());
}
