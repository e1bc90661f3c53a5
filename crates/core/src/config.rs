//! Page configuration.
//!
//! Every field has a default taken from the live site, so an empty JSON
//! object (or no config at all) yields a working page.

use std::fmt;
use std::str::FromStr;

use folio_protocol::Rect;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FolioError};

/// A CSS length as accepted in `rootMargin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the root box's matching dimension.
    Percent(f64),
}

impl Length {
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

impl FromStr for Length {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, ctor): (&str, fn(f64) -> Length) = if let Some(n) = s.strip_suffix("px") {
            (n, Length::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Length::Percent)
        } else if s == "0" {
            return Ok(Length::Px(0.0));
        } else {
            return Err("lengths must be in px or %");
        };
        let value: f64 = number.parse().map_err(|_| "not a number")?;
        if !value.is_finite() {
            return Err("not a finite number");
        }
        Ok(ctor(value))
    }
}

/// Edge offsets applied to the viewport before intersection testing.
/// Positive values grow the root box, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };

    /// The root box this margin produces for `viewport`.
    pub fn apply(&self, viewport: Rect) -> Rect {
        viewport.expand(
            self.top.resolve(viewport.h),
            self.right.resolve(viewport.w),
            self.bottom.resolve(viewport.h),
            self.left.resolve(viewport.w),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    /// Parses CSS margin shorthand: one to four lengths.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidMargin {
            value: s.to_string(),
            reason,
        };
        let parts = s
            .split_whitespace()
            .map(Length::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            [] => return Err(invalid("empty margin")),
            _ => return Err(invalid("more than four values")),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(m: RootMargin) -> Self {
        format!("{} {} {} {}", m.top, m.right, m.bottom, m.left)
    }
}

/// Options shared by every visibility tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverOptions {
    /// Fraction of the element that must be inside the root box.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(threshold: f64, root_margin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold,
            root_margin: root_margin.parse()?,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        Ok(())
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
        }
    }
}

fn margin(top: f64, bottom: Length) -> RootMargin {
    RootMargin {
        top: Length::Px(top),
        right: Length::Px(0.0),
        bottom,
        left: Length::Px(0.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub observer: ObserverOptions,
    /// Section marked active before any section intersects.
    pub default_section: Option<String>,
    pub active_class: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            observer: ObserverOptions {
                threshold: 0.3,
                root_margin: margin(-80.0, Length::Percent(-60.0)),
            },
            default_section: Some("home".to_string()),
            active_class: "active".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeInConfig {
    pub observer: ObserverOptions,
    pub visible_class: String,
}

impl Default for FadeInConfig {
    fn default() -> Self {
        Self {
            observer: ObserverOptions {
                threshold: 0.1,
                root_margin: margin(0.0, Length::Px(-50.0)),
            },
            visible_class: "visible".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub observer: ObserverOptions,
    pub duration_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            observer: ObserverOptions {
                threshold: 0.5,
                root_margin: RootMargin::ZERO,
            },
            duration_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Network,
    Matrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub node_count: usize,
    pub node_radius: f64,
    /// Each velocity component is drawn uniformly from `-max_speed..max_speed`.
    pub max_speed: f64,
    pub connection_distance: f64,
    /// Edge opacity at zero distance; falls off linearly to 0.
    pub max_edge_alpha: f64,
    pub line_width: f64,
    pub node_alpha: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 50,
            node_radius: 2.0,
            max_speed: 0.25,
            connection_distance: 150.0,
            max_edge_alpha: 0.2,
            line_width: 0.5,
            node_alpha: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub font_size: f64,
    /// Per-frame chance that a drop past the bottom restarts at the top.
    pub reset_chance: f64,
    pub fade_alpha: f64,
    pub glyphs: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            reset_chance: 0.025,
            fade_alpha: 0.05,
            glyphs: "01アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub kind: BackgroundKind,
    pub network: NetworkConfig,
    pub matrix: MatrixConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub title: String,
    pub metric: String,
}

impl StationConfig {
    fn new(title: &str, metric: &str) -> Self {
        Self {
            title: title.to_string(),
            metric: metric.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub capsule_count: usize,
    pub capsule_radius: f64,
    pub path_start: f64,
    pub path_end: f64,
    pub path_y: f64,
    /// Distance between neighbouring capsules at spawn.
    pub spacing: f64,
    pub base_speed: f64,
    /// Extra speed drawn uniformly from `0..speed_jitter` per capsule.
    pub speed_jitter: f64,
    /// Period of the step/connector highlight cycle.
    pub step_interval_ms: f64,
    /// Tooltip content, matched to the page's stations in document order.
    pub stations: Vec<StationConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capsule_count: 3,
            capsule_radius: 3.0,
            path_start: 30.0,
            path_end: 390.0,
            path_y: 60.0,
            spacing: 40.0,
            base_speed: 0.5,
            speed_jitter: 0.3,
            step_interval_ms: 1500.0,
            stations: vec![
                StationConfig::new("Data Ingest", "Latency -15%"),
                StationConfig::new("Real-time Process", "Throughput +40%"),
                StationConfig::new("AI Optimize", "Efficiency +23%"),
                StationConfig::new("Smart Deliver", "Accuracy 99.7%"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub phrases: Vec<String>,
    pub type_ms: f64,
    pub delete_ms: f64,
    /// Hold at full length before deleting.
    pub hold_ms: f64,
    /// Pause at empty before the next phrase.
    pub pause_ms: f64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            phrases: vec![
                "Software Engineer — Intelligent Automation".to_string(),
                "Systems Integration Specialist".to_string(),
                "Full-Stack Developer".to_string(),
                "AI & Machine Learning Engineer".to_string(),
            ],
            type_ms: 100.0,
            delete_ms: 50.0,
            hold_ms: 2000.0,
            pause_ms: 500.0,
        }
    }
}

/// Delays of the page's staged reveals, in milliseconds from init (or from
/// the triggering tab switch for skills).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub loading_screen_ms: f64,
    pub metric_fill_ms: f64,
    pub stagger_base_ms: f64,
    pub stagger_step_ms: f64,
    pub skill_reveal_ms: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            loading_screen_ms: 1500.0,
            metric_fill_ms: 1000.0,
            stagger_base_ms: 100.0,
            stagger_step_ms: 100.0,
            skill_reveal_ms: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub reduced_motion: bool,
    /// Scroll/resize coalescing window.
    pub debounce_ms: f64,
    /// Height of the sticky header, subtracted from smooth-scroll targets.
    pub scroll_offset: f64,
    /// Scroll depth after which the navbar hides on downward scroll.
    pub navbar_hide_after: f64,
    pub navigation: NavigationConfig,
    pub fade_in: FadeInConfig,
    pub counters: CounterConfig,
    pub background: BackgroundConfig,
    pub pipeline: PipelineConfig,
    pub typing: TypingConfig,
    pub reveal: RevealConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            debounce_ms: 16.0,
            scroll_offset: 80.0,
            navbar_hide_after: 100.0,
            navigation: NavigationConfig::default(),
            fade_in: FadeInConfig::default(),
            counters: CounterConfig::default(),
            background: BackgroundConfig::default(),
            pipeline: PipelineConfig::default(),
            typing: TypingConfig::default(),
            reveal: RevealConfig::default(),
        }
    }
}

impl FolioConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(data: &[u8]) -> Result<Self, FolioError> {
        let config: FolioConfig = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.navigation.observer.validate()?;
        self.fade_in.observer.validate()?;
        self.counters.observer.validate()?;
        positive("debounce_ms", self.debounce_ms)?;
        positive("counters.duration_ms", self.counters.duration_ms)?;
        positive(
            "background.network.connection_distance",
            self.background.network.connection_distance,
        )?;
        positive("background.matrix.font_size", self.background.matrix.font_size)?;
        positive(
            "pipeline.path_length",
            self.pipeline.path_end - self.pipeline.path_start,
        )?;
        positive("pipeline.base_speed", self.pipeline.base_speed)?;
        non_negative("pipeline.speed_jitter", self.pipeline.speed_jitter)?;
        non_negative("pipeline.spacing", self.pipeline.spacing)?;
        positive("pipeline.step_interval_ms", self.pipeline.step_interval_ms)?;
        positive("typing.type_ms", self.typing.type_ms)?;
        positive("typing.delete_ms", self.typing.delete_ms)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_value_margin() {
        let m: RootMargin = "-80px 0px -60% 0px".parse().unwrap();
        assert_eq!(m.top, Length::Px(-80.0));
        assert_eq!(m.bottom, Length::Percent(-60.0));
        assert_eq!(m, NavigationConfig::default().observer.root_margin);
    }

    #[test]
    fn parses_shorthand_margins() {
        let one: RootMargin = "10px".parse().unwrap();
        assert_eq!(one.left, Length::Px(10.0));
        let two: RootMargin = "5% 0".parse().unwrap();
        assert_eq!(two.bottom, Length::Percent(5.0));
        assert_eq!(two.right, Length::Px(0.0));
        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three.left, Length::Px(2.0));
    }

    #[test]
    fn rejects_bad_margins() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("abcpx".parse::<RootMargin>().is_err());
    }

    #[test]
    fn margin_applies_percentages_per_axis() {
        let m: RootMargin = "-80px 0px -60% 0px".parse().unwrap();
        let root = m.apply(Rect::new(0.0, 0.0, 1200.0, 1000.0));
        assert_eq!(root, Rect::new(0.0, 80.0, 1200.0, 320.0));
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = FolioConfig::from_json(b"{}").unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.background.network.node_count, 50);
        assert_eq!(config.pipeline.stations.len(), 4);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = br#"{
            "reduced_motion": true,
            "navigation": { "observer": { "threshold": 0.5, "root_margin": "0px" } },
            "background": { "kind": "matrix" }
        }"#;
        let config = FolioConfig::from_json(json).unwrap();
        assert!(config.reduced_motion);
        assert_eq!(config.navigation.observer.threshold, 0.5);
        assert_eq!(config.navigation.active_class, "active");
        assert_eq!(config.background.kind, BackgroundKind::Matrix);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let json = br#"{ "fade_in": { "observer": { "threshold": 1.5 } } }"#;
        let err = FolioConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            FolioError::Config(ConfigError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_inverted_pipeline_path() {
        let json = br#"{ "pipeline": { "path_start": 400, "path_end": 30 } }"#;
        assert!(FolioConfig::from_json(json).is_err());
    }

    #[test]
    fn rejects_capsules_that_cannot_move_forward() {
        let backwards = br#"{ "pipeline": { "base_speed": -1.0, "speed_jitter": 0.0 } }"#;
        assert!(matches!(
            FolioConfig::from_json(backwards),
            Err(FolioError::Config(ConfigError::NotPositive {
                field: "pipeline.base_speed",
                ..
            }))
        ));
        let stalled = br#"{ "pipeline": { "base_speed": 0.0 } }"#;
        assert!(FolioConfig::from_json(stalled).is_err());
        let jitter = br#"{ "pipeline": { "speed_jitter": -0.5 } }"#;
        assert!(matches!(
            FolioConfig::from_json(jitter),
            Err(FolioError::Config(ConfigError::Negative {
                field: "pipeline.speed_jitter",
                ..
            }))
        ));
        let spacing = br#"{ "pipeline": { "spacing": -40 } }"#;
        assert!(FolioConfig::from_json(spacing).is_err());
    }

    #[test]
    fn step_cycle_needs_a_period() {
        assert_eq!(FolioConfig::default().pipeline.step_interval_ms, 1500.0);
        let frozen = br#"{ "pipeline": { "step_interval_ms": 0 } }"#;
        assert!(matches!(
            FolioConfig::from_json(frozen),
            Err(FolioError::Config(ConfigError::NotPositive {
                field: "pipeline.step_interval_ms",
                ..
            }))
        ));
    }

    #[test]
    fn margin_round_trips_through_string() {
        let m: RootMargin = "0px 0px -50px 0px".parse().unwrap();
        let s: String = m.into();
        assert_eq!(s.parse::<RootMargin>().unwrap(), m);
    }
}
