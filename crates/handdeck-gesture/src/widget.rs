//! Control surface widgets.
//!
//! Replaces the original's class-inheritance button/slider/platter
//! hierarchy (per §9 "Widget polymorphism") with a shared `Widget` trait
//! over concrete types. Each widget is handed one gesture update per hand
//! per frame and returns zero or more [`EngineCommand`]s for the frame
//! loop orchestrator to enqueue onto the audio command channel — widgets
//! never touch a `Deck` directly, since only the audio callback thread
//! owns one.

use std::collections::HashMap;
use std::f32::consts::PI;

use handdeck_core::config::WidgetRegion;
use handdeck_core::engine::EngineCommand;
use handdeck_core::types::{Side, Stem};

use crate::classifier::Gesture;
use crate::types::{HandLabel, Point};

/// Minimal overlay sink a widget can render itself onto. Real rendering
/// (pixel/line drawing) is out of scope per §2.1; this only carries enough
/// to let a consumer draw a highlighted region.
pub trait OverlaySurface {
    fn draw_region(&mut self, region: WidgetRegion, active: bool);
}

/// No-op overlay sink: records nothing, draws nothing. Stands in for a
/// real windowing/drawing backend (out of scope per §2.1) so the frame
/// loop can always call `Widget::draw` regardless of whether anything is
/// actually on screen.
#[derive(Default)]
pub struct NullOverlaySurface {
    pub regions_drawn: usize,
}

impl OverlaySurface for NullOverlaySurface {
    fn draw_region(&mut self, _region: WidgetRegion, _active: bool) {
        self.regions_drawn += 1;
    }
}

/// Shared control-surface widget protocol: a region test, a per-hand
/// gesture update, and a way to render itself.
pub trait Widget {
    fn contains(&self, point: Point) -> bool;

    /// Called once per hand per frame. `point` is `None` when the hand is
    /// idle or was arbitrated away by [`dispatch`] in favor of a
    /// higher-priority overlapping widget.
    fn update(&mut self, hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand>;

    fn draw(&self, surface: &mut dyn OverlaySurface);
}

fn rect_contains(region: &WidgetRegion, point: Point) -> bool {
    region.contains(point.x, point.y)
}

/// Toggle button driving `Deck.play`/`Deck.pause`. Starts off (paused).
pub struct PlayButton {
    pub side: Side,
    pub region: WidgetRegion,
    on: bool,
    latched: HashMap<HandLabel, bool>,
}

impl PlayButton {
    pub fn new(side: Side, region: WidgetRegion) -> Self {
        Self { side, region, on: false, latched: HashMap::new() }
    }
}

impl Widget for PlayButton {
    fn contains(&self, point: Point) -> bool {
        rect_contains(&self.region, point)
    }

    fn update(&mut self, hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
        let inside = gesture == Gesture::Pinch && point.is_some_and(|p| self.contains(p));
        let latched = *self.latched.get(&hand).unwrap_or(&false);

        if !inside {
            self.latched.insert(hand, false);
            return vec![];
        }
        if latched {
            return vec![];
        }

        self.latched.insert(hand, true);
        self.on = !self.on;
        vec![if self.on { EngineCommand::Play { side: self.side } } else { EngineCommand::Pause { side: self.side } }]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        surface.draw_region(self.region, self.on);
    }
}

/// Toggle button driving `Deck.unmute`/`Deck.mute` for one stem. Starts on
/// (unmuted).
pub struct StemButton {
    pub side: Side,
    pub stem: Stem,
    pub region: WidgetRegion,
    on: bool,
    latched: HashMap<HandLabel, bool>,
}

impl StemButton {
    pub fn new(side: Side, stem: Stem, region: WidgetRegion) -> Self {
        Self { side, stem, region, on: true, latched: HashMap::new() }
    }
}

impl Widget for StemButton {
    fn contains(&self, point: Point) -> bool {
        rect_contains(&self.region, point)
    }

    fn update(&mut self, hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
        let inside = gesture == Gesture::Pinch && point.is_some_and(|p| self.contains(p));
        let latched = *self.latched.get(&hand).unwrap_or(&false);

        if !inside {
            self.latched.insert(hand, false);
            return vec![];
        }
        if latched {
            return vec![];
        }

        self.latched.insert(hand, true);
        self.on = !self.on;
        vec![if self.on {
            EngineCommand::Unmute { side: self.side, stem: self.stem }
        } else {
            EngineCommand::Mute { side: self.side, stem: self.stem }
        }]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        surface.draw_region(self.region, self.on);
    }
}

/// Edge-triggered button driving `Deck.cue()`. No displayed on/off state.
pub struct CueButton {
    pub side: Side,
    pub region: WidgetRegion,
    latched: HashMap<HandLabel, bool>,
}

impl CueButton {
    pub fn new(side: Side, region: WidgetRegion) -> Self {
        Self { side, region, latched: HashMap::new() }
    }
}

impl Widget for CueButton {
    fn contains(&self, point: Point) -> bool {
        rect_contains(&self.region, point)
    }

    fn update(&mut self, hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
        let inside = gesture == Gesture::Pinch && point.is_some_and(|p| self.contains(p));
        let latched = *self.latched.get(&hand).unwrap_or(&false);

        if !inside {
            self.latched.insert(hand, false);
            return vec![];
        }
        if latched {
            return vec![];
        }

        self.latched.insert(hand, true);
        vec![EngineCommand::Cue { side: self.side }]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        surface.draw_region(self.region, false);
    }
}

/// Normalize an angle delta to `(-pi, pi]`.
fn normalize_delta(mut delta: f32) -> f32 {
    while delta > PI {
        delta -= 2.0 * PI;
    }
    while delta <= -PI {
        delta += 2.0 * PI;
    }
    delta
}

/// Rotary platter driving `Deck.seek` via the grab gesture.
pub struct Platter {
    pub side: Side,
    pub center: Point,
    pub radius: f32,
    /// Display angle, radians, wrapped to `[0, 2*pi)`.
    pub platter_angle: f32,
    prev_angle: HashMap<HandLabel, f32>,
}

impl Platter {
    pub fn new(side: Side, center: Point, radius: f32) -> Self {
        Self { side, center, radius, platter_angle: 0.0, prev_angle: HashMap::new() }
    }

    fn angle_of(&self, point: Point) -> f32 {
        (point.y - self.center.y).atan2(point.x - self.center.x)
    }
}

impl Widget for Platter {
    fn contains(&self, point: Point) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        (dx * dx + dy * dy).sqrt() <= self.radius
    }

    fn update(&mut self, hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
        let inside = gesture == Gesture::Grab && point.is_some_and(|p| self.contains(p));

        if !inside {
            self.prev_angle.remove(&hand);
            return vec![];
        }

        let point = point.expect("checked by `inside`");
        let cur_angle = self.angle_of(point);

        let Some(&prev) = self.prev_angle.get(&hand) else {
            self.prev_angle.insert(hand, cur_angle);
            return vec![];
        };

        let delta = normalize_delta(cur_angle - prev);
        self.prev_angle.insert(hand, cur_angle);
        self.platter_angle = (self.platter_angle + delta).rem_euclid(2.0 * PI);

        vec![EngineCommand::Seek { side: self.side, delta_seconds: 1.5 * delta as f64 }]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        let region = WidgetRegion { x: self.center.x - self.radius, y: self.center.y - self.radius, w: self.radius * 2.0, h: self.radius * 2.0 };
        surface.draw_region(region, self.prev_angle.values().next().is_some());
    }
}

/// Linear slider driving `Deck.set_rate`, continuous (not edge-triggered).
pub struct Slider {
    pub side: Side,
    pub region: WidgetRegion,
    pub rate_range: (f32, f32),
}

impl Slider {
    pub fn new(side: Side, region: WidgetRegion, rate_range: (f32, f32)) -> Self {
        Self { side, region, rate_range }
    }
}

impl Widget for Slider {
    fn contains(&self, point: Point) -> bool {
        rect_contains(&self.region, point)
    }

    fn update(&mut self, _hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
        let Some(point) = point.filter(|&p| gesture == Gesture::Pinch && self.contains(p)) else {
            return vec![];
        };

        let t = ((point.x - self.region.x) / self.region.w).clamp(0.0, 1.0);
        let (min, max) = self.rate_range;
        let rate = min + t * (max - min);
        vec![EngineCommand::SetRate { side: self.side, rate }]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        surface.draw_region(self.region, false);
    }
}

/// Read-only waveform strip. Never produces commands.
pub struct Waveform {
    pub side: Side,
    pub region: WidgetRegion,
}

impl Waveform {
    pub fn new(side: Side, region: WidgetRegion) -> Self {
        Self { side, region }
    }
}

impl Widget for Waveform {
    fn contains(&self, _point: Point) -> bool {
        false
    }

    fn update(&mut self, _hand: HandLabel, _gesture: Gesture, _point: Option<Point>) -> Vec<EngineCommand> {
        vec![]
    }

    fn draw(&self, surface: &mut dyn OverlaySurface) {
        surface.draw_region(self.region, false);
    }
}

/// Dispatch one hand's classified gesture to a priority-ordered widget
/// list, resolving overlapping regions by first-hit (front-to-back Z
/// order, per §9's open question): the first widget in `widgets` whose
/// region contains `point` receives the real gesture; every other widget
/// is told the hand is absent, so its own latch resets consistently.
pub fn dispatch(widgets: &mut [Box<dyn Widget>], hand: HandLabel, gesture: Gesture, point: Option<Point>) -> Vec<EngineCommand> {
    let hit_index = point.and_then(|p| widgets.iter().position(|w| w.contains(p)));

    let mut commands = Vec::new();
    for (i, widget) in widgets.iter_mut().enumerate() {
        if Some(i) == hit_index {
            commands.extend(widget.update(hand, gesture, point));
        } else {
            widget.update(hand, Gesture::Idle, None);
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: f32, y: f32, w: f32, h: f32) -> WidgetRegion {
        WidgetRegion { x, y, w, h }
    }

    #[test]
    fn test_play_button_toggles_once_per_dwell() {
        let mut button = PlayButton::new(Side::Left, region(0.0, 0.0, 100.0, 100.0));
        let inside = Point::new(50.0, 50.0);

        let first = button.update(HandLabel::Left, Gesture::Pinch, Some(inside));
        assert_eq!(first, vec![EngineCommand::Play { side: Side::Left }]);

        // Stays inside for more frames: no further toggles.
        for _ in 0..30 {
            assert!(button.update(HandLabel::Left, Gesture::Pinch, Some(inside)).is_empty());
        }

        // Leaves, then re-enters: toggles back off.
        assert!(button.update(HandLabel::Left, Gesture::Idle, None).is_empty());
        let second = button.update(HandLabel::Left, Gesture::Pinch, Some(inside));
        assert_eq!(second, vec![EngineCommand::Pause { side: Side::Left }]);
    }

    #[test]
    fn test_stem_button_starts_unmuted_and_toggles_to_mute() {
        let mut button = StemButton::new(Side::Right, Stem::Bass, region(0.0, 0.0, 10.0, 10.0));
        let inside = Point::new(5.0, 5.0);
        let cmds = button.update(HandLabel::Right, Gesture::Pinch, Some(inside));
        assert_eq!(cmds, vec![EngineCommand::Mute { side: Side::Right, stem: Stem::Bass }]);
    }

    #[test]
    fn test_cue_button_fires_once_on_entry_no_state() {
        let mut button = CueButton::new(Side::Left, region(0.0, 0.0, 10.0, 10.0));
        let inside = Point::new(5.0, 5.0);
        assert_eq!(button.update(HandLabel::Left, Gesture::Pinch, Some(inside)), vec![EngineCommand::Cue { side: Side::Left }]);
        assert!(button.update(HandLabel::Left, Gesture::Pinch, Some(inside)).is_empty());
    }

    #[test]
    fn test_platter_full_rotation_advances_three_pi_seconds() {
        let mut platter = Platter::new(Side::Left, Point::new(0.0, 0.0), 1000.0);
        let steps = 10;
        let mut total_seek = 0.0f64;

        // Start at angle 0.
        let start = Point::new(100.0, 0.0);
        platter.update(HandLabel::Left, Gesture::Grab, Some(start));

        for i in 1..=steps {
            let angle = (i as f32) * (std::f32::consts::PI / steps as f32);
            let point = Point::new(100.0 * angle.cos(), 100.0 * angle.sin());
            let cmds = platter.update(HandLabel::Left, Gesture::Grab, Some(point));
            assert_eq!(cmds.len(), 1);
            if let EngineCommand::Seek { delta_seconds, .. } = &cmds[0] {
                total_seek += *delta_seconds;
            }
        }

        assert!((platter.platter_angle - std::f32::consts::PI).abs() < 1e-4);
        assert!((total_seek - 1.5 * std::f32::consts::PI as f64).abs() < 1e-3);
    }

    #[test]
    fn test_platter_clears_prev_angle_on_exit() {
        let mut platter = Platter::new(Side::Left, Point::new(0.0, 0.0), 1000.0);
        platter.update(HandLabel::Left, Gesture::Grab, Some(Point::new(100.0, 0.0)));
        assert!(platter.update(HandLabel::Left, Gesture::Idle, None).is_empty());
        // Re-entering without a prior angle should not emit a seek yet.
        assert!(platter.update(HandLabel::Left, Gesture::Grab, Some(Point::new(0.0, 100.0))).is_empty());
    }

    #[test]
    fn test_slider_edges_map_to_rate_range() {
        let mut slider = Slider::new(Side::Left, region(0.0, 0.0, 100.0, 10.0), (0.5, 1.5));

        let left_edge = slider.update(HandLabel::Left, Gesture::Pinch, Some(Point::new(0.0, 5.0)));
        assert_eq!(left_edge, vec![EngineCommand::SetRate { side: Side::Left, rate: 0.5 }]);

        let right_edge = slider.update(HandLabel::Left, Gesture::Pinch, Some(Point::new(100.0, 5.0)));
        assert_eq!(right_edge, vec![EngineCommand::SetRate { side: Side::Left, rate: 1.5 }]);

        let mid = slider.update(HandLabel::Left, Gesture::Pinch, Some(Point::new(50.0, 5.0)));
        assert_eq!(mid, vec![EngineCommand::SetRate { side: Side::Left, rate: 1.0 }]);
    }

    #[test]
    fn test_slider_not_edge_triggered_emits_every_frame() {
        let mut slider = Slider::new(Side::Left, region(0.0, 0.0, 100.0, 10.0), (0.5, 1.5));
        let point = Some(Point::new(50.0, 5.0));
        assert_eq!(slider.update(HandLabel::Left, Gesture::Pinch, point).len(), 1);
        assert_eq!(slider.update(HandLabel::Left, Gesture::Pinch, point).len(), 1);
    }

    #[test]
    fn test_waveform_never_produces_commands() {
        let mut waveform = Waveform::new(Side::Left, region(0.0, 0.0, 100.0, 10.0));
        assert!(waveform.update(HandLabel::Left, Gesture::Pinch, Some(Point::new(50.0, 5.0))).is_empty());
    }

    #[test]
    fn test_dispatch_first_hit_wins_on_overlap() {
        let widgets: Vec<Box<dyn Widget>> = vec![
            Box::new(PlayButton::new(Side::Left, region(0.0, 0.0, 100.0, 100.0))),
            Box::new(CueButton::new(Side::Left, region(50.0, 50.0, 100.0, 100.0))),
        ];
        let mut widgets = widgets;
        let overlap_point = Point::new(60.0, 60.0);
        let cmds = dispatch(&mut widgets, HandLabel::Left, Gesture::Pinch, Some(overlap_point));
        assert_eq!(cmds, vec![EngineCommand::Play { side: Side::Left }]);
    }
}
