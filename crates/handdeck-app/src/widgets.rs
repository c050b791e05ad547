//! Builds the concrete control-surface widget list from [`AppConfig`]'s
//! declarative layout.

use handdeck_core::config::{AppConfig, WidgetKind, WidgetLayoutEntry};
use handdeck_gesture::types::Point;
use handdeck_gesture::widget::{CueButton, PlayButton, Platter, Slider, StemButton, Waveform, Widget};

/// Build widgets in the order they appear in the config. Order matters:
/// [`handdeck_gesture::widget::dispatch`] resolves overlapping regions by
/// first-hit, so earlier entries win.
pub fn build_widgets(config: &AppConfig) -> Vec<Box<dyn Widget>> {
    config.widget_layout.iter().map(|entry| build_one(entry, config)).collect()
}

fn build_one(entry: &WidgetLayoutEntry, config: &AppConfig) -> Box<dyn Widget> {
    let region = entry.region;
    match entry.kind {
        WidgetKind::PlayButton => Box::new(PlayButton::new(entry.side, region)),
        WidgetKind::CueButton => Box::new(CueButton::new(entry.side, region)),
        WidgetKind::StemButton => {
            let stem = entry.stem.expect("StemButton layout entry must name a stem");
            Box::new(StemButton::new(entry.side, stem, region))
        }
        WidgetKind::Platter => {
            let center = Point::new(region.x + region.w / 2.0, region.y + region.h / 2.0);
            let radius = region.w.min(region.h) / 2.0;
            Box::new(Platter::new(entry.side, center, radius))
        }
        WidgetKind::Slider => Box::new(Slider::new(entry.side, region, config.slider_rate_range)),
        WidgetKind::Waveform => Box::new(Waveform::new(entry.side, region)),
    }
}
