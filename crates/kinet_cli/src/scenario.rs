//! Headless scenario playback
//!
//! Mounts one widget on a recording surface, feeds it a scripted event
//! sequence and collects the surface writes of every frame.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kinet_core::{EventKind, InputEvent, Rect};
use kinet_widgets::{
    AnimatedLine, AnimatedLoader, GooglyEyes, InfiniteMenu, Marquee, RecordingSurface,
    SurfaceCall, TextRandomizer, WidgetHost,
};
use serde::Serialize;

use crate::config::KinetConfig;

/// Widgets the CLI can play back
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Line,
    Eyes,
    Marquee,
    Menu,
    Text,
    Loader,
}

/// An input record delivered right before frame `frame`
#[derive(Clone, Copy, Debug)]
pub struct ScriptedEvent {
    pub frame: usize,
    pub event: InputEvent,
}

/// Surface writes produced by one frame
#[derive(Clone, Debug, Serialize)]
pub struct FrameRecord {
    pub frame: usize,
    pub timestamp_ms: f64,
    pub calls: Vec<SurfaceCall>,
}

/// A mounted widget; kept alive for the duration of the playback
enum Mounted {
    Line(AnimatedLine),
    Eyes(GooglyEyes),
    Marquee(Marquee),
    Menu(InfiniteMenu),
    Text(TextRandomizer),
    Loader(AnimatedLoader),
}

impl Mounted {
    fn summary(&self) -> String {
        match self {
            Mounted::Line(line) => format!(
                "phase {:?}, path {}, returns {}",
                line.phase(),
                line.path(),
                line.returns_completed()
            ),
            Mounted::Eyes(eyes) => {
                format!("{} eyes, first pupil {:?}", eyes.eye_count(), eyes.pupil(0))
            }
            Mounted::Marquee(marquee) => format!("offset {}", marquee.strip().offset()),
            Mounted::Menu(menu) => {
                format!("scroll {} (target {})", menu.scroll(), menu.scroll_target())
            }
            Mounted::Text(text) => format!("text {:?}", text.displayed()),
            Mounted::Loader(loader) => format!(
                "elapsed {} of {} ms, finished {}",
                loader.elapsed_ms(),
                loader.duration_ms(),
                loader.is_finished()
            ),
        }
    }
}

/// Pointer at `(x, y)` on `kind`
fn at(frame: usize, kind: EventKind, x: f32, y: f32) -> ScriptedEvent {
    ScriptedEvent {
        frame,
        event: InputEvent::pointer(kind, x, y, 0),
    }
}

/// The scripted input sequence for a widget
pub fn script(widget: WidgetKind) -> Vec<ScriptedEvent> {
    use EventKind::*;
    match widget {
        WidgetKind::Line => vec![
            at(0, Enter, 100.0, 30.0),
            at(5, Move, 180.0, 10.0),
            at(30, Leave, 220.0, 10.0),
        ],
        WidgetKind::Eyes => vec![at(0, Move, 150.0, 50.0), at(30, Move, 150.0, 400.0)],
        WidgetKind::Menu => vec![
            ScriptedEvent {
                frame: 0,
                event: InputEvent::wheel(120.0, 0),
            },
            at(30, DragStart, 0.0, 300.0),
            at(31, DragMove, 0.0, 260.0),
            at(32, DragMove, 0.0, 200.0),
            at(33, DragEnd, 0.0, 200.0),
        ],
        WidgetKind::Text => vec![at(0, Enter, 0.0, 0.0)],
        WidgetKind::Marquee | WidgetKind::Loader => Vec::new(),
    }
}

fn mount(
    widget: WidgetKind,
    host: &WidgetHost,
    surface: Rc<RefCell<RecordingSurface>>,
    config: &KinetConfig,
) -> Result<Mounted> {
    let mounted = match widget {
        WidgetKind::Line => Mounted::Line(AnimatedLine::new(
            host,
            Rect::new(0.0, 0.0, 200.0, 60.0),
            surface,
            config.line,
        )?),
        WidgetKind::Eyes => Mounted::Eyes(GooglyEyes::new(
            host,
            vec![
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Rect::new(200.0, 0.0, 100.0, 100.0),
            ],
            surface,
            config.eyes,
        )?),
        WidgetKind::Marquee => {
            Mounted::Marquee(Marquee::new(host, 200.0, 400.0, surface, config.marquee)?)
        }
        WidgetKind::Menu => Mounted::Menu(InfiniteMenu::new(host, 5, 100.0, surface, config.menu)?),
        WidgetKind::Text => Mounted::Text(TextRandomizer::new(
            host,
            "KINET",
            surface,
            config.text.clone(),
        )?),
        WidgetKind::Loader => Mounted::Loader(AnimatedLoader::new(host, surface, config.loader)?),
    };
    Ok(mounted)
}

/// Result of a playback
pub struct Playback {
    pub frames: Vec<FrameRecord>,
    /// Final widget state, human readable
    pub summary: String,
}

/// Play `frames` frames of `widget`'s scenario
pub fn play(widget: WidgetKind, config: &KinetConfig, frames: usize) -> Result<Playback> {
    let host = WidgetHost::new();
    host.scheduler().set_target_fps(config.frames.fps);
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let mounted = mount(widget, &host, surface.clone(), config)
        .with_context(|| format!("Failed to mount {widget:?}"))?;

    let script = script(widget);
    let interval = host.scheduler().frame_interval_ms();
    let mut records = Vec::with_capacity(frames);
    for frame in 0..frames {
        let timestamp_ms = frame as f64 * interval;
        for scripted in script.iter().filter(|s| s.frame == frame) {
            let event = InputEvent {
                timestamp_ms: timestamp_ms as u64,
                ..scripted.event
            };
            tracing::trace!(frame, kind = ?event.kind, "dispatching scripted event");
            host.dispatch(&event);
        }
        host.run_frame(timestamp_ms);
        records.push(FrameRecord {
            frame,
            timestamp_ms,
            calls: surface.borrow_mut().take(),
        });
    }

    let summary = mounted.summary();
    tracing::debug!(?widget, frames, %summary, "playback finished");
    Ok(Playback {
        frames: records,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_returns_home() {
        let playback = play(WidgetKind::Line, &KinetConfig::default(), 120).unwrap();
        assert_eq!(playback.frames.len(), 120);
        assert!(playback.summary.contains("Resting"));
        assert!(playback.summary.contains("returns 1"));

        let last = playback.frames.last().unwrap();
        assert_eq!(
            last.calls,
            vec![SurfaceCall::PathCommand {
                d: "M 10 0 Q 100 0 190 0".to_string()
            }]
        );
    }

    #[test]
    fn test_loader_stops_writing_when_finished() {
        let playback = play(WidgetKind::Loader, &KinetConfig::default(), 600).unwrap();
        assert!(playback.summary.contains("finished true"));
        assert!(playback.frames.last().unwrap().calls.is_empty());
        assert_eq!(playback.frames[0].calls.len(), 2);
    }

    #[test]
    fn test_text_is_reproducible_with_seed() {
        let mut config = KinetConfig::default();
        config.text.seed = Some(3);
        let a = play(WidgetKind::Text, &config, 20).unwrap();
        let b = play(WidgetKind::Text, &config, 20).unwrap();
        assert_eq!(a.frames[0].calls, b.frames[0].calls);
    }

    #[test]
    fn test_every_widget_plays() {
        for widget in WidgetKind::value_variants() {
            let playback = play(*widget, &KinetConfig::default(), 10).unwrap();
            assert!(!playback.frames[0].calls.is_empty(), "{widget:?} wrote nothing");
        }
    }

    #[test]
    fn test_frame_record_json() {
        let record = FrameRecord {
            frame: 3,
            timestamp_ms: 50.0,
            calls: vec![SurfaceCall::ScrollOffset { x: -2.5 }],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"frame":3,"timestamp_ms":50.0,"calls":[{"call":"scroll_offset","x":-2.5}]}"#
        );
    }
}
