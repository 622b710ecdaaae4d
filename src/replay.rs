//! Trace Replay
//!
//! Feeds a scripted pointer trace through a [`VirtualSource`] and a
//! [`PointerTracker`], collecting the records a consumer would drain and the
//! snapshots a poller would see. Traces are JSON lines, one event per line:
//!
//! ```text
//! {"type":"move","x":10,"y":100,"timestamp":1000}
//! {"type":"button","button":1,"action":501,"modifier":true,"timestamp":2000}
//! {"type":"wheel","notches":-1,"timestamp":3000}
//! {"type":"grab","grabbed":true}
//! {"type":"raw_delta","dx":4,"dy":-2,"timestamp":4000}
//! {"type":"poll"}
//! ```
//!
//! Records are drained at every `poll` line and once more at the end of the
//! trace.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::input::{EventRecord, PointerMode, PointerTracker, PollSnapshot, VirtualSource};

/// One scripted event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Absolute pointer motion
    Move {
        /// X in surface coordinates
        x: i32,
        /// Y in surface coordinates (top-left origin)
        y: i32,
        /// Nanoseconds
        #[serde(default)]
        timestamp: i64,
    },
    /// Relative motion from the captured-mode channel
    RawDelta {
        /// X delta
        dx: i32,
        /// Y delta
        dy: i32,
        /// Nanoseconds
        #[serde(default)]
        timestamp: i64,
    },
    /// Raw button transition
    Button {
        /// Raw platform button id
        button: i32,
        /// Raw platform action id
        action: i32,
        /// Chord modifier held
        #[serde(default)]
        modifier: bool,
        /// Nanoseconds
        #[serde(default)]
        timestamp: i64,
    },
    /// Wheel notches
    Wheel {
        /// Notches, positive away from the user
        notches: i32,
        /// Nanoseconds
        #[serde(default)]
        timestamp: i64,
    },
    /// Switch motion mode
    Grab {
        /// Captured when true
        grabbed: bool,
    },
    /// Poll and drain
    Poll,
    /// Resize the virtual surface
    Resize {
        /// New width
        width: i32,
        /// New height
        height: i32,
    },
    /// Move the OS cursor without a motion callback
    Warp {
        /// X in surface coordinates
        x: i32,
        /// Y in surface coordinates
        y: i32,
    },
}

/// Event the tracker rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEvent {
    /// Zero-based position in the trace
    pub index: usize,
    /// Error message
    pub error: String,
}

/// Everything observed while replaying a trace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Drained records in emission order
    pub records: Vec<EventRecord>,
    /// One snapshot per `poll` event
    pub polls: Vec<PollSnapshot>,
    /// Events that failed with a platform fault
    pub rejected: Vec<RejectedEvent>,
    /// Records the queue dropped on overflow
    pub dropped: u64,
    /// Mode at the end of the trace
    pub final_mode: Option<PointerMode>,
}

/// Parse a JSON-lines trace. Blank lines and lines starting with `#` are skipped.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str::<TraceEvent>(line)
                .with_context(|| format!("Invalid trace event on line {}", number + 1))
        })
        .collect()
}

/// Replays traces against a fresh tracker
pub struct Replayer {
    source: Arc<VirtualSource>,
    tracker: Arc<PointerTracker>,
}

impl Replayer {
    /// Build a source and a registered tracker from configuration
    pub fn new(config: &Config) -> Self {
        let source = match config.pointer.surface_size() {
            Some((width, height)) => VirtualSource::with_surface(width, height),
            None => VirtualSource::headless(),
        };

        let tracker = Arc::new(PointerTracker::with_queue_capacity(config.queue.capacity));
        tracker.register(&source);
        if config.pointer.start_grabbed {
            tracker.set_grabbed(true);
        }

        Self { source, tracker }
    }

    /// Tracker under replay
    pub fn tracker(&self) -> &Arc<PointerTracker> {
        &self.tracker
    }

    /// Replay `events` in order
    pub fn run(&self, events: &[TraceEvent]) -> ReplayReport {
        let mut report = ReplayReport::default();

        for (index, event) in events.iter().enumerate() {
            debug!("Replaying event {}: {:?}", index, event);
            match *event {
                TraceEvent::Move { x, y, timestamp } => self.source.move_to(x, y, timestamp),
                TraceEvent::RawDelta { dx, dy, timestamp } => {
                    self.source.raw_delta(dx, dy, timestamp)
                }
                TraceEvent::Button {
                    button,
                    action,
                    modifier,
                    timestamp,
                } => {
                    if let Err(e) = self.source.button(button, action, modifier, timestamp) {
                        warn!("Trace event {} rejected: {}", index, e);
                        report.rejected.push(RejectedEvent {
                            index,
                            error: e.to_string(),
                        });
                    }
                }
                TraceEvent::Wheel { notches, timestamp } => self.source.wheel(notches, timestamp),
                TraceEvent::Grab { grabbed } => self.tracker.set_grabbed(grabbed),
                TraceEvent::Poll => {
                    report.polls.push(self.tracker.snapshot());
                    self.drain_into(&mut report);
                }
                TraceEvent::Resize { width, height } => match self.source.virtual_surface() {
                    Some(surface) => surface.resize(width, height),
                    None => warn!("Ignoring resize on headless source"),
                },
                TraceEvent::Warp { x, y } => match self.source.virtual_surface() {
                    Some(surface) => surface.set_cursor(Some((x, y))),
                    None => warn!("Ignoring warp on headless source"),
                },
            }
        }

        self.drain_into(&mut report);
        report.dropped = self.tracker.queue().dropped();
        report.final_mode = Some(self.tracker.mode());

        info!(
            "Replayed {} events: {} records, {} polls, {} rejected, {} dropped",
            events.len(),
            report.records.len(),
            report.polls.len(),
            report.rejected.len(),
            report.dropped
        );

        report
    }

    fn drain_into(&self, report: &mut ReplayReport) {
        for raw in self.tracker.queue().drain() {
            // Records come straight from the encoder, decode only fails on length
            if let Ok(record) = EventRecord::decode(&raw) {
                report.records.push(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ACTION_PRESSED, ACTION_RELEASED, RAW_BUTTON_PRIMARY};

    fn surface_config(width: i32, height: i32) -> Config {
        let mut config = Config::default_config().unwrap();
        config.pointer.surface_width = Some(width);
        config.pointer.surface_height = Some(height);
        config
    }

    #[test]
    fn test_parse_trace() {
        let events = parse_trace(
            r#"
            # chorded middle click
            {"type":"button","button":1,"action":501,"modifier":true,"timestamp":5}
            {"type":"poll"}
            "#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                TraceEvent::Button {
                    button: 1,
                    action: 501,
                    modifier: true,
                    timestamp: 5
                },
                TraceEvent::Poll,
            ]
        );
    }

    #[test]
    fn test_parse_trace_reports_line() {
        let err = parse_trace("{\"type\":\"poll\"}\n{\"type\":\"jump\"}").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_replay_windowed_trace() {
        let replayer = Replayer::new(&surface_config(1024, 768));
        let report = replayer.run(&[
            TraceEvent::Move {
                x: 10,
                y: 100,
                timestamp: 1,
            },
            TraceEvent::Wheel {
                notches: 2,
                timestamp: 2,
            },
            TraceEvent::Poll,
            TraceEvent::Poll,
        ]);

        assert_eq!(report.polls[0].coords, [10, 667, 240]);
        assert_eq!(report.polls[1].coords, [10, 667, 0]);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.final_mode, Some(PointerMode::Windowed));
    }

    #[test]
    fn test_replay_collects_rejections() {
        let replayer = Replayer::new(&Config::default_config().unwrap());
        let report = replayer.run(&[
            TraceEvent::Button {
                button: RAW_BUTTON_PRIMARY,
                action: 999,
                modifier: false,
                timestamp: 0,
            },
            TraceEvent::Button {
                button: RAW_BUTTON_PRIMARY,
                action: ACTION_PRESSED,
                modifier: false,
                timestamp: 1,
            },
            TraceEvent::Button {
                button: RAW_BUTTON_PRIMARY,
                action: ACTION_RELEASED,
                modifier: false,
                timestamp: 2,
            },
        ]);

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 0);
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_replay_start_grabbed_and_overflow() {
        let mut config = Config::default_config().unwrap();
        config.queue.capacity = 2;
        config.pointer.start_grabbed = true;

        let replayer = Replayer::new(&config);
        let events: Vec<TraceEvent> = (0..5)
            .map(|i| TraceEvent::RawDelta {
                dx: 1,
                dy: 1,
                timestamp: i,
            })
            .chain(std::iter::once(TraceEvent::Poll))
            .collect();
        let report = replayer.run(&events);

        assert_eq!(report.polls[0].coords, [5, 5, 0]);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.dropped, 3);
        assert_eq!(report.final_mode, Some(PointerMode::Captured));
    }
}
