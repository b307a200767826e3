//! Timeline orchestration for sequenced tweens
//!
//! Entries belong to numbered tracks (one per animated property). A track's
//! value comes from the latest entry that has started, so consecutive tweens
//! on a track hand over cleanly.

use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::error::{ensure_finite, AnimationError, Result};

new_key_type! {
    pub struct TimelineEntryId;
}

/// Property track index
pub type TrackId = usize;

/// An entry in a timeline
struct TimelineEntry {
    track: TrackId,
    /// Offset in milliseconds from timeline start
    offset_ms: f32,
    duration_ms: f32,
    start_value: f32,
    end_value: f32,
    easing: Easing,
}

impl TimelineEntry {
    fn value_at(&self, time_ms: f32) -> f32 {
        let local = time_ms - self.offset_ms;
        if local <= 0.0 {
            return self.start_value;
        }
        if local >= self.duration_ms {
            return self.end_value;
        }
        let eased = self.easing.apply(local / self.duration_ms);
        self.start_value + (self.end_value - self.start_value) * eased
    }

    fn end_ms(&self) -> f32 {
        self.offset_ms + self.duration_ms
    }
}

/// A timeline that orchestrates tweens across property tracks
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    current_time: f32,
    duration_ms: f32,
    playing: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            current_time: 0.0,
            duration_ms: 0.0,
            playing: false,
        }
    }

    /// Add a tween on `track` starting `offset_ms` after the timeline starts
    pub fn add(
        &mut self,
        track: TrackId,
        offset_ms: f32,
        duration_ms: f32,
        start_value: f32,
        end_value: f32,
        easing: Easing,
    ) -> Result<TimelineEntryId> {
        if !(offset_ms.is_finite() && offset_ms >= 0.0) {
            return Err(AnimationError::invalid(format!(
                "timeline offset must be a non-negative finite number, got {offset_ms}"
            )));
        }
        if !(duration_ms.is_finite() && duration_ms >= 0.0) {
            return Err(AnimationError::invalid(format!(
                "timeline duration must be a non-negative finite number, got {duration_ms}"
            )));
        }
        ensure_finite("timeline start value", start_value)?;
        ensure_finite("timeline end value", end_value)?;
        easing.validate()?;

        let entry = TimelineEntry {
            track,
            offset_ms,
            duration_ms,
            start_value,
            end_value,
            easing,
        };
        self.duration_ms = self.duration_ms.max(entry.end_ms());
        Ok(self.entries.insert(entry))
    }

    /// Append a tween on `track` after `delay_ms`, starting from where the
    /// track's last entry ends (or `from` if the track is empty)
    pub fn then(
        &mut self,
        track: TrackId,
        from: f32,
        delay_ms: f32,
        duration_ms: f32,
        end_value: f32,
        easing: Easing,
    ) -> Result<TimelineEntryId> {
        let (offset, start) = self
            .last_entry(track)
            .map_or((0.0, from), |e| (e.end_ms(), e.end_value));
        self.add(
            track,
            offset + delay_ms,
            duration_ms,
            start,
            end_value,
            easing,
        )
    }

    fn track_entries(&self, track: TrackId) -> impl Iterator<Item = &TimelineEntry> + '_ {
        self.entries.values().filter(move |e| e.track == track)
    }

    fn last_entry(&self, track: TrackId) -> Option<&TimelineEntry> {
        self.track_entries(track)
            .max_by(|a, b| a.end_ms().total_cmp(&b.end_ms()))
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        !self.playing && self.current_time >= self.duration_ms
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Advance the timeline; returns whether it is still playing
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.playing {
            return false;
        }
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.current_time += dt_ms;
        }
        if self.current_time >= self.duration_ms {
            self.current_time = self.duration_ms;
            self.playing = false;
        }
        self.playing
    }

    /// Get the current value for an animation entry
    pub fn value(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries
            .get(id)
            .map(|entry| entry.value_at(self.current_time))
    }

    /// Current value of a track: the latest entry that has started, or the
    /// start value of the earliest entry before anything has started
    pub fn track_value(&self, track: TrackId) -> Option<f32> {
        let started = self
            .track_entries(track)
            .filter(|e| e.offset_ms <= self.current_time)
            .max_by(|a, b| a.offset_ms.total_cmp(&b.offset_ms));

        match started {
            Some(entry) => Some(entry.value_at(self.current_time)),
            None => self
                .track_entries(track)
                .min_by(|a, b| a.offset_ms.total_cmp(&b.offset_ms))
                .map(|e| e.start_value),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
