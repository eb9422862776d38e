//! Consumer side of the grip stream: smoothing and rehab session recording.

use std::{collections::VecDeque, time::Duration};

use super::{GripSample, ParseSampleError, FINGER_COUNT};

pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;
/// Press threshold in raw ADC units.
pub const DEFAULT_PRESS_THRESHOLD: u16 = 2000;
pub const DEFAULT_MAX_SESSION: Duration = Duration::from_secs(120);

/// Moving average over the last `window` values, truncated toward zero.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    values: VecDeque<u16>,
    window: usize,
}

impl SmoothingWindow {
    /// A window of 0 behaves as a window of 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        SmoothingWindow {
            values: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Adds a value and returns the mean of the values currently in the window.
    pub fn push(&mut self, value: u16) -> u16 {
        if self.values.len() == self.window {
            self.values.pop_front();
        }
        self.values.push_back(value);
        let sum: u32 = self.values.iter().map(|value| *value as u32).sum();
        (sum / self.values.len() as u32) as u16
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRow {
    pub elapsed: Duration,
    pub sample: GripSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(GripSample),
    /// Blank keep-alive line, nothing recorded.
    Skipped,
    /// The session reached its maximum duration, nothing recorded now or later.
    Finished,
}

/// Collects the frames received during one training session.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    threshold: u16,
    max_duration: Duration,
    rows: Vec<SessionRow>,
    presses_over_threshold: u32,
    finished: bool,
}

impl SessionRecorder {
    pub fn new(threshold: u16, max_duration: Duration) -> Self {
        SessionRecorder {
            threshold,
            max_duration,
            rows: Vec::new(),
            presses_over_threshold: 0,
            finished: false,
        }
    }

    /// Records one received line, `elapsed` since the session started. Once a line
    /// arrives past the maximum duration the session stays finished.
    ///
    /// # Errors
    ///
    /// The `ParseSampleError` of a malformed line. The line is not recorded and the
    /// session can go on.
    pub fn record(&mut self, elapsed: Duration, line: &str) -> Result<RecordOutcome, ParseSampleError> {
        if self.finished || elapsed > self.max_duration {
            self.finished = true;
            return Ok(RecordOutcome::Finished);
        }
        let sample: GripSample = match line.parse() {
            Ok(sample) => sample,
            Err(ParseSampleError::Empty) => return Ok(RecordOutcome::Skipped),
            Err(err) => return Err(err),
        };
        if sample.any_at_or_above(self.threshold) {
            self.presses_over_threshold += 1;
        }
        self.rows.push(SessionRow { elapsed, sample });
        Ok(RecordOutcome::Recorded(sample))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    /// Frames in which at least one finger reached the threshold.
    pub fn presses_over_threshold(&self) -> u32 {
        self.presses_over_threshold
    }

    /// `time,F1,F2,F3,F4` header, then one row per frame with the time in seconds.
    pub fn to_csv(&self) -> String {
        let fingers: Vec<String> = (1..=FINGER_COUNT).map(|finger| format!("F{finger}")).collect();
        let mut csv = format!("time,{}\n", fingers.join(","));
        for row in &self.rows {
            csv.push_str(&format!("{:.3},{}\n", row.elapsed.as_secs_f64(), row.sample));
        }
        csv
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_PRESS_THRESHOLD, DEFAULT_MAX_SESSION)
    }
}
