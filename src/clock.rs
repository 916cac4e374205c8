use crate::color::Channels;
use crate::frame::FrameBuffer;
use crate::frame::DIVISIONS;

const FACE: u32 = DIVISIONS as u32;

const MARK_COUNT: u32 = 12;

/// Wall-clock reading taken once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSample {
    pub epoch: i64,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

impl TimeSample {
    /// A sample on 1970-01-01 UTC, so `epoch` is the seconds since midnight.
    pub fn from_hms(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            epoch: i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second),
            hour,
            minute,
            second,
            nanosecond: 0,
        }
    }

    /// Time left until the next whole wall-clock second.
    pub fn until_next_second(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1)
            .saturating_sub(std::time::Duration::from_nanos(self.nanosecond.into()))
    }
}

impl<Tz> From<chrono::DateTime<Tz>> for TimeSample
where
    Tz: chrono::TimeZone,
{
    fn from(value: chrono::DateTime<Tz>) -> Self {
        use chrono::Timelike;

        Self {
            epoch: value.timestamp(),
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
            // chrono reports a leap second as nanoseconds past one second
            nanosecond: value.nanosecond().min(999_999_999),
        }
    }
}

pub trait TimeSource {
    fn now(&self) -> TimeSample;
}

/// Wall clock in `zone`, with the offset looked up again for every sample.
#[derive(Debug, Clone)]
pub struct ZonedClock<Tz> {
    zone: Tz,
}

impl<Tz> ZonedClock<Tz>
where
    Tz: chrono::TimeZone,
{
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn sample_at(&self, utc: chrono::DateTime<chrono::Utc>) -> TimeSample {
        utc.with_timezone(&self.zone).into()
    }
}

impl<Tz> TimeSource for ZonedClock<Tz>
where
    Tz: chrono::TimeZone,
{
    fn now(&self) -> TimeSample {
        self.sample_at(chrono::Utc::now())
    }
}

/// The system time zone, daylight saving changes included.
pub type LocalClock = ZonedClock<chrono::Local>;

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(chrono::Local)
    }
}

/// Position of each of the twelve tick marks.
pub fn minute_mark_positions() -> impl Iterator<Item = i32> {
    (0..MARK_COUNT).map(|mark| (mark * FACE / MARK_COUNT) as i32)
}

pub fn hour_hand_position(hour: u8, minute: u8) -> i32 {
    // Exact form of 256 * h/12 + (256/12) * m/60 before truncation.
    let minutes_into_half_day = u32::from(hour % 12) * 60 + u32::from(minute);
    (FACE * minutes_into_half_day / (12 * 60)) as i32
}

pub fn minute_hand_position(minute: u8) -> i32 {
    (FACE * u32::from(minute) / 60) as i32
}

pub fn second_hand_position(second: u8) -> i32 {
    (FACE * u32::from(second) / 60) as i32
}

/// Paints the marks and hands of an analog clock face.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockFace;

impl ClockFace {
    pub const MARKS: Channels = Channels::RED.union(Channels::BLUE);
    pub const HOUR_HAND: Channels = Channels::RED;
    pub const MINUTE_HAND: Channels = Channels::GREEN;
    pub const SECOND_HAND: Channels = Channels::BLUE;

    pub fn render(&self, frame: &mut FrameBuffer, sample: &TimeSample) {
        self.render_minute_marks(frame);
        self.render_second_hand(frame, sample);
        self.render_minute_hand(frame, sample);
        self.render_hour_hand(frame, sample);
        tracing::trace!(
            hour = sample.hour,
            minute = sample.minute,
            second = sample.second,
            lit = frame.lit().count(),
            "Rendered clock face"
        );
    }

    pub fn render_minute_marks(&self, frame: &mut FrameBuffer) {
        for position in minute_mark_positions() {
            frame.paint_tick(position, Self::MARKS);
        }
    }

    pub fn render_hour_hand(&self, frame: &mut FrameBuffer, sample: &TimeSample) {
        frame.paint_arc(
            hour_hand_position(sample.hour, sample.minute),
            2,
            Self::HOUR_HAND,
        );
    }

    pub fn render_minute_hand(&self, frame: &mut FrameBuffer, sample: &TimeSample) {
        frame.paint_arc(minute_hand_position(sample.minute), 2, Self::MINUTE_HAND);
    }

    pub fn render_second_hand(&self, frame: &mut FrameBuffer, sample: &TimeSample) {
        frame.paint_arc(second_hand_position(sample.second), 1, Self::SECOND_HAND);
    }
}
