use tokio_util::sync::CancellationToken;

use crate::clock::ClockFace;
use crate::clock::TimeSample;
use crate::clock::TimeSource;
use crate::config::Schedule;
use crate::frame::FrameBuffer;
use crate::protocol::FrameSink;
use crate::protocol::FrameTiming;

/// Repaints the face and pushes one frame whenever the wall-clock second changes.
///
/// The task is the only owner of the sink and the frame buffer and runs on a
/// single blocking thread.
pub struct ClockTask<S, T>
where
    S: FrameSink,
    T: TimeSource,
{
    sink: S,
    time_source: T,
    face: ClockFace,
    frame: FrameBuffer,
    timing: FrameTiming,
    schedule: Schedule,
    cancellation_token: CancellationToken,
    last_second: Option<u8>,
}

impl<S, T> ClockTask<S, T>
where
    S: FrameSink,
    T: TimeSource,
{
    pub fn new(
        sink: S,
        time_source: T,
        cancellation_token: CancellationToken,
        config: &crate::config::DisplayConfig,
    ) -> Self {
        Self {
            sink,
            time_source,
            face: ClockFace,
            frame: FrameBuffer::new(),
            timing: config.timing(),
            schedule: config.schedule,
            cancellation_token,
            last_second: None,
        }
    }

    pub fn run(&mut self) -> Result<(), S::Error> {
        tracing::info!(schedule = ?self.schedule, "Starting clock");

        loop {
            if self.cancellation_token.is_cancelled() {
                tracing::info!("Ending clock loop");
                break;
            }

            let sample = self.time_source.now();
            if !self.poll(&sample)? {
                self.schedule.wait(&sample);
            }
        }

        Ok(())
    }

    /// Send a frame for `sample` if it starts a new second.
    ///
    /// Returns whether a frame went out.
    pub fn poll(&mut self, sample: &TimeSample) -> Result<bool, S::Error> {
        if self.last_second == Some(sample.second) {
            return Ok(false);
        }

        self.last_second = Some(sample.second);
        self.transmit_frame(sample)?;
        Ok(true)
    }

    fn transmit_frame(&mut self, sample: &TimeSample) -> Result<(), S::Error> {
        self.face.render(&mut self.frame, sample);

        crate::protocol::transmit(&mut self.sink, &self.frame, &self.timing)?;
        self.frame.clear();
        tracing::debug!(
            epoch = sample.epoch,
            time = %format_args!("{:02}:{:02}:{:02}", sample.hour, sample.minute, sample.second),
            "Sent frame"
        );

        let echo = self.sink.drain_input()?;
        if !echo.is_empty() {
            tracing::debug!(bytes = echo.len(), "Device sent data");
        }

        Ok(())
    }
}

impl Schedule {
    pub fn wait(&self, sample: &TimeSample) {
        match self {
            Schedule::BusyWait => std::hint::spin_loop(),
            Schedule::Sleep => std::thread::sleep(sample.until_next_second()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use tokio_util::sync::CancellationToken;

    use super::ClockTask;
    use crate::clock::ClockFace;
    use crate::clock::TimeSample;
    use crate::clock::TimeSource;
    use crate::config::DisplayConfig;
    use crate::config::Schedule;
    use crate::frame::FrameBuffer;
    use crate::protocol::encode_frame;
    use crate::protocol::tests::RecordingSink;
    use crate::protocol::tests::SinkEvent;
    use crate::protocol::FRAME_END;

    /// Hands out samples in order and cancels the task after the last one.
    struct ScriptedClock {
        samples: RefCell<VecDeque<TimeSample>>,
        cancellation_token: CancellationToken,
    }

    impl TimeSource for ScriptedClock {
        fn now(&self) -> TimeSample {
            let mut samples = self.samples.borrow_mut();
            let sample = samples.pop_front().unwrap();
            if samples.is_empty() {
                self.cancellation_token.cancel();
            }
            sample
        }
    }

    fn display_config() -> DisplayConfig {
        DisplayConfig {
            latch_delay: std::time::Duration::ZERO,
            commit_delay: std::time::Duration::ZERO,
            schedule: Schedule::BusyWait,
        }
    }

    fn task(samples: Vec<TimeSample>) -> ClockTask<RecordingSink, ScriptedClock> {
        let cancellation_token = CancellationToken::new();
        let clock = ScriptedClock {
            samples: RefCell::new(samples.into()),
            cancellation_token: cancellation_token.clone(),
        };
        ClockTask::new(
            RecordingSink::default(),
            clock,
            cancellation_token,
            &display_config(),
        )
    }

    fn expected_stream(sample: &TimeSample) -> Vec<u8> {
        let mut frame = FrameBuffer::new();
        ClockFace.render(&mut frame, sample);
        encode_frame(&frame)
    }

    #[test]
    fn test_first_sample_always_renders() {
        let mut task = task(vec![]);
        assert!(task.poll(&TimeSample::from_hms(0, 0, 0)).unwrap());
    }

    #[test]
    fn test_same_second_is_not_sent_twice() {
        let mut task = task(vec![]);
        let sample = TimeSample::from_hms(10, 20, 30);

        assert!(task.poll(&sample).unwrap());
        assert!(!task.poll(&sample).unwrap());
        assert_eq!(task.sink.sent().len(), 514);
    }

    #[test]
    fn test_frames_do_not_accumulate() {
        let mut task = task(vec![]);
        let first = TimeSample::from_hms(3, 0, 0);
        let second = TimeSample::from_hms(9, 45, 1);

        task.poll(&first).unwrap();
        assert!(task.frame.is_clear());
        task.poll(&second).unwrap();
        assert!(task.frame.is_clear());

        let sent = task.sink.sent();
        let (first_stream, second_stream) = sent.split_at(514);
        assert_eq!(first_stream, expected_stream(&first).as_slice());
        assert_eq!(second_stream, expected_stream(&second).as_slice());
    }

    #[test]
    fn test_run_sends_one_frame_per_second() {
        let at = |second, nanosecond| TimeSample {
            nanosecond,
            ..TimeSample::from_hms(12, 0, second)
        };

        let mut task = task(vec![
            at(5, 0),
            at(5, 300_000_000),
            at(5, 900_000_000),
            at(6, 1_000),
            at(6, 500_000_000),
            at(7, 0),
        ]);
        task.run().unwrap();

        let sent = task.sink.sent();
        assert_eq!(sent.len(), 3 * 514);
        assert_eq!(&sent[514..1028], expected_stream(&at(6, 0)).as_slice());
    }

    #[test]
    fn test_device_reply_is_drained_after_each_frame() {
        let mut task = task(vec![]);
        task.sink.replies.push_back(b"ok\r\n".to_vec());

        task.poll(&TimeSample::from_hms(8, 0, 0)).unwrap();
        task.poll(&TimeSample::from_hms(8, 0, 1)).unwrap();

        let drains: Vec<(usize, &SinkEvent)> = task
            .sink
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| matches!(event, SinkEvent::Drain(_)))
            .collect();

        assert_eq!(drains.len(), 2);
        assert_eq!(*drains[0].1, SinkEvent::Drain(b"ok\r\n".to_vec()));
        assert_eq!(*drains[1].1, SinkEvent::Drain(Vec::new()));
        assert_eq!(
            task.sink.events[drains[0].0 - 1],
            SinkEvent::Send(vec![FRAME_END])
        );
        assert!(task.sink.replies.is_empty());
        assert_eq!(task.sink.sent().len(), 2 * 514);
    }

    #[test]
    fn test_run_stops_when_cancelled() {
        let mut task = task(vec![TimeSample::from_hms(1, 1, 1)]);
        task.cancellation_token.cancel();
        task.run().unwrap();
        assert!(task.sink.events.is_empty());
    }
}
