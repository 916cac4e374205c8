use crate::color::Channels;
use crate::frame::FrameBuffer;

pub const FRAME_START: u8 = b'h';

pub const FRAME_END: u8 = b'f';

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Something a frame can be streamed into.
pub trait FrameSink {
    type Error;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Block until everything sent so far has left the host.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Input the device sent back, if the sink can receive any.
    fn drain_input(&mut self) -> Result<Vec<u8>, Self::Error> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Wait after the last position before committing the frame.
    pub latch_delay: std::time::Duration,
    /// Wait after the end marker.
    pub commit_delay: std::time::Duration,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            latch_delay: std::time::Duration::from_millis(50),
            commit_delay: std::time::Duration::from_millis(50),
        }
    }
}

/// The two lowercase hex digits sent for one position.
///
/// Unlit positions go out as all channels on; the display never receives a
/// literal zero.
pub fn encode_slot(channels: Channels) -> [u8; 2] {
    let channels = if channels.is_empty() {
        Channels::ALL_ON
    } else {
        channels
    };

    let bits = channels.bits();
    [
        HEX_DIGITS[usize::from(bits >> 4)],
        HEX_DIGITS[usize::from(bits & 0x0f)],
    ]
}

/// The full byte stream of one frame, without the pacing.
pub fn encode_frame(frame: &FrameBuffer) -> Vec<u8> {
    let mut stream = Vec::with_capacity(frame.slots().len() * 2 + 2);
    stream.push(FRAME_START);
    stream.extend(frame.slots().iter().copied().flat_map(encode_slot));
    stream.push(FRAME_END);
    stream
}

/// Stream `frame` to the sink, one hex digit at a time.
pub fn transmit<S>(sink: &mut S, frame: &FrameBuffer, timing: &FrameTiming) -> Result<(), S::Error>
where
    S: FrameSink,
{
    sink.send(&[FRAME_START])?;

    for channels in frame.slots() {
        for digit in encode_slot(*channels) {
            sink.send(&[digit])?;
            sink.flush()?;
        }
    }

    std::thread::sleep(timing.latch_delay);
    sink.send(&[FRAME_END])?;
    std::thread::sleep(timing.commit_delay);

    Ok(())
}
