use crate::color::Channels;

/// Number of angular positions around the clock face.
pub const DIVISIONS: usize = 256;

/// One full revolution of the display, one channel mask per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    slots: [Channels; DIVISIONS],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            slots: [Channels::empty(); DIVISIONS],
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap any (possibly negative) position onto the face.
    pub fn wrap(position: i32) -> usize {
        position.rem_euclid(DIVISIONS as i32) as usize
    }

    pub fn paint_tick(&mut self, position: i32, channels: Channels) {
        self.slots[Self::wrap(position)] |= channels;
    }

    /// Paint `center` and `half_width` positions on either side of it.
    pub fn paint_arc(&mut self, center: i32, half_width: u8, channels: Channels) {
        self.paint_tick(center, channels);
        for offset in 1..=i32::from(half_width) {
            self.paint_tick(center + offset, channels);
            self.paint_tick(center - offset, channels);
        }
    }

    #[cfg(test)]
    pub fn get(&self, position: i32) -> Channels {
        self.slots[Self::wrap(position)]
    }

    pub fn clear(&mut self) {
        self.slots = [Channels::empty(); DIVISIONS];
    }

    #[cfg(test)]
    pub fn is_clear(&self) -> bool {
        self.slots.iter().all(Channels::is_empty)
    }

    pub fn slots(&self) -> &[Channels; DIVISIONS] {
        &self.slots
    }

    /// Positions that carry at least one channel, in index order.
    pub fn lit(&self) -> impl Iterator<Item = (usize, Channels)> + '_ {
        self.slots
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, channels)| !channels.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::FrameBuffer;
    use super::DIVISIONS;
    use crate::color::Channels;

    #[test]
    fn test_paint_tick_is_idempotent() {
        for position in 0..DIVISIONS as i32 {
            let mut once = FrameBuffer::new();
            once.paint_tick(position, Channels::GREEN);

            let mut twice = once.clone();
            twice.paint_tick(position, Channels::GREEN);

            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_paint_tick_accumulates_channels() {
        let mut frame = FrameBuffer::new();
        frame.paint_tick(10, Channels::RED);
        frame.paint_tick(10, Channels::BLUE);
        assert_eq!(frame.get(10), Channels::RED | Channels::BLUE);
    }

    #[test]
    fn test_paint_tick_wraps_both_directions() {
        let mut frame = FrameBuffer::new();
        frame.paint_tick(256, Channels::RED);
        frame.paint_tick(-1, Channels::GREEN);
        frame.paint_tick(-257, Channels::BLUE);

        assert_eq!(frame.get(0), Channels::RED);
        assert_eq!(frame.get(255), Channels::GREEN | Channels::BLUE);
        assert_eq!(frame.lit().count(), 2);
    }

    #[test]
    fn test_paint_arc_width() {
        for half_width in 0..=4u8 {
            let mut frame = FrameBuffer::new();
            frame.paint_arc(100, half_width, Channels::BLUE);

            let lit: Vec<usize> = frame.lit().map(|(position, _)| position).collect();
            let expected: Vec<usize> =
                (100 - usize::from(half_width)..=100 + usize::from(half_width)).collect();
            assert_eq!(lit, expected);
        }
    }

    #[test]
    fn test_paint_arc_across_zero() {
        let mut frame = FrameBuffer::new();
        frame.paint_arc(0, 2, Channels::GREEN);

        let lit: Vec<usize> = frame.lit().map(|(position, _)| position).collect();
        assert_eq!(lit, vec![0, 1, 2, 254, 255]);
    }

    #[test]
    fn test_paint_arc_collides_past_half_face() {
        let mut frame = FrameBuffer::new();
        frame.paint_arc(0, 200, Channels::RED);
        assert_eq!(frame.lit().count(), DIVISIONS);
    }

    #[test]
    fn test_clear() {
        let mut frame = FrameBuffer::new();
        frame.paint_arc(42, 3, Channels::ALL_ON);
        assert!(!frame.is_clear());

        frame.clear();
        assert!(frame.is_clear());
    }
}
