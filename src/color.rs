bitflags::bitflags! {
    /// Color channels of a single display position.
    ///
    /// The bit layout is what the display firmware expects on the wire.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        const RED = 0x08;
        const GREEN = 0x10;
        const BLUE = 0x20;
    }
}

impl Channels {
    /// Substituted for unlit positions when a frame goes out.
    pub const ALL_ON: Channels = Channels::all();
}
