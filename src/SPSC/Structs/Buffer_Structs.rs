// This is the per-slot control tag of the bounded lockfree SPSC ring

// no atomics in Signal; keep as a plain integral type for ABI

/// In-band control tag co-transmitted with every payload slot.
/// ABI-stable across processes; occupies exactly one byte in the signal band.
/// Tag `0` always means "no signal".
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Signal {
    /// Plain data, no framing attached.
    #[default]
    None = 0,
    /// End of stream. Piggybacked on the final enqueue of a transfer; a push
    /// carrying it latches the ring's `write_finished` flag permanently.
    Eof = 1,
}

impl Signal {
    /// Decode a raw signal byte read from the signal band.
    ///
    /// Unknown tags decode as [`Signal::None`]; only tag values this side
    /// understands carry meaning.
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Signal::Eof,
            _ => Signal::None,
        }
    }

    /// The wire byte for this tag.
    #[inline]
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}
