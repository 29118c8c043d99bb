//! 9-bit SPI words over an 8-bit bus
//!
//! Controllers such as the PCF8833 expect every byte to be preceded by a
//! D/C flag bit. Eight such 9-bit words fill exactly nine bytes, so the
//! framer accumulates words and sends them as one 9-byte frame:
//!
//! ```text
//! word:    |C0 d7..d0|C1 d7..d0|C2 ...         ...|C7 d7..d0|
//! byte:    |0       |1       |2       | ... |7       |8       |
//! ```
//!
//! Words are packed MSB-first with no gaps. A partially filled frame is
//! completed by [`NineBitFramer::flush`] with no-op words.

use pixbus_hal::SpiBus;


/// Bytes in one transport frame
pub const FRAME_LEN: usize = 9;

/// 9-bit words carried by one frame
pub const WORDS_PER_FRAME: u8 = 8;

/// Packs (control bit, data byte) pairs into 9-byte frames
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NineBitFramer {
    cursor: u8,
    prev: u8,
    frame: [u8; FRAME_LEN],
}

impl NineBitFramer {
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            prev: 0,
            frame: [0; FRAME_LEN],
        }
    }

    /// Words held in the current, not yet transmitted, frame
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Append one 9-bit word
    ///
    /// The eighth word completes the frame, which is written to `bus` and
    /// the framer starts over. The state is reset even when that write
    /// fails; the failed frame is dropped and the error returned.
    pub fn push<B: SpiBus>(&mut self, bus: &mut B, control: bool, data: u8) -> Result<(), B::Error> {
        let c = self.cursor;

        let mut out = ((data as u16) >> (c + 1)) as u8;
        if c > 0 {
            out |= self.prev << (8 - c);
        }
        let flag = 1 << (7 - c);
        if control {
            out |= flag;
        } else {
            out &= !flag;
        }

        self.frame[c as usize] = out;
        self.prev = data;

        if c + 1 < WORDS_PER_FRAME {
            self.cursor += 1;
            return Ok(());
        }

        self.frame[FRAME_LEN - 1] = data;
        self.cursor = 0;
        self.prev = 0;
        trace!("9-bit frame {:x}", self.frame);
        bus.write(&self.frame)
    }

    /// Complete a partial frame with `(control, noop)` words and send it
    ///
    /// Does nothing if no words are pending.
    pub fn flush<B: SpiBus>(&mut self, bus: &mut B, control: bool, noop: u8) -> Result<(), B::Error> {
        while self.cursor != 0 {
            self.push(bus, control, noop)?;
        }
        Ok(())
    }
}

/// Mirror the bit order of a byte
pub const fn reverse_bits(byte: u8) -> u8 {
    let b = (byte & 0xF0) >> 4 | (byte & 0x0F) << 4;
    let b = (b & 0xCC) >> 2 | (b & 0x33) << 2;
    (b & 0xAA) >> 1 | (b & 0x55) << 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl SpiBus for RecordingBus {
        type Error = ();

        fn write(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, _buf: &mut [u8]) -> Result<(), ()> {
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), ()> {
            self.write(write)
        }
    }

    /// Split a frame back into its eight (control, data) words
    fn decode(frame: &[u8]) -> Vec<(bool, u8)> {
        let bits: u128 = frame.iter().fold(0, |acc, &b| acc << 8 | b as u128);
        (0..8)
            .map(|k| {
                let word = (bits >> (72 - 9 * (k + 1))) & 0x1FF;
                (word & 0x100 != 0, word as u8)
            })
            .collect()
    }

    #[test]
    fn test_eight_words_make_one_frame() {
        let mut bus = RecordingBus::default();
        let mut framer = NineBitFramer::new();
        for i in 0..7u8 {
            framer.push(&mut bus, false, i).unwrap();
            assert!(bus.writes.is_empty());
        }
        framer.push(&mut bus, true, 0xFF).unwrap();

        assert_eq!(bus.writes.len(), 1);
        assert_eq!(bus.writes[0].len(), FRAME_LEN);
        assert_eq!(framer.cursor(), 0);
    }

    #[test]
    fn test_frame_bit_layout() {
        let mut bus = RecordingBus::default();
        let mut framer = NineBitFramer::new();
        framer.push(&mut bus, true, 0xFF).unwrap();
        for _ in 0..7 {
            framer.push(&mut bus, false, 0x00).unwrap();
        }
        // 1 1111_1111 then 63 zero bits
        assert_eq!(bus.writes[0], vec![0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_last_word_lands_in_final_bytes() {
        let mut bus = RecordingBus::default();
        let mut framer = NineBitFramer::new();
        for _ in 0..7 {
            framer.push(&mut bus, false, 0x00).unwrap();
        }
        framer.push(&mut bus, true, 0xA5).unwrap();
        assert_eq!(bus.writes[0], vec![0, 0, 0, 0, 0, 0, 0, 0x01, 0xA5]);
    }

    #[test]
    fn test_flush_without_pending_words_is_silent() {
        let mut bus = RecordingBus::default();
        let mut framer = NineBitFramer::new();
        framer.flush(&mut bus, false, 0x00).unwrap();
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn test_transport_failure_resets_state() {
        let mut bus = RecordingBus {
            fail: true,
            ..Default::default()
        };
        let mut framer = NineBitFramer::new();
        for i in 0..7u8 {
            framer.push(&mut bus, true, i).unwrap();
        }
        assert_eq!(framer.push(&mut bus, true, 7), Err(()));
        assert_eq!(framer.cursor(), 0);

        bus.fail = false;
        framer.push(&mut bus, false, 0x42).unwrap();
        framer.flush(&mut bus, false, 0x00).unwrap();
        assert_eq!(decode(&bus.writes[0])[0], (false, 0x42));
    }

    #[test]
    fn test_flush_failure_propagates() {
        let mut bus = RecordingBus {
            fail: true,
            ..Default::default()
        };
        let mut framer = NineBitFramer::new();
        framer.push(&mut bus, true, 0x2A).unwrap();
        assert_eq!(framer.flush(&mut bus, false, 0x00), Err(()));
        assert_eq!(framer.cursor(), 0);
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b1011_0000), 0b0000_1101);
        assert_eq!(reverse_bits(0x01), 0x80);
        assert_eq!(reverse_bits(0xFF), 0xFF);
        assert_eq!(reverse_bits(0x00), 0x00);
    }

    proptest! {
        #[test]
        fn test_full_frame_round_trip(words in proptest::collection::vec(any::<(bool, u8)>(), 8)) {
            let mut bus = RecordingBus::default();
            let mut framer = NineBitFramer::new();
            for &(control, data) in &words {
                framer.push(&mut bus, control, data).unwrap();
            }
            prop_assert_eq!(bus.writes.len(), 1);
            prop_assert_eq!(decode(&bus.writes[0]), words);
        }

        #[test]
        fn test_partial_frame_flush_pads_with_noop(
            words in proptest::collection::vec(any::<(bool, u8)>(), 1..8),
            noop_control in any::<bool>(),
            noop in any::<u8>(),
        ) {
            let mut bus = RecordingBus::default();
            let mut framer = NineBitFramer::new();
            for &(control, data) in &words {
                framer.push(&mut bus, control, data).unwrap();
            }
            prop_assert!(bus.writes.is_empty());
            framer.flush(&mut bus, noop_control, noop).unwrap();

            prop_assert_eq!(bus.writes.len(), 1);
            let decoded = decode(&bus.writes[0]);
            prop_assert_eq!(&decoded[..words.len()], &words[..]);
            for &word in &decoded[words.len()..] {
                prop_assert_eq!(word, (noop_control, noop));
            }
        }

        #[test]
        fn test_reverse_bits_involution(byte in any::<u8>()) {
            prop_assert_eq!(reverse_bits(reverse_bits(byte)), byte);
            prop_assert_eq!(reverse_bits(byte), byte.reverse_bits());
        }
    }
}
