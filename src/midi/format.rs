use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The `<format>` word of the header chunk.

The SMF specification defines exactly three values:
- 0: the file contains a single multi-channel track
- 1: the file contains one or more simultaneous tracks of a sequence
- 2: the file contains one or more sequentially independent single-track
  patterns

Any other value has no mapping (`try_from` fails).
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum MidiFileFormat {
    SingleTrack = 0,
    SimultaneousTracks = 1,
    IndependentTracks = 2,
}

impl Default for MidiFileFormat {
    fn default() -> Self {
        Self::SimultaneousTracks
    }
}

#[doc = r#"
The `<division>` word of the header chunk.

```text
                      2 bytes
+-------+---+-------------------+-----------------+
|  bit  |15 | 14              8 | 7             0 |
+-------+---+-------------------------------------+
|       | 0 |       ticks per quarter note        |
| value +---+-------------------------------------+
|       | 1 |  -frames/second   |   ticks/frame   |
+-------+---+-------------------+-----------------+
```

With bit 15 set, the high byte holds the SMPTE frames-per-second as a
two's-complement negative. Decoding and encoding round-trip exactly for
every 16-bit value.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    /// Musical time: ticks per quarter note.
    TicksPerQuarterNote(u16),
    /// SMPTE time: frames per second and ticks per frame.
    TicksPerFrame { frames_per_second: u8, ticks_per_frame: u8 },
}

impl Division {
    /// Decode the 16-bit division field.
    pub fn from_midi_data(division: u16) -> Self {
        if division & 0x8000 != 0 {
            let negative_fps = (division >> 8) as u8;
            return Self::TicksPerFrame {
                frames_per_second: negative_fps.wrapping_neg(),
                ticks_per_frame: division as u8,
            };
        }

        Self::TicksPerQuarterNote(division)
    }

    /// Encode back to the 16-bit division field.
    pub fn to_midi_data(self) -> u16 {
        match self {
            Self::TicksPerQuarterNote(ticks) => ticks,
            Self::TicksPerFrame {
                frames_per_second,
                ticks_per_frame,
            } => (u16::from(frames_per_second.wrapping_neg()) << 8) | u16::from(ticks_per_frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_round_trips_for_defined_values() {
        for raw in 0..=2u16 {
            let format = MidiFileFormat::try_from(raw).unwrap();
            assert_eq!(u16::from(format), raw);
        }
    }

    #[test]
    fn format_rejects_values_above_two() {
        assert!(MidiFileFormat::try_from(3u16).is_err());
        assert!(MidiFileFormat::try_from(u16::MAX).is_err());
    }

    #[test]
    fn division_round_trips_for_all_values() {
        for division in 0..=u16::MAX {
            assert_eq!(
                Division::from_midi_data(division).to_midi_data(),
                division,
                "division 0x{division:04x}"
            );
        }
    }

    #[test]
    fn division_decodes_both_branches() {
        assert_eq!(Division::from_midi_data(480), Division::TicksPerQuarterNote(480));

        // -25 fps, 40 ticks per frame
        let smpte = Division::from_midi_data(0xE728);
        assert_eq!(
            smpte,
            Division::TicksPerFrame {
                frames_per_second: 25,
                ticks_per_frame: 40,
            }
        );
    }
}
