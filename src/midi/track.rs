use log::{debug, warn};

use super::MidiEvent;
use super::event::controllers;

/// The channel a drum track is addressed to in General MIDI.
const DRUM_CHANNEL: u8 = 9;

// RPN/NRPN data-type markers folded into wide controller numbers.
const TYPE_RPN: u32 = 0x20000;
const TYPE_NRPN: u32 = 0x30000;

#[doc = r#"
One track of a MIDI file: events ordered by absolute tick.

The event list behaves as an ordered multimap — events inserted at an
already occupied tick go after the existing ones, so the original file
order within a tick is preserved.

A track read from a file has no output channel until
[`MidiFile::separate_channel`](super::MidiFile::separate_channel) assigns
one; `None` means unset or heterogeneous. Assigning channel 9 marks the
track as a drum track.
"#]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiTrack {
    events: Vec<(u32, MidiEvent)>,
    out_channel: Option<u8>,
    out_port: Option<u8>,
    drum_track: bool,
}

impl MidiTrack {
    /// The (tick, event) pairs in ascending tick order.
    pub fn events(&self) -> &[(u32, MidiEvent)] {
        &self.events
    }

    /// Insert an event at an absolute tick, after any events already at
    /// that tick.
    pub fn insert(&mut self, tick: u32, event: MidiEvent) {
        let idx = self.events.partition_point(|(t, _)| *t <= tick);
        self.events.insert(idx, (tick, event));
    }

    /// The assigned output channel, if any.
    pub fn out_channel(&self) -> Option<u8> {
        self.out_channel
    }

    /// Assign the output channel; channel 9 marks the track as drums.
    pub fn set_out_channel(&mut self, channel: Option<u8>) {
        self.out_channel = channel;
        if channel == Some(DRUM_CHANNEL) {
            self.drum_track = true;
        }
    }

    /// The assigned output port, if any.
    pub fn out_port(&self) -> Option<u8> {
        self.out_port
    }

    /// Assign the output port.
    pub fn set_out_port(&mut self, port: Option<u8>) {
        self.out_port = port;
    }

    /// True if this track addresses a drum channel or a drum part-mode
    /// sysex was seen.
    pub fn drum_track(&self) -> bool {
        self.drum_track
    }

    pub(crate) fn take_events(&mut self) -> Vec<(u32, MidiEvent)> {
        std::mem::take(&mut self.events)
    }

    /// Merge note on/off pairs into duration-bearing [`MidiEvent::Note`]
    /// events and fold bank select and RPN/NRPN controller sequences.
    ///
    /// Each note on is matched against the first following note off (or
    /// velocity-zero note on) with the same pitch and channel; the
    /// duration is the tick delta, clamped to a minimum of one tick.
    /// Malformed input is tolerated: an unmatched note on becomes a note
    /// of duration one with a warning, stray note offs are dropped.
    ///
    /// Bank select bytes are cached and folded into the value of the next
    /// program change; RPN/NRPN parameter numbers are cached and combined
    /// with the following data bytes into a single wide controller. A
    /// Yamaha part-mode sysex sets the drum flag and is discarded.
    ///
    /// The rebuilt event list contains no tombstones.
    pub fn merge_note_on_off(&mut self) {
        let mut merged: Vec<(u32, MidiEvent)> = Vec::with_capacity(self.events.len());

        let mut hbank: u32 = 0xFF;
        let mut lbank: u32 = 0xFF;
        let mut rpn_high: Option<u32> = None;
        let mut rpn_low: Option<u32> = None;
        let mut data_high: u32 = 0;
        let mut data_type: u32 = 0;

        for i in 0..self.events.len() {
            let (tick, ref event) = self.events[i];

            match event.clone() {
                MidiEvent::Invalid => {}

                MidiEvent::Controller {
                    channel,
                    controller,
                    value,
                } => match controller {
                    controllers::HBANK => hbank = value,
                    controllers::LBANK => lbank = value,
                    controllers::HRPN => {
                        rpn_high = Some(value);
                        data_type = TYPE_RPN;
                    }
                    controllers::LRPN => {
                        rpn_low = Some(value);
                        data_type = TYPE_RPN;
                    }
                    controllers::HNRPN => {
                        rpn_high = Some(value);
                        data_type = TYPE_NRPN;
                    }
                    controllers::LNRPN => {
                        rpn_low = Some(value);
                        data_type = TYPE_NRPN;
                    }
                    controllers::HDATA => {
                        data_high = value;

                        // a following data-low makes this a 14-bit value;
                        // defer to it in that case
                        if self.low_data_follows(i) {
                            continue;
                        }

                        match (rpn_high, rpn_low) {
                            (Some(high), Some(low)) => {
                                merged.push((
                                    tick,
                                    MidiEvent::Controller {
                                        channel,
                                        controller: data_type | (high << 8) | low,
                                        value: data_high,
                                    },
                                ));
                            }
                            _ => {
                                warn!("parameter number not defined, data 0x{value:x}");
                            }
                        }
                    }
                    controllers::LDATA => match (rpn_high, rpn_low) {
                        (Some(high), Some(low)) => {
                            merged.push((
                                tick,
                                MidiEvent::Controller {
                                    channel,
                                    // the extra marker distinguishes the
                                    // 14-bit pair from a lone data-high
                                    controller: (data_type + TYPE_NRPN) | (high << 8) | low,
                                    value: (data_high << 7) | value,
                                },
                            ));
                        }
                        _ => {
                            warn!(
                                "parameter number not defined, data 0x{data_high:x} 0x{value:x}, \
                                 tick {tick}, channel {channel}"
                            );
                        }
                    },
                    controllers::PROGRAM => {
                        merged.push((
                            tick,
                            MidiEvent::Controller {
                                channel,
                                controller: controllers::PROGRAM,
                                value: (hbank << 16) | (lbank << 8) | value,
                            },
                        ));
                    }
                    _ => merged.push((tick, event.clone())),
                },

                MidiEvent::SysEx { ref data, len } => {
                    if is_yamaha_part_mode(data, len) {
                        // 0 - normal, 1..=5 - drum modes
                        if data[6] != 0 && data[4] == 0 {
                            self.drum_track = true;
                        }
                    } else {
                        merged.push((tick, event.clone()));
                    }
                }

                MidiEvent::NoteOff { .. } | MidiEvent::NoteOn { velocity: 0, .. } => {
                    debug!("extra note off at {tick}");
                }

                MidiEvent::NoteOn {
                    channel,
                    pitch,
                    velocity,
                } => {
                    let duration = self.close_note(i, tick, channel, pitch);
                    merged.push((
                        tick,
                        MidiEvent::Note {
                            channel,
                            pitch,
                            velocity,
                            duration,
                        },
                    ));
                }

                _ => merged.push((tick, event.clone())),
            }
        }

        self.events = merged;
    }

    /// True if the next controller event after `i` is a data-low entry.
    fn low_data_follows(&self, i: usize) -> bool {
        for (_, event) in &self.events[i + 1..] {
            if let MidiEvent::Controller { controller, .. } = event {
                return *controller == controllers::LDATA;
            }
        }

        false
    }

    /// Find and consume the note off terminating the note on at index
    /// `i`, returning the note duration in ticks (minimum 1).
    fn close_note(&mut self, i: usize, tick: u32, channel: u8, pitch: u8) -> u32 {
        for k in i + 1..self.events.len() {
            let (off_tick, ref event) = self.events[k];

            let matches_off = match *event {
                MidiEvent::NoteOff {
                    channel: c,
                    pitch: p,
                    ..
                } => c == channel && p == pitch,
                MidiEvent::NoteOn {
                    channel: c,
                    pitch: p,
                    velocity: 0,
                } => c == channel && p == pitch,
                _ => false,
            };

            if matches_off {
                self.events[k].1 = MidiEvent::Invalid;
                return (off_tick.saturating_sub(tick)).max(1);
            }
        }

        warn!("no note off for note at {tick}");
        1
    }
}

/// A Yamaha XG "part mode" sysex: 43 1n 4C 08 <part> 07 <mode>.
fn is_yamaha_part_mode(data: &[u8], len: usize) -> bool {
    len == 7
        && data.len() >= 7
        && data[0] == 0x43
        && data[1] & 0xF0 == 0x10
        && data[2] == 0x4C
        && data[3] == 0x08
        && data[5] == 7
}
