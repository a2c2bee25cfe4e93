//! Canned rhythm patterns and the agent briefing text.
//!
//! Pure catalog: lookups never touch the liveness probe or the control
//! channel, so patterns stay available while Sonic Pi is down. The
//! script bodies are opaque payloads served verbatim.

/// Style keys and script bodies, in catalog order.
const PATTERNS: &[(&str, &str)] = &[
    ("blues", BLUES),
    ("rock", ROCK),
    ("hiphop", HIPHOP),
    ("electronic", ELECTRONIC),
    ("jazz", JAZZ),
    ("funk", FUNK),
];

/// Look up a pattern by style name, case-insensitively.
///
/// Hit: the script body verbatim. Miss: a message naming the requested
/// style and every valid key, so the caller can self-correct.
pub fn get_pattern(style: &str) -> String {
    let key = style.trim().to_lowercase();
    for (name, body) in PATTERNS {
        if *name == key {
            return (*body).to_string();
        }
    }
    format!(
        "Style '{}' not found. Available styles: {}",
        style,
        style_names().join(", ")
    )
}

/// All style keys, in catalog order.
pub fn style_names() -> Vec<&'static str> {
    PATTERNS.iter().map(|(name, _)| *name).collect()
}

const BLUES: &str = r##"use_bpm 84

# 12-bar shuffle in E
chords = (ring chord(:e3, :dom7), chord(:e3, :dom7), chord(:e3, :dom7), chord(:e3, :dom7),
          chord(:a3, :dom7), chord(:a3, :dom7), chord(:e3, :dom7), chord(:e3, :dom7),
          chord(:b3, :dom7), chord(:a3, :dom7), chord(:e3, :dom7), chord(:b3, :dom7))

live_loop :shuffle do
  sample :drum_heavy_kick
  sleep 0.66
  sample :drum_cymbal_closed, amp: 0.6
  sleep 0.34
  sample :drum_snare_soft
  sleep 0.66
  sample :drum_cymbal_closed, amp: 0.6
  sleep 0.34
end

live_loop :comping, sync: :shuffle do
  use_synth :fm
  bar = chords.tick
  play bar, release: 0.3, amp: 0.7
  sleep 1
  play bar, release: 0.3, amp: 0.5
  sleep 1
  play bar, release: 0.3, amp: 0.7
  sleep 1
  play bar, release: 0.3, amp: 0.5
  sleep 1
end
"##;

const ROCK: &str = r##"use_bpm 120

live_loop :drums do
  sample :drum_heavy_kick
  sample :drum_cymbal_closed
  sleep 0.5
  sample :drum_cymbal_closed
  sleep 0.5
  sample :drum_snare_hard
  sample :drum_cymbal_closed
  sleep 0.5
  sample :drum_cymbal_closed
  sleep 0.5
end

live_loop :riff, sync: :drums do
  use_synth :dsaw
  use_synth_defaults release: 0.4, cutoff: 100, amp: 0.8
  riff = (ring :e2, :e2, :g2, :e2, :a2, :g2, :e2, :d2)
  play riff.tick
  sleep 0.5
end
"##;

const HIPHOP: &str = r##"use_bpm 90

live_loop :boom_bap do
  sample :bd_tek, amp: 2
  sleep 1
  sample :sn_dub
  sleep 0.75
  sample :bd_tek, amp: 1.5
  sleep 0.75
  sample :bd_tek, amp: 1.5
  sleep 0.5
  sample :sn_dub
  sleep 1
end

live_loop :hats, sync: :boom_bap do
  use_random_seed 667
  8.times do
    sample :drum_cymbal_closed, amp: rrand(0.3, 0.7)
    sleep 0.5
  end
end

live_loop :sub, sync: :boom_bap do
  use_synth :fm
  play :e1, release: 0.8, amp: 1.2
  sleep 2
  play :g1, release: 0.8, amp: 1.2
  sleep 2
end
"##;

const ELECTRONIC: &str = r##"use_bpm 128

live_loop :four_on_floor do
  sample :bd_haus, amp: 1.5
  sleep 1
end

live_loop :offbeat_hats, sync: :four_on_floor do
  sleep 0.5
  sample :drum_cymbal_open, amp: 0.4, finish: 0.2
  sleep 0.5
end

live_loop :acid, sync: :four_on_floor do
  use_synth :tb303
  use_synth_defaults release: 0.2, cutoff: rrand(70, 120), res: 0.9
  notes = (ring :e2, :e2, :e3, :e2, :g2, :e2, :b2, :e3)
  play notes.tick
  sleep 0.25
end
"##;

const JAZZ: &str = r##"use_bpm 140

live_loop :swing_ride do
  sample :drum_cymbal_soft, amp: 0.8
  sleep 0.66
  sample :drum_cymbal_soft, amp: 0.5
  sleep 0.34
end

live_loop :walking_bass, sync: :swing_ride do
  use_synth :fm
  use_synth_defaults release: 0.6, amp: 0.9
  walk = (ring :d2, :f2, :a2, :c3, :b2, :g2, :e2, :a2)
  play walk.tick
  sleep 1
end

live_loop :comp, sync: :swing_ride do
  use_synth :piano
  play chord(:d4, :m7), amp: 0.5, release: 0.8
  sleep 2
  play chord(:g4, :dom7), amp: 0.5, release: 0.8
  sleep 2
end
"##;

const FUNK: &str = r##"use_bpm 104

live_loop :funk_drums do
  sample :drum_heavy_kick
  sleep 0.5
  sample :drum_cymbal_closed, amp: 0.5
  sleep 0.25
  sample :drum_heavy_kick
  sleep 0.25
  sample :drum_snare_hard
  sleep 0.5
  sample :drum_cymbal_closed, amp: 0.5
  sleep 0.25
  sample :drum_heavy_kick
  sleep 0.25
end

live_loop :slap_bass, sync: :funk_drums do
  use_synth :fm
  use_synth_defaults divisor: 1, depth: 2, release: 0.2, amp: 1.1
  pattern = (ring :e2, nil, :e2, :g2, nil, :e3, nil, :d3)
  n = pattern.tick
  play n if n
  sleep 0.25
end
"##;

/// Static briefing returned by a successful `initialize`.
///
/// Primes the calling agent with the Sonic Pi vocabulary it needs to
/// write sensible code: chords, scales, loop conventions, tempo ranges.
pub const BRIEFING: &str = r##"The Sonic Pi link is ready. A quick briefing before you write code:

Structure
- Wrap every repeating part in a named `live_loop`; loops run in
  parallel. Use `sync:` to phase-align a loop with another one, e.g.
  `live_loop :bass, sync: :drums do ... end`.
- Set tempo once with `use_bpm` (hiphop 85-95, house/techno 120-130,
  rock 110-140, jazz swing 130-180).
- Total time slept inside a loop should equal a whole number of beats,
  or the parts drift apart.

Notes and chords
- Notes are symbols with octaves: `:e2`, `:c4`, `:fs3` (fs = F sharp,
  eb = E flat). `play 60` also works (MIDI numbering, 60 = C4).
- Chords: `chord(:c4, :major)`, `chord(:a3, :minor)`,
  `chord(:e3, :dom7)`, `chord(:d4, :m7)`, `chord(:g3, :sus4)`.
  `play` accepts a whole chord; `play_pattern_timed` arpeggiates it.
- Scales for melodies: `scale(:e3, :minor_pentatonic)`,
  `scale(:c4, :major)`, `scale(:d3, :dorian)`. `.choose` picks random
  notes, `.tick` walks the ring in order.

Sound
- Pick an instrument with `use_synth`: `:tb303` (acid), `:fm` (bass,
  keys), `:dsaw` (rough lead), `:prophet` (warm pad), `:piano`.
- Shape notes with `attack:`, `release:`, `cutoff:` (20-130), `amp:`.
- Drums are samples: `:bd_haus`, `:bd_tek`, `:drum_heavy_kick`,
  `:drum_snare_hard`, `:sn_dub`, `:drum_cymbal_closed`,
  `:drum_cymbal_open`.
- Wrap parts in effects: `with_fx :reverb do ... end`, also `:echo`,
  `:distortion`, `:slicer`.

Listening for cues
- Code submitted here replaces what was playing (a stop is issued
  first). After each submission a cue is sent that loops can wait on:
  `sync "/osc*/trigger/prophet"`.
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let lower = get_pattern("blues");
        assert_eq!(get_pattern("BLUES"), lower);
        assert_eq!(get_pattern("Blues"), lower);
    }

    #[test]
    fn test_hit_returns_body_verbatim() {
        assert_eq!(get_pattern("electronic"), ELECTRONIC);
    }

    #[test]
    fn test_miss_names_style_and_all_keys() {
        let msg = get_pattern("waltz");
        assert!(msg.contains("waltz"));
        for name in style_names() {
            assert!(msg.contains(name), "missing style {} in: {}", name, msg);
        }
    }

    #[test]
    fn test_all_entries_are_runnable_loops() {
        for (name, body) in PATTERNS {
            assert!(!body.is_empty(), "empty body for {}", name);
            assert!(body.contains("live_loop"), "{} has no live_loop", name);
            assert!(body.contains("use_bpm"), "{} sets no tempo", name);
        }
    }

    #[test]
    fn test_briefing_covers_chord_vocabulary() {
        assert!(BRIEFING.contains("chord("));
        assert!(BRIEFING.contains("live_loop"));
        assert!(BRIEFING.contains("use_bpm"));
    }
}
