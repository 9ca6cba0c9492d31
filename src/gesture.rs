// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::time::{Duration, Instant};

use crate::buttons::{Button, Debouncer, RawLevels};

/// The outcome of classifying one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    None,
    /// Exactly one local button was pressed.
    Single(Button),
    /// Exactly two local buttons are held together.
    Dual,
    /// The remote trigger was pressed.
    Remote,
}

/// Turns raw button readings into gestures, one tick at a time.
pub struct Recognizer {
    buttons: [Debouncer; 4],
}

impl Recognizer {
    pub fn new(debounce: Duration) -> Recognizer {
        Recognizer {
            buttons: std::array::from_fn(|_| Debouncer::new(debounce)),
        }
    }

    /// Feeds one reading of all buttons into their debouncers.
    pub fn sample(&mut self, raw: RawLevels, now: Instant) {
        for button in Button::ALL {
            self.buttons[button.index()].update(raw.get(button), now);
        }
    }

    /// Classifies the current debounced state, consuming whatever edges the
    /// winning gesture uses.
    ///
    /// A dual press wins over everything and clears the local edges. The
    /// remote edge is left alone in that case. Single presses only fire when
    /// exactly one local edge is pending; ambiguous edges are discarded.
    pub fn classify(&mut self) -> Gesture {
        let active = Button::LOCAL
            .iter()
            .filter(|b| self.buttons[b.index()].is_active())
            .count();

        if active == 2 {
            let fresh = Button::LOCAL
                .iter()
                .any(|b| self.buttons[b.index()].is_pressed());
            for button in Button::LOCAL {
                self.buttons[button.index()].clear_pressed();
            }
            // The pair keeps reading as active while held, so only a new edge
            // starts another random play.
            return if fresh { Gesture::Dual } else { Gesture::None };
        }

        let remote = &mut self.buttons[Button::REMOTE.index()];
        if remote.is_active() && remote.take_pressed() {
            return Gesture::Remote;
        }

        let pressed: Vec<Button> = Button::LOCAL
            .into_iter()
            .filter(|b| self.buttons[b.index()].take_pressed())
            .collect();
        match pressed.as_slice() {
            [button] => Gesture::Single(*button),
            _ => Gesture::None,
        }
    }

    /// Samples and classifies in one step.
    pub fn tick(&mut self, raw: RawLevels, now: Instant) -> Gesture {
        self.sample(raw, now);
        self.classify()
    }

    pub fn is_active(&self, button: Button) -> bool {
        self.buttons[button.index()].is_active()
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(50);

    struct Harness {
        recognizer: Recognizer,
        start: Instant,
        t: u64,
    }

    impl Harness {
        fn new() -> Harness {
            Harness {
                recognizer: Recognizer::new(DEBOUNCE),
                start: Instant::now(),
                t: 0,
            }
        }

        /// Holds the given levels for `millis`, ticking every 10ms, and
        /// returns every gesture that wasn't None.
        fn hold(&mut self, raw: RawLevels, millis: u64) -> Vec<Gesture> {
            let mut gestures = Vec::new();
            let end = self.t + millis;
            while self.t < end {
                let now = self.start + Duration::from_millis(self.t);
                match self.recognizer.tick(raw, now) {
                    Gesture::None => {}
                    gesture => gestures.push(gesture),
                }
                self.t += 10;
            }
            gestures
        }
    }

    fn levels(buttons: &[Button]) -> RawLevels {
        buttons
            .iter()
            .fold(RawLevels::default(), |levels, b| levels.with(*b))
    }

    #[test]
    fn test_single_press() {
        let mut harness = Harness::new();
        assert_eq!(
            vec![Gesture::Single(Button::Blue)],
            harness.hold(levels(&[Button::Blue]), 500)
        );
        assert!(harness.hold(RawLevels::default(), 200).is_empty());
    }

    #[test]
    fn test_dual_press_any_order() {
        let mut harness = Harness::new();
        // Green settles first and fires on its own, then yellow joins it.
        assert_eq!(
            vec![Gesture::Single(Button::Green)],
            harness.hold(levels(&[Button::Green]), 100)
        );
        assert_eq!(
            vec![Gesture::Dual],
            harness.hold(levels(&[Button::Green, Button::Yellow]), 300)
        );
        harness.hold(RawLevels::default(), 200);

        // Pressed together from idle.
        assert_eq!(
            vec![Gesture::Dual],
            harness.hold(levels(&[Button::Yellow, Button::Blue]), 300)
        );
    }

    #[test]
    fn test_three_buttons_is_not_dual() {
        let mut harness = Harness::new();
        let gestures = harness.hold(levels(&[Button::Green, Button::Blue, Button::Yellow]), 300);
        assert!(!gestures.contains(&Gesture::Dual));
        assert!(gestures.is_empty());
    }

    #[test]
    fn test_pair_left_from_three_needs_new_press() {
        let mut harness = Harness::new();
        assert!(harness
            .hold(levels(&[Button::Green, Button::Blue, Button::Yellow]), 300)
            .is_empty());

        // Letting go of yellow leaves a held pair with no new edge.
        assert!(harness
            .hold(levels(&[Button::Green, Button::Blue]), 300)
            .is_empty());

        harness.hold(RawLevels::default(), 200);
        assert_eq!(
            vec![Gesture::Dual],
            harness.hold(levels(&[Button::Green, Button::Blue]), 300)
        );
    }

    #[test]
    fn test_remote_trigger() {
        let mut harness = Harness::new();
        assert_eq!(
            vec![Gesture::Remote],
            harness.hold(levels(&[Button::Red]), 300)
        );
    }

    #[test]
    fn test_dual_takes_precedence_over_remote() {
        let mut harness = Harness::new();
        let gestures = harness.hold(levels(&[Button::Red, Button::Green, Button::Blue]), 100);
        assert_eq!(vec![Gesture::Dual], gestures);

        // The remote edge survives the dual press and fires once the pair is released.
        assert_eq!(
            vec![Gesture::Remote],
            harness.hold(levels(&[Button::Red]), 100)
        );
    }

    #[test]
    fn test_noise_produces_nothing() {
        let mut harness = Harness::new();
        let mut gestures = Vec::new();
        for i in 0..40 {
            let raw = if i % 2 == 0 {
                levels(&[Button::Green])
            } else {
                RawLevels::default()
            };
            gestures.extend(harness.hold(raw, 20));
        }
        assert!(gestures.is_empty());
    }
}
