//! Logical input mapping and key state tracking.
//!
//! Device backends (keyboard, gamepad) are behind the `InputSource` trait;
//! the rest of the system only ever sees logical `Action`s and the
//! held / just-pressed queries. A bounded ring buffer keeps the recent
//! action history for combo detection and debugging.

#![cfg_attr(not(feature = "std"), no_std)]

use heapless::HistoryBuffer;

/// Snapshots kept in the input history ring buffer.
pub const MAX_INPUT_HISTORY: usize = 128;

/// Logical input actions, independent of the physical device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Select,
    Start,
    Edit,
    Function,
    NavLeft,
    NavRight,
}

impl Action {
    pub const COUNT: usize = 10;

    pub const ALL: [Action; Self::COUNT] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Select,
        Action::Start,
        Action::Edit,
        Action::Function,
        Action::NavLeft,
        Action::NavRight,
    ];

    /// Short label for on-screen display.
    pub const fn label(self) -> &'static str {
        match self {
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Select => "SELECT",
            Action::Start => "START",
            Action::Edit => "EDIT",
            Action::Function => "FUNC",
            Action::NavLeft => "SCN<",
            Action::NavRight => "SCN>",
        }
    }
}

/// Which device backend an `InputState` polls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceKind {
    #[default]
    Keyboard,
    Gamepad,
}

impl DeviceKind {
    /// Physical scan code for an action on this device.
    pub const fn code(self, action: Action) -> u16 {
        let map = match self {
            DeviceKind::Keyboard => &KEYBOARD_MAP,
            DeviceKind::Gamepad => &GAMEPAD_MAP,
        };
        map[action as usize]
    }
}

/// Keyboard scan codes per action: arrows, left shift, enter, Z, X, Q, W.
const KEYBOARD_MAP: [u16; Action::COUNT] = [263, 262, 265, 264, 340, 257, 90, 88, 81, 87];

/// Gamepad button ids per action: dpad, middle buttons, face buttons,
/// shoulder triggers.
const GAMEPAD_MAP: [u16; Action::COUNT] = [4, 2, 1, 3, 13, 15, 7, 8, 9, 11];

/// A device backend: reports whether the physical control mapped to a
/// code is currently down.
pub trait InputSource {
    fn is_down(&self, code: u16) -> bool;
}

/// Current and previous pressed state of one action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub pressed: bool,
    pub was_pressed: bool,
}

/// All input state: per-action key states, the active device and the
/// recent action history.
pub struct InputState {
    keys: [KeyState; Action::COUNT],
    device: DeviceKind,
    history: HistoryBuffer<Action, MAX_INPUT_HISTORY>,
}

impl InputState {
    pub fn new(device: DeviceKind) -> Self {
        Self {
            keys: [KeyState::default(); Action::COUNT],
            device,
            history: HistoryBuffer::new(),
        }
    }

    pub fn device(&self) -> DeviceKind {
        self.device
    }

    /// Poll the backend once per frame. Edge states are derived from the
    /// previous poll; presses are appended to the history buffer.
    pub fn update(&mut self, source: &impl InputSource) {
        for action in Action::ALL {
            let code = self.device.code(action);
            let key = &mut self.keys[action as usize];
            key.was_pressed = key.pressed;
            key.pressed = source.is_down(code);
            if key.pressed && !key.was_pressed {
                self.history.write(action);
            }
        }
    }

    /// Whether the action is currently down.
    pub fn held(&self, action: Action) -> bool {
        self.keys[action as usize].pressed
    }

    /// Whether the action went down since the previous update.
    pub fn just_pressed(&self, action: Action) -> bool {
        let key = self.keys[action as usize];
        key.pressed && !key.was_pressed
    }

    /// Most recent presses, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Action> {
        self.history.oldest_ordered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource {
        down: [bool; Action::COUNT],
    }

    impl FakeSource {
        fn new() -> Self {
            Self { down: [false; Action::COUNT] }
        }

        fn press(&mut self, action: Action) {
            self.down[action as usize] = true;
        }

        fn release(&mut self, action: Action) {
            self.down[action as usize] = false;
        }
    }

    impl InputSource for FakeSource {
        fn is_down(&self, code: u16) -> bool {
            Action::ALL
                .iter()
                .position(|a| DeviceKind::Keyboard.code(*a) == code)
                .map(|i| self.down[i])
                .unwrap_or(false)
        }
    }

    #[test]
    fn just_pressed_fires_once() {
        let mut source = FakeSource::new();
        let mut input = InputState::new(DeviceKind::Keyboard);
        source.press(Action::Start);
        input.update(&source);
        assert!(input.just_pressed(Action::Start));
        assert!(input.held(Action::Start));
        input.update(&source);
        assert!(!input.just_pressed(Action::Start));
        assert!(input.held(Action::Start));
    }

    #[test]
    fn release_clears_held() {
        let mut source = FakeSource::new();
        let mut input = InputState::new(DeviceKind::Keyboard);
        source.press(Action::Edit);
        input.update(&source);
        source.release(Action::Edit);
        input.update(&source);
        assert!(!input.held(Action::Edit));
        assert!(!input.just_pressed(Action::Edit));
    }

    #[test]
    fn history_records_presses_in_order() {
        let mut source = FakeSource::new();
        let mut input = InputState::new(DeviceKind::Keyboard);
        for action in [Action::Up, Action::Up, Action::Down, Action::Select] {
            source.press(action);
            input.update(&source);
            source.release(action);
            input.update(&source);
        }
        let history: Vec<_> = input.history().copied().collect();
        assert_eq!(history, [Action::Up, Action::Up, Action::Down, Action::Select]);
    }

    #[test]
    fn history_is_bounded() {
        let mut source = FakeSource::new();
        let mut input = InputState::new(DeviceKind::Keyboard);
        for _ in 0..(MAX_INPUT_HISTORY + 10) {
            source.press(Action::Left);
            input.update(&source);
            source.release(Action::Left);
            input.update(&source);
        }
        assert_eq!(input.history().count(), MAX_INPUT_HISTORY);
    }

    #[test]
    fn device_maps_differ() {
        assert_ne!(
            DeviceKind::Keyboard.code(Action::Select),
            DeviceKind::Gamepad.code(Action::Select)
        );
    }
}
