//! Rig state types and transition table
//!
//! Pure types for the top-level test state machine. The transition table
//! is a standalone function over `(state, selection, event)` so every
//! edge is testable without driving the whole control loop.

use crate::button::ButtonEvent;

/// Top-level rig state. Exactly one value is live at a time, owned by
/// the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RigState {
    /// Splash screen shown once at startup, left automatically
    #[default]
    Welcome,
    /// Two-item menu awaiting selection and commit
    Menu,
    /// Knob-driven test, one reading per tick
    ManualTest,
    /// Automated ramp sweep; terminal once completed
    AlgorithmTest,
}

/// The menu's two test modes.
///
/// Meaningful only from Menu onwards; never read while the rig shows the
/// welcome screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuSelection {
    /// Option 1: knob-driven manual test
    #[default]
    ManualTest,
    /// Option 2: automated ramp test
    AlgorithmTest,
}

impl MenuSelection {
    /// The other option; a short press in Menu cycles between the two.
    pub fn toggled(self) -> Self {
        match self {
            MenuSelection::ManualTest => MenuSelection::AlgorithmTest,
            MenuSelection::AlgorithmTest => MenuSelection::ManualTest,
        }
    }

    /// Operator-facing option number (1 or 2).
    pub fn option_number(self) -> u8 {
        match self {
            MenuSelection::ManualTest => 1,
            MenuSelection::AlgorithmTest => 2,
        }
    }
}

/// Input to the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigEvent {
    /// Classified button event for this tick
    Button(ButtonEvent),
    /// Welcome display interval elapsed
    WelcomeElapsed,
    /// A running sweep stopped on a long press
    SweepAborted,
    /// A running sweep finished both phases
    SweepCompleted,
}

/// Side effect the state machine performs alongside a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigAction {
    /// No effect this tick
    None,
    /// Render the menu for the first time
    ShowMenu,
    /// Flip the menu selection and re-render
    ToggleSelection,
    /// Set up and start the manual test
    EnterManualTest,
    /// Set up and run the ramp sweep
    EnterAlgorithmTest,
    /// Park the ESC at idle and return to the menu
    ExitManualTest,
    /// Return to the menu after an aborted sweep (ESC already parked)
    ExitAbortedSweep,
    /// Show the payload report and latch the terminal state
    ShowReport,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: RigState,
    pub action: RigAction,
}

const fn stay(state: RigState) -> Transition {
    Transition {
        next: state,
        action: RigAction::None,
    }
}

/// The rig's transition table.
///
/// Any `(state, event)` pair without a row is a self-loop with no
/// action. There is deliberately no edge from Welcome into a test mode
/// or from Menu back to Welcome, and the completed sweep is terminal.
pub fn transition(state: RigState, selection: MenuSelection, event: RigEvent) -> Transition {
    match (state, event) {
        (RigState::Welcome, RigEvent::WelcomeElapsed) => Transition {
            next: RigState::Menu,
            action: RigAction::ShowMenu,
        },
        (RigState::Menu, RigEvent::Button(ButtonEvent::ShortPress)) => Transition {
            next: RigState::Menu,
            action: RigAction::ToggleSelection,
        },
        (RigState::Menu, RigEvent::Button(ButtonEvent::LongPress)) => match selection {
            MenuSelection::ManualTest => Transition {
                next: RigState::ManualTest,
                action: RigAction::EnterManualTest,
            },
            MenuSelection::AlgorithmTest => Transition {
                next: RigState::AlgorithmTest,
                action: RigAction::EnterAlgorithmTest,
            },
        },
        (RigState::ManualTest, RigEvent::Button(ButtonEvent::LongPress)) => Transition {
            next: RigState::Menu,
            action: RigAction::ExitManualTest,
        },
        (RigState::AlgorithmTest, RigEvent::SweepAborted) => Transition {
            next: RigState::Menu,
            action: RigAction::ExitAbortedSweep,
        },
        (RigState::AlgorithmTest, RigEvent::SweepCompleted) => Transition {
            next: RigState::AlgorithmTest,
            action: RigAction::ShowReport,
        },
        _ => stay(state),
    }
}
