//! Pure countdown and impact logic with no platform dependencies.
//! Testable on host, driven by the crashguard runtime.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Escalated,
}

/// Which control armed the countdown. Each path has its own window.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArmSource {
    Manual,
    Motion,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Windows {
    /// Window used when the countdown is started by hand.
    pub manual_secs: u32,
    /// Window used by the motion path, and the value `remaining` rests at
    /// whenever the countdown goes back to idle.
    pub rearm_secs: u32,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            manual_secs: 60,
            rearm_secs: 15,
        }
    }
}

impl Windows {
    pub fn for_source(&self, source: ArmSource) -> u32 {
        match source {
            ArmSource::Manual => self.manual_secs,
            ArmSource::Motion => self.rearm_secs,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CountdownState {
    pub phase: Phase,
    pub remaining: u32,
}

impl CountdownState {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Text shown to the user while the countdown runs.
    pub fn prompt(&self) -> Option<String> {
        match self.phase {
            Phase::Running => Some(format!("Respond within {} seconds", self.remaining)),
            _ => None,
        }
    }
}

/// What a single operation did to the state machine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    Unchanged,
    Armed { remaining: u32 },
    Ticked { remaining: u32 },
    Escalated,
    Cancelled,
    Reset,
}

pub struct CountdownCore {
    state: CountdownState,
    windows: Windows,
    episode: u64,
}

impl CountdownCore {
    pub fn new(windows: Windows) -> Self {
        Self {
            state: CountdownState {
                phase: Phase::Idle,
                remaining: windows.rearm_secs,
            },
            windows,
            episode: 0,
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn windows(&self) -> Windows {
        self.windows
    }

    /// Number of Running episodes started so far. Lets a tick source tell
    /// whether it still belongs to the current episode.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn arm(&mut self, source: ArmSource) -> Transition {
        if self.state.phase == Phase::Running {
            return Transition::Unchanged;
        }
        let remaining = self.windows.for_source(source);
        self.state = CountdownState {
            phase: Phase::Running,
            remaining,
        };
        self.episode += 1;
        Transition::Armed { remaining }
    }

    pub fn tick(&mut self) -> Transition {
        if self.state.phase != Phase::Running {
            return Transition::Unchanged;
        }
        if self.state.remaining == 0 {
            self.state.phase = Phase::Escalated;
            return Transition::Escalated;
        }
        self.state.remaining -= 1;
        Transition::Ticked {
            remaining: self.state.remaining,
        }
    }

    pub fn cancel(&mut self) -> Transition {
        match self.state.phase {
            Phase::Running | Phase::Escalated => {
                self.go_idle();
                Transition::Cancelled
            }
            Phase::Idle => Transition::Unchanged,
        }
    }

    /// Completes an escalation by returning to idle.
    pub fn reset(&mut self) -> Transition {
        if self.state.phase != Phase::Escalated {
            return Transition::Unchanged;
        }
        self.go_idle();
        Transition::Reset
    }

    pub fn manual_toggle(&mut self) -> Transition {
        if self.state.phase == Phase::Running {
            self.cancel()
        } else {
            self.arm(ArmSource::Manual)
        }
    }

    fn go_idle(&mut self) {
        self.state = CountdownState {
            phase: Phase::Idle,
            remaining: self.windows.rearm_secs,
        };
    }
}

/// Largest absolute value over the three axes.
pub fn peak_axis(x: f64, y: f64, z: f64) -> f64 {
    x.abs().max(y.abs()).max(z.abs())
}

/// True when any axis lies strictly outside `[-threshold, threshold]`.
pub fn exceeds_threshold(x: f64, y: f64, z: f64, threshold: f64) -> bool {
    x.abs() > threshold || y.abs() > threshold || z.abs() > threshold
}

/// Format seconds as "MM:SS"
pub fn format_remaining(secs: u32) -> String {
    let m = secs / 60;
    let s = secs % 60;
    format!("{:02}:{:02}", m, s)
}
