use log::{debug, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Default values shared between the settings model and the UI.
pub mod defaults {
    pub const HOLD_TIME_MS: u32 = 300;
    pub const INSPECTION_ENABLED: bool = true;
    pub const HIDE_UI_WHEN_TIMING: bool = false;
}

/// Penalty added to a solve by the +2 rule, in milliseconds.
pub const PLUS_TWO_MS: f64 = 2000.0;

/// WCA inspection window in seconds; overrunning it costs +2, and
/// overrunning [`INSPECTION_DNF_SECS`] invalidates the solve.
pub const INSPECTION_SECONDS: f64 = 15.0;
pub const INSPECTION_DNF_SECS: f64 = 17.0;

/// Window sizes for the rolling trimmed averages.
pub const AO5_WINDOW: usize = 5;
pub const AO12_WINDOW: usize = 12;

// ============================================
// Moves and puzzles
// ============================================

/// Rotation axis of a face. Opposite faces share an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A turnable face or wide layer, in WCA notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    R,
    L,
    U,
    D,
    F,
    B,
    Rw,
    Lw,
    Uw,
    Dw,
    Fw,
    Bw,
}

impl Face {
    pub const fn opposite(self) -> Face {
        match self {
            Face::R => Face::L,
            Face::L => Face::R,
            Face::U => Face::D,
            Face::D => Face::U,
            Face::F => Face::B,
            Face::B => Face::F,
            Face::Rw => Face::Lw,
            Face::Lw => Face::Rw,
            Face::Uw => Face::Dw,
            Face::Dw => Face::Uw,
            Face::Fw => Face::Bw,
            Face::Bw => Face::Fw,
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            Face::R | Face::L | Face::Rw | Face::Lw => Axis::X,
            Face::U | Face::D | Face::Uw | Face::Dw => Axis::Y,
            Face::F | Face::B | Face::Fw | Face::Bw => Axis::Z,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Face::R => "R",
            Face::L => "L",
            Face::U => "U",
            Face::D => "D",
            Face::F => "F",
            Face::B => "B",
            Face::Rw => "Rw",
            Face::Lw => "Lw",
            Face::Uw => "Uw",
            Face::Dw => "Dw",
            Face::Fw => "Fw",
            Face::Bw => "Bw",
        }
    }

    /// A draw is redundant when it repeats the previous face outright, or
    /// turns its opposite on the same axis (rotationally equivalent to a
    /// single combined move).
    fn redundant_after(self, prev: Face) -> bool {
        self == prev || (self.opposite() == prev && self.axis() == prev.axis())
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Direction suffix of a move token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Clockwise quarter turn, no suffix.
    Plain,
    /// Counter-clockwise quarter turn, `'`.
    Prime,
    /// Half turn, `2`.
    Double,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Modifier::Plain => "",
            Modifier::Prime => "'",
            Modifier::Double => "2",
        })
    }
}

const MODIFIERS: [Modifier; 3] = [Modifier::Plain, Modifier::Prime, Modifier::Double];

const SMALL_CUBE_FACES: [Face; 3] = [Face::R, Face::U, Face::F];

const OUTER_FACES: [Face; 6] = [Face::R, Face::L, Face::U, Face::D, Face::F, Face::B];

const WIDE_FACES: [Face; 12] = [
    Face::R,
    Face::L,
    Face::U,
    Face::D,
    Face::F,
    Face::B,
    Face::Rw,
    Face::Lw,
    Face::Uw,
    Face::Dw,
    Face::Fw,
    Face::Bw,
];

/// Supported puzzle categories. Stored and displayed with the legacy
/// three-digit codes ("333" etc.) for compatibility with saved sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Puzzle {
    Cube2,
    #[default]
    Cube3,
    Cube4,
    Cube5,
}

impl Puzzle {
    pub const ALL: [Puzzle; 4] = [Puzzle::Cube2, Puzzle::Cube3, Puzzle::Cube4, Puzzle::Cube5];

    /// Parse a stored puzzle code. Unrecognized codes degrade to the
    /// default 3x3 category rather than failing.
    pub fn from_code(code: &str) -> Puzzle {
        match code {
            "222" => Puzzle::Cube2,
            "333" => Puzzle::Cube3,
            "444" => Puzzle::Cube4,
            "555" => Puzzle::Cube5,
            other => {
                warn!("unknown puzzle code {other:?}, using 3x3");
                Puzzle::default()
            }
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Puzzle::Cube2 => "222",
            Puzzle::Cube3 => "333",
            Puzzle::Cube4 => "444",
            Puzzle::Cube5 => "555",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Puzzle::Cube2 => "2x2",
            Puzzle::Cube3 => "3x3",
            Puzzle::Cube4 => "4x4",
            Puzzle::Cube5 => "5x5",
        }
    }

    /// Faces that may appear in a scramble for this category.
    pub const fn move_set(self) -> &'static [Face] {
        match self {
            Puzzle::Cube2 => &SMALL_CUBE_FACES,
            Puzzle::Cube3 => &OUTER_FACES,
            Puzzle::Cube4 | Puzzle::Cube5 => &WIDE_FACES,
        }
    }

    /// Number of moves in a scramble for this category.
    pub const fn scramble_length(self) -> usize {
        match self {
            Puzzle::Cube2 => 9,
            Puzzle::Cube3 => 20,
            Puzzle::Cube4 => 40,
            Puzzle::Cube5 => 60,
        }
    }
}

impl Serialize for Puzzle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Puzzle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Puzzle::from_code(&code))
    }
}

// ============================================
// Scramble generation
// ============================================

/// Cap on face draws per position. With a three-face move set the
/// adjacency constraint cannot always be satisfied, so after this many
/// draws the last candidate is accepted as-is to guarantee termination.
const MAX_DRAW_ATTEMPTS: usize = 20;

/// Generate a scramble for `puzzle` using the global RNG.
pub fn generate_scramble(puzzle: Puzzle) -> String {
    generate_scramble_with(puzzle, &mut rand::rng())
}

/// Generate a scramble for `puzzle`, drawing all randomness from `rng`.
///
/// Emits `puzzle.scramble_length()` move tokens joined by single spaces.
/// Each face is drawn uniformly from the category's move set and redrawn
/// (up to a bounded number of attempts) while it would repeat the
/// previous face or turn its same-axis opposite. The direction modifier
/// is drawn independently and does not participate in the constraint;
/// only the accepted face carries over as "previous".
pub fn generate_scramble_with<R: Rng + ?Sized>(puzzle: Puzzle, rng: &mut R) -> String {
    let faces = puzzle.move_set();
    let length = puzzle.scramble_length();

    let mut tokens: Vec<String> = Vec::with_capacity(length);
    let mut last: Option<Face> = None;

    for _ in 0..length {
        let mut face = *faces.choose(rng).expect("move sets are non-empty");
        let mut attempts = 1;
        while attempts < MAX_DRAW_ATTEMPTS && last.is_some_and(|prev| face.redundant_after(prev)) {
            face = *faces.choose(rng).expect("move sets are non-empty");
            attempts += 1;
        }
        if attempts == MAX_DRAW_ATTEMPTS {
            debug!("draw cap reached for {}, accepting {face}", puzzle.code());
        }

        let modifier = *MODIFIERS.choose(rng).expect("modifier table is non-empty");
        tokens.push(format!("{face}{modifier}"));
        last = Some(face);
    }

    tokens.join(" ")
}

// ============================================
// Solves and penalties
// ============================================

/// Penalty attached to a recorded solve. A clean solve carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    Plus2,
    Dnf,
}

/// One recorded solve. Field names and value shapes match the JSON the
/// app has always written to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub id: u64,
    /// Raw elapsed time in milliseconds, before penalties.
    pub time: f64,
    #[serde(default)]
    pub penalty: Option<Penalty>,
    pub scramble: String,
    pub puzzle: Puzzle,
    /// ISO-8601 timestamp of when the solve was recorded.
    pub date: String,
}

impl Solve {
    /// The time a solve counts for: raw if clean, raw + 2000 ms under a
    /// +2, and [`EffectiveTime::Dnf`] for an invalidated solve. Derived
    /// on every call, never stored.
    pub fn effective_time(&self) -> EffectiveTime {
        match self.penalty {
            Some(Penalty::Dnf) => EffectiveTime::Dnf,
            Some(Penalty::Plus2) => EffectiveTime::Finite(self.time + PLUS_TWO_MS),
            None => EffectiveTime::Finite(self.time),
        }
    }
}

/// A solve's time with the DNF case made explicit. `Dnf` compares
/// strictly greater than every finite time, so a single DNF always
/// sorts to the worst end of a window; arithmetic never touches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectiveTime {
    Finite(f64),
    Dnf,
}

impl EffectiveTime {
    pub fn is_dnf(self) -> bool {
        matches!(self, EffectiveTime::Dnf)
    }

    pub fn millis(self) -> Option<f64> {
        match self {
            EffectiveTime::Finite(ms) => Some(ms),
            EffectiveTime::Dnf => None,
        }
    }
}

impl Eq for EffectiveTime {}

impl Ord for EffectiveTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EffectiveTime::Finite(a), EffectiveTime::Finite(b)) => a.total_cmp(b),
            (EffectiveTime::Finite(_), EffectiveTime::Dnf) => Ordering::Less,
            (EffectiveTime::Dnf, EffectiveTime::Finite(_)) => Ordering::Greater,
            (EffectiveTime::Dnf, EffectiveTime::Dnf) => Ordering::Equal,
        }
    }
}

impl PartialOrd for EffectiveTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EffectiveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectiveTime::Finite(ms) => f.write_str(&format_time(*ms)),
            EffectiveTime::Dnf => f.write_str("DNF"),
        }
    }
}

// ============================================
// Statistics
// ============================================

/// Fraction of entries trimmed from each end of a trimmed average,
/// with a floor of one entry per end.
const TRIM_FRACTION: f64 = 0.05;

/// Entries below this count fall back to the plain mean when a trimmed
/// average is requested.
const MIN_TRIMMED_LEN: usize = 3;

fn trim_count(len: usize) -> usize {
    ((len as f64 * TRIM_FRACTION).ceil() as usize).max(1)
}

/// Mean of effective times; short-circuits to `Dnf` if any entry is one.
/// Callers must pass a non-empty slice.
fn mean(times: &[EffectiveTime]) -> EffectiveTime {
    let mut sum = 0.0;
    for t in times {
        match t {
            EffectiveTime::Finite(ms) => sum += ms,
            EffectiveTime::Dnf => return EffectiveTime::Dnf,
        }
    }
    EffectiveTime::Finite(sum / times.len() as f64)
}

/// Average the given solves.
///
/// Returns `None` for an empty input (no average definable — distinct
/// from a DNF result). The plain mean turns `Dnf` as soon as one DNF is
/// present. The trimmed mean sorts effective times, removes
/// `max(1, ceil(5%))` entries from each end and averages the middle;
/// two or more DNFs make it `Dnf` outright, and a single DNF only
/// survives if it escapes the trimmed worst end (it cannot, under the
/// current trim floor, since `Dnf` sorts last). Inputs shorter than
/// three entries fall back to the plain mean.
pub fn average(solves: &[Solve], trimmed: bool) -> Option<EffectiveTime> {
    if solves.is_empty() {
        return None;
    }

    let mut times: Vec<EffectiveTime> = solves.iter().map(Solve::effective_time).collect();
    let dnf_count = times.iter().filter(|t| t.is_dnf()).count();

    let result = if trimmed && times.len() >= MIN_TRIMMED_LEN {
        if dnf_count > 1 {
            EffectiveTime::Dnf
        } else {
            times.sort_unstable();
            let trim = trim_count(times.len());
            mean(&times[trim..times.len() - trim])
        }
    } else if dnf_count > 0 {
        EffectiveTime::Dnf
    } else {
        mean(&times)
    };

    Some(result)
}

/// Aggregate statistics for the stats panel, computed over the full
/// newest-first solve list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStats {
    /// Fastest non-DNF effective time; `Some(Dnf)` when every recorded
    /// solve is a DNF, `None` when nothing is recorded.
    pub best: Option<EffectiveTime>,
    /// Trimmed average of the 5 most recent solves, once 5 exist.
    pub ao5: Option<EffectiveTime>,
    /// Trimmed average of the 12 most recent solves, once 12 exist.
    pub ao12: Option<EffectiveTime>,
    /// Plain mean over the whole session.
    pub mean: Option<EffectiveTime>,
    pub count: usize,
}

pub fn session_stats(solves: &[Solve]) -> SessionStats {
    let best = if solves.is_empty() {
        None
    } else {
        solves
            .iter()
            .map(Solve::effective_time)
            .filter(|t| !t.is_dnf())
            .min()
            .or(Some(EffectiveTime::Dnf))
    };

    let ao5 = (solves.len() >= AO5_WINDOW)
        .then(|| average(&solves[..AO5_WINDOW], true))
        .flatten();
    let ao12 = (solves.len() >= AO12_WINDOW)
        .then(|| average(&solves[..AO12_WINDOW], true))
        .flatten();
    let mean = average(solves, false);

    SessionStats {
        best,
        ao5,
        ao12,
        mean,
        count: solves.len(),
    }
}

// ============================================
// Time formatting
// ============================================

/// Format milliseconds for display with centisecond precision,
/// truncating: `M:SS.CC` past the minute mark, `S.CC` below it.
/// Non-finite input renders as "DNF".
pub fn format_time(ms: f64) -> String {
    if !ms.is_finite() {
        return "DNF".to_string();
    }

    let total_seconds = (ms / 1000.0).floor() as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centis = ((ms % 1000.0) / 10.0).floor() as u64;

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{centis:02}")
    } else {
        format!("{seconds}.{centis:02}")
    }
}

// ============================================
// Timer state machine
// ============================================

/// Penalty earned by overrunning inspection before the solve started.
pub fn inspection_penalty(elapsed_secs: f64) -> Option<Penalty> {
    if elapsed_secs > INSPECTION_DNF_SECS {
        Some(Penalty::Dnf)
    } else if elapsed_secs > INSPECTION_SECONDS {
        Some(Penalty::Plus2)
    } else {
        None
    }
}

/// Countdown text shown during inspection: whole seconds remaining,
/// then "+2" once the window closes and "DNF" two seconds later.
pub fn inspection_label(elapsed_secs: f64) -> String {
    let remaining = (INSPECTION_SECONDS - elapsed_secs).ceil();
    if remaining <= -2.0 {
        "DNF".to_string()
    } else if remaining <= 0.0 {
        "+2".to_string()
    } else {
        format!("{}", remaining as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Holding,
    Ready,
    Inspection,
    Running,
}

/// A completed timing run, handed back when the timer is stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishedSolve {
    pub time: f64,
    pub penalty: Option<Penalty>,
}

/// Hold-to-start timer state machine. The wall clock is injected into
/// every transition as `now` (milliseconds), which keeps the machine a
/// pure function of its inputs and makes the whole flow testable with
/// synthetic timestamps.
///
/// Flow: `Idle` -> `Holding` (press) -> `Ready` (held long enough) ->
/// release either arms `Inspection` or starts `Running`; pressing while
/// `Running` stops and yields a [`FinishedSolve`]. Settings are
/// snapshotted at press time so mid-run changes don't affect the run
/// in flight.
#[derive(Debug)]
pub struct TimerMachine {
    phase: TimerPhase,
    hold_time_ms: f64,
    inspection_enabled: bool,
    hold_started: f64,
    inspection_started: Option<f64>,
    run_started: f64,
    pending_penalty: Option<Penalty>,
}

impl Default for TimerMachine {
    fn default() -> Self {
        TimerMachine::new()
    }
}

impl TimerMachine {
    pub fn new() -> Self {
        TimerMachine {
            phase: TimerPhase::Idle,
            hold_time_ms: defaults::HOLD_TIME_MS as f64,
            inspection_enabled: defaults::INSPECTION_ENABLED,
            hold_started: 0.0,
            inspection_started: None,
            run_started: 0.0,
            pending_penalty: None,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Key-down / touch-down. Starts holding from `Idle` or
    /// `Inspection`; stops a `Running` timer and returns the finished
    /// solve. Other phases ignore the press.
    pub fn press(
        &mut self,
        now: f64,
        hold_time_ms: f64,
        inspection_enabled: bool,
    ) -> Option<FinishedSolve> {
        match self.phase {
            TimerPhase::Running => {
                let finished = FinishedSolve {
                    time: now - self.run_started,
                    penalty: self.pending_penalty,
                };
                self.reset();
                Some(finished)
            }
            TimerPhase::Idle | TimerPhase::Inspection => {
                self.hold_time_ms = hold_time_ms;
                self.inspection_enabled = inspection_enabled;
                self.hold_started = now;
                self.phase = TimerPhase::Holding;
                None
            }
            _ => None,
        }
    }

    /// Periodic clock tick; promotes `Holding` to `Ready` once the hold
    /// threshold is met.
    pub fn tick(&mut self, now: f64) {
        if self.phase == TimerPhase::Holding && now - self.hold_started >= self.hold_time_ms {
            self.phase = TimerPhase::Ready;
        }
    }

    /// Key-up / touch-up. Releasing `Holding` too early falls back to
    /// `Inspection` when one is armed (its clock keeps running),
    /// otherwise `Idle`. Releasing `Ready` arms inspection on the first
    /// release when enabled, and starts the timer otherwise — locking
    /// in any inspection-overrun penalty at that instant.
    pub fn release(&mut self, now: f64) {
        match self.phase {
            TimerPhase::Holding => {
                self.phase = if self.inspection_started.is_some() {
                    TimerPhase::Inspection
                } else {
                    TimerPhase::Idle
                };
            }
            TimerPhase::Ready => {
                if self.inspection_enabled && self.inspection_started.is_none() {
                    self.inspection_started = Some(now);
                    self.phase = TimerPhase::Inspection;
                } else {
                    self.pending_penalty = self
                        .inspection_started
                        .map(|started| (now - started) / 1000.0)
                        .and_then(inspection_penalty);
                    self.inspection_started = None;
                    self.run_started = now;
                    self.phase = TimerPhase::Running;
                }
            }
            _ => {}
        }
    }

    /// Abort whatever is in flight and return to `Idle` without
    /// recording anything.
    pub fn cancel(&mut self) {
        self.reset();
    }

    pub fn elapsed_ms(&self, now: f64) -> f64 {
        if self.phase == TimerPhase::Running {
            now - self.run_started
        } else {
            0.0
        }
    }

    pub fn inspection_elapsed_secs(&self, now: f64) -> Option<f64> {
        self.inspection_started.map(|started| (now - started) / 1000.0)
    }

    fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.inspection_started = None;
        self.pending_penalty = None;
    }
}

// ============================================
// Settings and stored session
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_code(code: &str) -> Theme {
        match code {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// User-adjustable settings, stored alongside the times. Missing fields
/// in an older stored blob take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub inspection_enabled: bool,
    #[serde(rename = "hideUIWhenTiming")]
    pub hide_ui_when_timing: bool,
    /// How long the spacebar must be held before the timer arms, ms.
    pub hold_time: u32,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            inspection_enabled: defaults::INSPECTION_ENABLED,
            hide_ui_when_timing: defaults::HIDE_UI_WHEN_TIMING,
            hold_time: defaults::HOLD_TIME_MS,
            theme: Theme::Dark,
        }
    }
}

/// Everything the app persists between visits, in the stored JSON shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredData {
    pub times: Vec<Solve>,
    pub settings: Settings,
    pub current_puzzle: Puzzle,
}

impl StoredData {
    /// Drop solve records the statistics engine cannot accept
    /// (negative or non-finite raw times). Hand-edited or corrupted
    /// storage is the only way these appear.
    pub fn sanitize(mut self) -> Self {
        let before = self.times.len();
        self.times.retain(|s| s.time.is_finite() && s.time >= 0.0);
        if self.times.len() < before {
            warn!("dropped {} malformed solve record(s)", before - self.times.len());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clean(time: f64) -> Solve {
        solve(time, None)
    }

    fn solve(time: f64, penalty: Option<Penalty>) -> Solve {
        Solve {
            id: time as u64,
            time,
            penalty,
            scramble: String::new(),
            puzzle: Puzzle::Cube3,
            date: String::new(),
        }
    }

    fn millis(t: EffectiveTime) -> f64 {
        t.millis().expect("expected a finite time")
    }

    fn base_face(token: &str) -> &str {
        token.trim_end_matches(['\'', '2'])
    }

    #[test]
    fn scramble_lengths_match_category() {
        let mut rng = StdRng::seed_from_u64(7);
        for (puzzle, expected) in [
            (Puzzle::Cube2, 9),
            (Puzzle::Cube3, 20),
            (Puzzle::Cube4, 40),
            (Puzzle::Cube5, 60),
        ] {
            let scramble = generate_scramble_with(puzzle, &mut rng);
            assert_eq!(scramble.split(' ').count(), expected, "{}", puzzle.code());
        }
    }

    #[test]
    fn no_consecutive_repeated_face() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for puzzle in Puzzle::ALL {
                let scramble = generate_scramble_with(puzzle, &mut rng);
                let tokens: Vec<&str> = scramble.split(' ').collect();
                for pair in tokens.windows(2) {
                    assert_ne!(
                        base_face(pair[0]),
                        base_face(pair[1]),
                        "consecutive repeat in {scramble:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn three_by_three_never_turns_same_axis_opposites_back_to_back() {
        // With a six-face set, exhausting the 20-draw cap is
        // practically impossible, so the constraint must always hold.
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let scramble = generate_scramble_with(Puzzle::Cube3, &mut rng);
            let faces: Vec<&str> = scramble.split(' ').map(base_face).collect();
            for pair in faces.windows(2) {
                let banned = match pair[0] {
                    "R" => "L",
                    "L" => "R",
                    "U" => "D",
                    "D" => "U",
                    "F" => "B",
                    "B" => "F",
                    other => panic!("unexpected face {other:?}"),
                };
                assert_ne!(pair[1], banned, "opposite pair in {scramble:?}");
            }
        }
    }

    #[test]
    fn small_cube_uses_only_its_move_set() {
        let mut rng = StdRng::seed_from_u64(99);
        let scramble = generate_scramble_with(Puzzle::Cube2, &mut rng);
        for token in scramble.split(' ') {
            assert!(matches!(base_face(token), "R" | "U" | "F"), "bad token {token:?}");
            let suffix = &token[base_face(token).len()..];
            assert!(matches!(suffix, "" | "'" | "2"), "bad modifier in {token:?}");
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = generate_scramble_with(Puzzle::Cube4, &mut StdRng::seed_from_u64(42));
        let b = generate_scramble_with(Puzzle::Cube4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_puzzle_code_degrades_to_default() {
        let puzzle = Puzzle::from_code("pyraminx");
        assert_eq!(puzzle, Puzzle::Cube3);
        assert_eq!(puzzle.scramble_length(), 20);
        assert_eq!(puzzle.move_set(), &OUTER_FACES);
    }

    #[test]
    fn effective_time_applies_penalties() {
        assert_eq!(clean(10000.0).effective_time(), EffectiveTime::Finite(10000.0));
        assert_eq!(
            solve(10000.0, Some(Penalty::Plus2)).effective_time(),
            EffectiveTime::Finite(12000.0)
        );
        assert_eq!(solve(10000.0, Some(Penalty::Dnf)).effective_time(), EffectiveTime::Dnf);
    }

    #[test]
    fn dnf_sorts_after_every_finite_time() {
        let mut times = vec![
            EffectiveTime::Dnf,
            EffectiveTime::Finite(9000.0),
            EffectiveTime::Finite(1e12),
        ];
        times.sort_unstable();
        assert_eq!(times.last(), Some(&EffectiveTime::Dnf));
    }

    #[test]
    fn average_of_empty_input_is_absent() {
        assert_eq!(average(&[], false), None);
        assert_eq!(average(&[], true), None);
    }

    #[test]
    fn plain_mean_of_clean_times() {
        let solves = [clean(10000.0), clean(12000.0), clean(14000.0)];
        assert_eq!(average(&solves, false), Some(EffectiveTime::Finite(12000.0)));
    }

    #[test]
    fn plain_mean_includes_plus_two() {
        let solves = [clean(10000.0), solve(10000.0, Some(Penalty::Plus2)), clean(10000.0)];
        let result = average(&solves, false).expect("non-empty");
        assert!((millis(result) - 10666.666).abs() < 0.01);
    }

    #[test]
    fn plain_mean_with_any_dnf_is_dnf() {
        let solves = [clean(10000.0), solve(12000.0, Some(Penalty::Dnf)), clean(14000.0)];
        assert_eq!(average(&solves, false), Some(EffectiveTime::Dnf));
    }

    #[test]
    fn trimmed_average_drops_best_and_worst() {
        let solves = [
            clean(10000.0),
            clean(12000.0),
            clean(13000.0),
            clean(14000.0),
            clean(20000.0),
        ];
        assert_eq!(average(&solves, true), Some(EffectiveTime::Finite(13000.0)));
    }

    #[test]
    fn single_dnf_is_trimmed_as_the_worst_time() {
        let solves = [
            clean(10000.0),
            clean(12000.0),
            clean(13000.0),
            clean(14000.0),
            solve(20000.0, Some(Penalty::Dnf)),
        ];
        assert_eq!(average(&solves, true), Some(EffectiveTime::Finite(13000.0)));
    }

    #[test]
    fn two_dnfs_make_the_trimmed_average_dnf() {
        let solves = [
            solve(10000.0, Some(Penalty::Dnf)),
            clean(12000.0),
            clean(13000.0),
            clean(14000.0),
            solve(20000.0, Some(Penalty::Dnf)),
        ];
        assert_eq!(average(&solves, true), Some(EffectiveTime::Dnf));
    }

    #[test]
    fn trimmed_average_counts_plus_two_inside_the_window() {
        let solves = [
            clean(10000.0),
            solve(11000.0, Some(Penalty::Plus2)),
            clean(12000.0),
            clean(13000.0),
            clean(14000.0),
        ];
        // Effective: 10000, 13000, 12000, 13000, 14000 -> keeps 12, 13, 13.
        let result = average(&solves, true).expect("non-empty");
        assert!((millis(result) - 12666.666).abs() < 0.01);
    }

    #[test]
    fn trimmed_average_over_twelve_sequential_times() {
        let solves: Vec<Solve> = (0..12).map(|i| clean(10000.0 + i as f64 * 1000.0)).collect();
        assert_eq!(average(&solves, true), Some(EffectiveTime::Finite(15500.0)));
    }

    #[test]
    fn session_stats_over_mixed_solves() {
        let solves = [
            clean(11000.0),
            solve(9000.0, Some(Penalty::Dnf)),
            solve(9500.0, Some(Penalty::Plus2)),
        ];
        let stats = session_stats(&solves);
        assert_eq!(stats.best, Some(EffectiveTime::Finite(11000.0)));
        assert_eq!(stats.ao5, None);
        assert_eq!(stats.ao12, None);
        assert_eq!(stats.mean, Some(EffectiveTime::Dnf));
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn session_stats_best_is_dnf_when_everything_is() {
        let solves = [solve(9000.0, Some(Penalty::Dnf)), solve(9500.0, Some(Penalty::Dnf))];
        assert_eq!(session_stats(&solves).best, Some(EffectiveTime::Dnf));
    }

    #[test]
    fn session_stats_of_nothing() {
        let stats = session_stats(&[]);
        assert_eq!(stats, SessionStats::default());
    }

    #[test]
    fn session_stats_windows_use_most_recent_solves() {
        // Newest first: a fast recent run ahead of a slow history.
        let mut solves: Vec<Solve> = (0..5).map(|i| clean(8000.0 + i as f64 * 1000.0)).collect();
        solves.extend((0..7).map(|_| clean(60000.0)));
        let stats = session_stats(&solves);
        // ao5 over 8..12s trims 8 and 12, keeping 9, 10, 11.
        assert_eq!(stats.ao5, Some(EffectiveTime::Finite(10000.0)));
        let ao12 = stats.ao12.expect("twelve solves recorded");
        assert!(millis(ao12) > millis(stats.ao5.expect("five solves recorded")));
    }

    #[test]
    fn format_time_truncates_to_centiseconds() {
        assert_eq!(format_time(0.0), "0.00");
        assert_eq!(format_time(1234.0), "1.23");
        assert_eq!(format_time(1239.0), "1.23");
        assert_eq!(format_time(9999.0), "9.99");
        assert_eq!(format_time(59999.0), "59.99");
    }

    #[test]
    fn format_time_past_the_minute_mark() {
        assert_eq!(format_time(60000.0), "1:00.00");
        assert_eq!(format_time(60001.0), "1:00.00");
        assert_eq!(format_time(60050.0), "1:00.05");
        assert_eq!(format_time(125340.0), "2:05.34");
        assert_eq!(format_time(659999.0), "10:59.99");
        assert_eq!(format_time(3600000.0), "60:00.00");
    }

    #[test]
    fn format_time_renders_non_finite_as_dnf() {
        assert_eq!(format_time(f64::INFINITY), "DNF");
        assert_eq!(format_time(f64::NAN), "DNF");
        assert_eq!(EffectiveTime::Dnf.to_string(), "DNF");
    }

    #[test]
    fn inspection_penalty_thresholds() {
        assert_eq!(inspection_penalty(14.0), None);
        assert_eq!(inspection_penalty(15.0), None);
        assert_eq!(inspection_penalty(16.0), Some(Penalty::Plus2));
        assert_eq!(inspection_penalty(17.5), Some(Penalty::Dnf));
    }

    #[test]
    fn inspection_label_counts_down_into_penalties() {
        assert_eq!(inspection_label(0.0), "15");
        assert_eq!(inspection_label(14.2), "1");
        assert_eq!(inspection_label(15.5), "+2");
        assert_eq!(inspection_label(17.5), "DNF");
    }

    #[test]
    fn early_release_returns_to_idle() {
        let mut machine = TimerMachine::new();
        assert_eq!(machine.press(1000.0, 300.0, false), None);
        assert_eq!(machine.phase(), TimerPhase::Holding);
        machine.tick(1100.0);
        assert_eq!(machine.phase(), TimerPhase::Holding);
        machine.release(1150.0);
        assert_eq!(machine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn full_hold_starts_the_timer_without_inspection() {
        let mut machine = TimerMachine::new();
        machine.press(0.0, 300.0, false);
        machine.tick(350.0);
        assert_eq!(machine.phase(), TimerPhase::Ready);
        machine.release(400.0);
        assert_eq!(machine.phase(), TimerPhase::Running);
        assert_eq!(machine.elapsed_ms(2400.0), 2000.0);

        let finished = machine.press(12400.0, 300.0, false).expect("running timer stops");
        assert_eq!(finished.time, 12000.0);
        assert_eq!(finished.penalty, None);
        assert_eq!(machine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn inspection_runs_between_the_two_holds() {
        let mut machine = TimerMachine::new();
        machine.press(0.0, 300.0, true);
        machine.tick(300.0);
        machine.release(350.0);
        assert_eq!(machine.phase(), TimerPhase::Inspection);
        assert_eq!(machine.inspection_elapsed_secs(5350.0), Some(5.0));

        machine.press(5350.0, 300.0, true);
        machine.tick(5700.0);
        machine.release(5800.0);
        assert_eq!(machine.phase(), TimerPhase::Running);

        let finished = machine.press(15800.0, 300.0, true).expect("running timer stops");
        assert_eq!(finished.time, 10000.0);
        assert_eq!(finished.penalty, None);
    }

    #[test]
    fn overrunning_inspection_attaches_the_penalty() {
        let mut machine = TimerMachine::new();
        machine.press(0.0, 300.0, true);
        machine.tick(300.0);
        machine.release(300.0); // inspection starts at t=300ms

        // Start the solve 16s into inspection: +2 territory.
        machine.press(16300.0, 300.0, true);
        machine.tick(16600.0);
        machine.release(16600.0);
        let finished = machine.press(26600.0, 300.0, true).expect("running timer stops");
        assert_eq!(finished.penalty, Some(Penalty::Plus2));

        // Same flow but 18s of inspection: DNF.
        machine.press(0.0, 300.0, true);
        machine.tick(300.0);
        machine.release(300.0);
        machine.press(18300.0, 300.0, true);
        machine.tick(18600.0);
        machine.release(18600.0);
        let finished = machine.press(28600.0, 300.0, true).expect("running timer stops");
        assert_eq!(finished.penalty, Some(Penalty::Dnf));
    }

    #[test]
    fn early_release_during_inspection_keeps_inspecting() {
        let mut machine = TimerMachine::new();
        machine.press(0.0, 300.0, true);
        machine.tick(300.0);
        machine.release(300.0);
        assert_eq!(machine.phase(), TimerPhase::Inspection);

        machine.press(2000.0, 300.0, true);
        machine.release(2100.0); // let go before the hold completes
        assert_eq!(machine.phase(), TimerPhase::Inspection);
        assert_eq!(machine.inspection_elapsed_secs(10300.0), Some(10.0));
    }

    #[test]
    fn cancel_discards_the_run() {
        let mut machine = TimerMachine::new();
        machine.press(0.0, 300.0, true);
        machine.tick(300.0);
        machine.release(300.0);
        machine.cancel();
        assert_eq!(machine.phase(), TimerPhase::Idle);
        assert_eq!(machine.inspection_elapsed_secs(1000.0), None);

        // A fresh run after cancelling starts penalty-free.
        machine.press(20000.0, 300.0, false);
        machine.tick(20300.0);
        machine.release(20300.0);
        let finished = machine.press(25300.0, 300.0, false).expect("running timer stops");
        assert_eq!(finished.penalty, None);
    }

    #[test]
    fn sanitize_drops_malformed_records() {
        let data = StoredData {
            times: vec![clean(10000.0), clean(-5.0), clean(f64::NAN), clean(8000.0)],
            ..StoredData::default()
        };
        let cleaned = data.sanitize();
        assert_eq!(cleaned.times.len(), 2);
        assert!(cleaned.times.iter().all(|s| s.time >= 0.0));
    }
}
