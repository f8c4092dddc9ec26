//! The fixed seven-step input sequence

use std::fmt;

/// A value collected from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Length,
    Coeff,
    CurtainPrice,
    Metraj2,
    Multiplier,
    Extra,
    TapeMetraj,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Length => "length",
            Field::Coeff => "coeff",
            Field::CurtainPrice => "curtainPrice",
            Field::Metraj2 => "metraj2",
            Field::Multiplier => "multiplier",
            Field::Extra => "extra",
            Field::TapeMetraj => "tapeMetraj",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Button groups for the fixed-choice steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceGroup {
    Coeff,
    Multiplier,
    Extra,
}

impl ChoiceGroup {
    pub const ALL: [ChoiceGroup; 3] = [ChoiceGroup::Coeff, ChoiceGroup::Multiplier, ChoiceGroup::Extra];

    /// Tag prefix carried in button callback data (`coeff:2.5`)
    pub fn prefix(self) -> &'static str {
        match self {
            ChoiceGroup::Coeff => "coeff",
            ChoiceGroup::Multiplier => "mult",
            ChoiceGroup::Extra => "extra",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.prefix() == prefix)
    }

    /// Button labels, in display order
    pub fn options(self) -> &'static [&'static str] {
        match self {
            ChoiceGroup::Coeff => &["1.5", "2", "2.5", "3"],
            ChoiceGroup::Multiplier => &["2", "3", "4", "5"],
            ChoiceGroup::Extra => &["6", "12"],
        }
    }

    pub fn allowed_values(self) -> &'static [f64] {
        match self {
            ChoiceGroup::Coeff => &[1.5, 2.0, 2.5, 3.0],
            ChoiceGroup::Multiplier => &[2.0, 3.0, 4.0, 5.0],
            ChoiceGroup::Extra => &[6.0, 12.0],
        }
    }

    /// Callback tag for one option
    pub fn tag(self, option: &str) -> String {
        format!("{}:{option}", self.prefix())
    }

    /// Check a raw tag value against the allowed set.
    ///
    /// The keyboard only offers allowed values, but callback data comes back
    /// from the client unverified. Returns the canonical allowed value.
    pub fn validate(self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        let all_digits = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit() || c == '.');
        if !all_digits {
            return None;
        }
        let value: f64 = raw.parse().ok()?;
        self.allowed_values()
            .iter()
            .copied()
            .find(|allowed| (allowed - value).abs() < 1e-9)
    }
}

/// Expected input for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    FreeNumber,
    Choice(ChoiceGroup),
}

/// Steps of the form, in the order they are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    WaitingLength,
    WaitingCoeff,
    WaitingCurtainPrice,
    WaitingMetraj2,
    WaitingMultiplier,
    WaitingExtra,
    WaitingTapeMetraj,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::WaitingLength,
        Step::WaitingCoeff,
        Step::WaitingCurtainPrice,
        Step::WaitingMetraj2,
        Step::WaitingMultiplier,
        Step::WaitingExtra,
        Step::WaitingTapeMetraj,
    ];

    pub fn first() -> Self {
        Step::WaitingLength
    }

    pub fn field(self) -> Field {
        match self {
            Step::WaitingLength => Field::Length,
            Step::WaitingCoeff => Field::Coeff,
            Step::WaitingCurtainPrice => Field::CurtainPrice,
            Step::WaitingMetraj2 => Field::Metraj2,
            Step::WaitingMultiplier => Field::Multiplier,
            Step::WaitingExtra => Field::Extra,
            Step::WaitingTapeMetraj => Field::TapeMetraj,
        }
    }

    pub fn kind(self) -> InputKind {
        match self {
            Step::WaitingCoeff => InputKind::Choice(ChoiceGroup::Coeff),
            Step::WaitingMultiplier => InputKind::Choice(ChoiceGroup::Multiplier),
            Step::WaitingExtra => InputKind::Choice(ChoiceGroup::Extra),
            Step::WaitingLength
            | Step::WaitingCurtainPrice
            | Step::WaitingMetraj2
            | Step::WaitingTapeMetraj => InputKind::FreeNumber,
        }
    }

    /// Position in the sequence, starting at 0
    pub fn index(self) -> usize {
        match self {
            Step::WaitingLength => 0,
            Step::WaitingCoeff => 1,
            Step::WaitingCurtainPrice => 2,
            Step::WaitingMetraj2 => 3,
            Step::WaitingMultiplier => 4,
            Step::WaitingExtra => 5,
            Step::WaitingTapeMetraj => 6,
        }
    }

    /// The following step, or `None` for the terminal step
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}
