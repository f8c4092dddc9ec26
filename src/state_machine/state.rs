//! Conversation state types

use super::step::{Field, Step};
use crate::pricing::PricingInputs;
use std::collections::BTreeMap;
use thiserror::Error;

/// The form reached its terminal step without every value.
///
/// Unreachable while `Collected` is only written by `transition`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing field {0} at calculation time")]
pub struct MissingField(pub Field);

/// Answers accepted so far, keyed by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected(BTreeMap<Field, f64>);

impl Collected {
    pub fn get(&self, field: Field) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub(super) fn insert(&mut self, field: Field, value: f64) {
        self.0.insert(field, value);
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn require(&self, field: Field) -> Result<f64, MissingField> {
        self.get(field).ok_or(MissingField(field))
    }

    pub fn pricing_inputs(&self) -> Result<PricingInputs, MissingField> {
        Ok(PricingInputs {
            length: self.require(Field::Length)?,
            coeff: self.require(Field::Coeff)?,
            curtain_price: self.require(Field::CurtainPrice)?,
            metraj2: self.require(Field::Metraj2)?,
            multiplier: self.require(Field::Multiplier)?,
            extra: self.require(Field::Extra)?,
            tape_metraj: self.require(Field::TapeMetraj)?,
        })
    }
}

/// One user's form in progress
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub step: Step,
    pub collected: Collected,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            step: Step::first(),
            collected: Collected::default(),
        }
    }

    /// `collected` holds exactly the fields of the steps before `step`.
    /// `Field` orders like `Step`, so map order matches sequence order.
    pub fn is_consistent(&self) -> bool {
        let expected = Step::ALL[..self.step.index()].iter().map(|s| s.field());
        self.collected.fields().eq(expected)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversation state as seen by the transition function
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConvState {
    /// No form in progress for this session
    #[default]
    Idle,
    Collecting(Conversation),
}

impl ConvState {
    pub fn conversation(&self) -> Option<&Conversation> {
        match self {
            ConvState::Idle => None,
            ConvState::Collecting(conv) => Some(conv),
        }
    }

    pub fn current_step(&self) -> Option<Step> {
        self.conversation().map(|conv| conv.step)
    }
}
