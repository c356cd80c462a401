//! Abilities, conditions and timed stat modifiers.
//!
//! Ability behaviour is an enum of effects rather than string-keyed
//! lookups, so an unknown effect is a content error at load time instead
//! of a silent no-op during play.

use crate::content::ContentError;
use crate::dice::DiceExpr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three combat stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Attack,
    Defense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 3] = [Stat::Attack, Stat::Defense, Stat::Speed];

    pub fn name(&self) -> &'static str {
        match self {
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::Speed => "speed",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When an ability takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Always on; folded into stat recomputation or turn order.
    Passive,
    /// Spent during the player's combat turn.
    ActiveCombat,
    /// Changes how level-up gains are rolled.
    PassiveLeveling,
}

/// Named timed effects that tick at turn start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Burning,
    Poisoned,
    Bleeding,
    Regenerating,
}

impl ConditionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConditionKind::Burning => "burning",
            ConditionKind::Poisoned => "poisoned",
            ConditionKind::Bleeding => "bleeding",
            ConditionKind::Regenerating => "regenerating",
        }
    }

    /// Harmful conditions deal their potency as damage; the rest heal.
    pub fn is_harmful(&self) -> bool {
        !matches!(self, ConditionKind::Regenerating)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConditionKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "burning" => Ok(ConditionKind::Burning),
            "poisoned" => Ok(ConditionKind::Poisoned),
            "bleeding" => Ok(ConditionKind::Bleeding),
            "regenerating" => Ok(ConditionKind::Regenerating),
            other => Err(ContentError::Invalid(format!("unknown condition '{other}'"))),
        }
    }
}

/// What an ability does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityEffect {
    /// Flat and percent-of-base bonus to one stat.
    StatBonus {
        stat: Stat,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
    },
    /// Acts first in every encounter.
    FirstStrike,
    /// Level-up gains pick a random major stat.
    VolatileStatGain,
    /// Direct damage to the opponent, ignoring mitigation.
    Damage { dice: DiceExpr },
    /// Places a condition on the opponent.
    Inflict {
        condition: ConditionKind,
        duration: u32,
        potency: i32,
    },
    /// Restores the user's health.
    Heal { dice: DiceExpr },
    /// Temporary stat boost on the user.
    Empower { stat: Stat, amount: f64, duration: u32 },
}

impl AbilityEffect {
    /// The ability kind this effect belongs to.
    pub fn expected_kind(&self) -> AbilityKind {
        match self {
            AbilityEffect::StatBonus { .. } | AbilityEffect::FirstStrike => AbilityKind::Passive,
            AbilityEffect::VolatileStatGain => AbilityKind::PassiveLeveling,
            AbilityEffect::Damage { .. }
            | AbilityEffect::Inflict { .. }
            | AbilityEffect::Heal { .. }
            | AbilityEffect::Empower { .. } => AbilityKind::ActiveCombat,
        }
    }
}

/// Resource cost of an ability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    #[serde(default)]
    pub weave: i32,
}

/// An ability definition from the content catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    /// Stable key referenced by backgrounds, enemies and saves.
    pub id: String,
    /// Shown to the player and accepted by `Use <name>`.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    #[serde(default)]
    pub cost: AbilityCost,
    /// Must agree with `kind`, see [`AbilityDef::validate`].
    pub effect: AbilityEffect,
}

impl AbilityDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: AbilityKind,
        effect: AbilityEffect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            cost: AbilityCost::default(),
            effect,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_weave_cost(mut self, weave: i32) -> Self {
        self.cost.weave = weave;
        self
    }

    /// Reject definitions whose effect does not fit the declared kind.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.id.trim().is_empty() {
            return Err(ContentError::Invalid("ability with an empty id".to_string()));
        }
        if self.effect.expected_kind() != self.kind {
            return Err(ContentError::Invalid(format!(
                "ability '{}' is declared {:?} but its effect is {:?}",
                self.id,
                self.kind,
                self.effect.expected_kind()
            )));
        }
        if self.cost.weave < 0 {
            return Err(ContentError::Invalid(format!(
                "ability '{}' has a negative weave cost",
                self.id
            )));
        }
        if let AbilityEffect::Damage { dice } | AbilityEffect::Heal { dice } = &self.effect {
            dice.validate()
                .map_err(|e| ContentError::Invalid(format!("ability '{}': {e}", self.id)))?;
        }
        Ok(())
    }

    pub fn is_first_strike(&self) -> bool {
        matches!(self.effect, AbilityEffect::FirstStrike)
    }

    pub fn is_volatile(&self) -> bool {
        matches!(self.effect, AbilityEffect::VolatileStatGain)
    }
}

/// A condition currently affecting an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCondition {
    /// Turn ends left before the condition expires.
    pub duration: u32,
    /// Health lost or regained at each turn start.
    pub potency: i32,
    /// Id of the ability that applied it.
    pub source: String,
}

/// A temporary stat change, counted down at turn end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedModifier {
    pub amount: f64,
    /// Turn ends left.
    pub duration: u32,
    pub source: String,
}
