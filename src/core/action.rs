use crate::core::rule_helper;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    AddToTarget,
    Deduct,
    Swap,
    Steal,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::AddToTarget,
        ActionKind::Deduct,
        ActionKind::Swap,
        ActionKind::Steal,
    ];

    pub fn uses_points(self) -> bool {
        self != ActionKind::Swap
    }

    /// Deduct and Steal take points away from the target, so the target has
    /// to hold at least that many.
    pub fn takes_from_target(self) -> bool {
        matches!(self, ActionKind::Deduct | ActionKind::Steal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::AddToTarget => "addToTarget",
            ActionKind::Deduct => "deduct",
            ActionKind::Swap => "swap",
            ActionKind::Steal => "steal",
        }
    }

    fn display_label(self) -> &'static str {
        match self {
            ActionKind::AddToTarget => "Add to Target",
            ActionKind::Deduct => "Deduct",
            ActionKind::Swap => "Swap",
            ActionKind::Steal => "Steal",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "addtotarget" | "add to target" | "add" => Some(ActionKind::AddToTarget),
            "deduct" => Some(ActionKind::Deduct),
            "swap" => Some(ActionKind::Swap),
            "steal" => Some(ActionKind::Steal),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub actor: String,
    pub target: String,
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    rule_helper::MIN_ACTION_POINTS
}

impl ActionRequest {
    pub fn new(
        kind: ActionKind,
        actor: impl Into<String>,
        target: impl Into<String>,
        points: i32,
    ) -> Self {
        Self {
            kind,
            actor: actor.into(),
            target: target.into(),
            points,
        }
    }

    pub fn swap(actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(ActionKind::Swap, actor, target, rule_helper::MIN_ACTION_POINTS)
    }

    /// Points clamped into the legal range; swaps carry no points.
    pub fn effective_points(&self) -> i32 {
        if self.kind.uses_points() {
            rule_helper::clamp_points(self.points)
        } else {
            0
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.uses_points() {
            write!(
                f,
                "{} {}->{} x{}",
                self.kind,
                self.actor,
                self.target,
                self.effective_points()
            )
        } else {
            write!(f, "{} {}<->{}", self.kind, self.actor, self.target)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub allowed: bool,
    pub reason: String,
    pub new_scores: BTreeMap<String, i32>,
    pub winner: Option<String>,
}

impl ActionOutcome {
    pub fn blocked(reason: impl Into<String>, scores: BTreeMap<String, i32>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            new_scores: scores,
            winner: None,
        }
    }

    pub fn applied(
        description: impl Into<String>,
        scores: BTreeMap<String, i32>,
        winner: Option<String>,
    ) -> Self {
        Self {
            allowed: true,
            reason: description.into(),
            new_scores: scores,
            winner,
        }
    }
}
