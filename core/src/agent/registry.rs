use crate::tools::{AverageDogWeightAction, CalculateAction, SearchAction, UcasPointsAction};
use crate::traits::{Action, SearchClient};
use std::sync::Arc;

/// The closed set of actions the model may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Calculate,
    AverageDogWeight,
    UcasPoints,
    Search,
}

impl ActionKind {
    /// Prompt order.
    pub const ALL: [ActionKind; 4] = [
        Self::Calculate,
        Self::AverageDogWeight,
        Self::UcasPoints,
        Self::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calculate => "calculate",
            Self::AverageDogWeight => "average_dog_weight",
            Self::UcasPoints => "ucas_points",
            Self::Search => "search",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps every [`ActionKind`] to its implementation. Built once and never
/// mutated, so one registry can be shared between agents.
pub struct ActionRegistry {
    calculate: CalculateAction,
    average_dog_weight: AverageDogWeightAction,
    ucas_points: UcasPointsAction,
    search: SearchAction,
}

impl ActionRegistry {
    pub fn new(search: Arc<dyn SearchClient>) -> Self {
        Self {
            calculate: CalculateAction,
            average_dog_weight: AverageDogWeightAction,
            ucas_points: UcasPointsAction,
            search: SearchAction::new(search),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<ActionKind> {
        ActionKind::from_name(name)
    }

    pub fn action(&self, kind: ActionKind) -> &dyn Action {
        match kind {
            ActionKind::Calculate => &self.calculate,
            ActionKind::AverageDogWeight => &self.average_dog_weight,
            ActionKind::UcasPoints => &self.ucas_points,
            ActionKind::Search => &self.search,
        }
    }

    pub fn actions(&self) -> impl Iterator<Item = &dyn Action> + '_ {
        ActionKind::ALL.into_iter().map(|kind| self.action(kind))
    }

    pub async fn invoke(&self, kind: ActionKind, argument: &str) -> String {
        self.action(kind).run(argument).await
    }
}
