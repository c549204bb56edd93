pub mod calculate;
pub mod dog_weight;
pub mod search;
pub mod ucas;

pub use calculate::CalculateAction;
pub use dog_weight::AverageDogWeightAction;
pub use search::SearchAction;
pub use ucas::{QualificationLevel, UcasPointsAction, tariff_points, ucas_total};
