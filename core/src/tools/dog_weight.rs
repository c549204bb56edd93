use crate::traits::Action;
use async_trait::async_trait;

const BREEDS: &[(&str, &str)] = &[
    ("Scottish Terrier", "Scottish Terriers average 20 lbs"),
    ("Border Collie", "a Border Collies average weight is 37 lbs"),
    ("Toy Poodle", "a toy poodles average weight is 7 lbs"),
];

const FALLBACK: &str = "An average dog weights 50 lbs";

pub struct AverageDogWeightAction;

#[async_trait]
impl Action for AverageDogWeightAction {
    fn name(&self) -> &str {
        "average_dog_weight"
    }

    fn description(&self) -> &str {
        "Returns the average weight of a dog when given the breed"
    }

    fn example(&self) -> &str {
        "Collie"
    }

    async fn run(&self, input: &str) -> String {
        lookup(input).to_string()
    }
}

fn lookup(breed: &str) -> &'static str {
    BREEDS
        .iter()
        .find(|(name, _)| breed.contains(name))
        .map(|(_, weight)| *weight)
        .unwrap_or(FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_breeds() {
        assert_eq!(lookup("Border Collie"), "a Border Collies average weight is 37 lbs");
        assert_eq!(lookup("a Scottish Terrier"), "Scottish Terriers average 20 lbs");
        assert_eq!(lookup("Toy Poodle"), "a toy poodles average weight is 7 lbs");
    }

    #[test]
    fn unknown_breed_falls_back() {
        assert_eq!(lookup("Collie"), FALLBACK);
        assert_eq!(lookup("border collie"), FALLBACK);
    }
}
