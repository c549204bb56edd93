use crate::traits::Action;
use async_trait::async_trait;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualificationLevel {
    ALevel,
    AsLevel,
}

impl std::fmt::Display for QualificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ALevel => write!(f, "A-level"),
            Self::AsLevel => write!(f, "AS-level"),
        }
    }
}

/// UCAS tariff points for a single grade, or `None` if the grade does not
/// exist at that level.
pub fn tariff_points(grade: &str, level: QualificationLevel) -> Option<u32> {
    let grade = grade.trim().to_ascii_uppercase();
    match (level, grade.as_str()) {
        (QualificationLevel::ALevel, "A*") => Some(56),
        (QualificationLevel::ALevel, "A") => Some(48),
        (QualificationLevel::ALevel, "B") => Some(40),
        (QualificationLevel::ALevel, "C") => Some(32),
        (QualificationLevel::ALevel, "D") => Some(24),
        (QualificationLevel::ALevel, "E") => Some(16),
        (QualificationLevel::AsLevel, "A") => Some(20),
        (QualificationLevel::AsLevel, "B") => Some(16),
        (QualificationLevel::AsLevel, "C") => Some(12),
        (QualificationLevel::AsLevel, "D") => Some(10),
        (QualificationLevel::AsLevel, "E") => Some(6),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GradeEntry<'a> {
    subject: &'a str,
    grade: &'a str,
    level: QualificationLevel,
}

// "Maths A", "Physics B (AS)", "A*"
fn parse_entry(item: &str) -> Option<GradeEntry<'_>> {
    let mut item = item.trim();
    let mut level = QualificationLevel::ALevel;

    for suffix in ["(AS)", "(as)", "AS-level", "AS level"] {
        if let Some(rest) = item.strip_suffix(suffix) {
            item = rest.trim_end();
            level = QualificationLevel::AsLevel;
            break;
        }
    }

    if item.is_empty() {
        return None;
    }

    let (subject, grade) = match item.rsplit_once(char::is_whitespace) {
        Some((subject, grade)) => (subject.trim(), grade),
        None => ("", item),
    };

    Some(GradeEntry {
        subject,
        grade,
        level,
    })
}

/// Sums UCAS points for a comma-separated list such as
/// `"Maths A, Physics B, English C"`.
pub fn ucas_total(grades: &str) -> String {
    let entries: Vec<GradeEntry<'_>> = grades.split(',').filter_map(parse_entry).collect();

    if entries.is_empty() {
        return "No grades provided".to_string();
    }

    let mut out = String::new();
    let mut total = 0;

    for entry in &entries {
        let subject = if entry.subject.is_empty() {
            "Subject"
        } else {
            entry.subject
        };

        match tariff_points(entry.grade, entry.level) {
            Some(points) => {
                total += points;
                let _ = writeln!(
                    out,
                    "{} ({} {}): {} points",
                    subject, entry.level, entry.grade, points
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{} ({} {}): unrecognised grade, 0 points",
                    subject, entry.level, entry.grade
                );
            }
        }
    }

    let _ = write!(out, "Total: {} UCAS points", total);
    out
}

pub struct UcasPointsAction;

#[async_trait]
impl Action for UcasPointsAction {
    fn name(&self) -> &str {
        "ucas_points"
    }

    fn description(&self) -> &str {
        "Returns UCAS tariff points per subject and the total for a comma-separated list of grades. Append (AS) for AS-level grades. Tariff: A* = 56, A = 48, B = 40, C = 32, D = 24, E = 16"
    }

    fn example(&self) -> &str {
        "Maths A, Physics B, English C (AS)"
    }

    async fn run(&self, input: &str) -> String {
        ucas_total(input)
    }
}
