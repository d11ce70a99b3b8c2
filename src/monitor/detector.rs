//! Crossing detection between two consecutive readings.
//!
//! A level is crossed when it lies in the closed interval spanned by the
//! previous and current reading. Both ends are inclusive, so a level equal
//! to the current price alerts even on a flat tick. The bootstrap tick of a
//! session never alerts.

use super::levels::LevelSet;
use super::session::{MonitorSession, Reading};
use std::cmp::Ordering;

/// What a display entry stands for. The declaration order is the tie-break
/// order for entries sharing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Level,
    PreviousPrice,
    CurrentPrice,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Level => "Price Level",
            Role::PreviousPrice => "Previous Price",
            Role::CurrentPrice => "Current Price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn between(previous: f64, current: f64) -> Self {
        match current.partial_cmp(&previous) {
            Some(Ordering::Greater) => Direction::Up,
            Some(Ordering::Less) => Direction::Down,
            _ => Direction::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayEntry {
    pub role: Role,
    pub value: f64,
    /// Set on level entries that were crossed this tick.
    pub crossed: bool,
}

impl DisplayEntry {
    pub fn label(&self) -> &'static str {
        self.role.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub level: f64,
    pub direction: Direction,
}

/// Result of one tick's evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Levels and both readings, ascending by value.
    pub display: Vec<DisplayEntry>,
    /// Crossed levels, in display order.
    pub crossings: Vec<Crossing>,
    pub direction: Direction,
}

pub struct CrossingDetector;

impl CrossingDetector {
    /// Evaluates a steady-state tick from `previous` to `current`.
    pub fn evaluate(previous: &Reading, current: &Reading, levels: &LevelSet) -> Evaluation {
        let direction = Direction::between(previous.value, current.value);
        let lo = previous.value.min(current.value);
        let hi = previous.value.max(current.value);

        let mut display: Vec<DisplayEntry> = levels
            .iter()
            .map(|level| DisplayEntry {
                role: Role::Level,
                value: level,
                crossed: lo <= level && level <= hi,
            })
            .collect();
        display.push(DisplayEntry {
            role: Role::PreviousPrice,
            value: previous.value,
            crossed: false,
        });
        display.push(DisplayEntry {
            role: Role::CurrentPrice,
            value: current.value,
            crossed: false,
        });
        display.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.role.cmp(&b.role)));

        let crossings = display
            .iter()
            .filter(|entry| entry.crossed)
            .map(|entry| Crossing {
                level: entry.value,
                direction,
            })
            .collect();

        Evaluation {
            display,
            crossings,
            direction,
        }
    }

    /// Evaluates the latest tick of a session, applying the bootstrap rule.
    /// Returns `None` until the session has observed a reading.
    pub fn evaluate_session(session: &MonitorSession, levels: &LevelSet) -> Option<Evaluation> {
        let current = session.current()?;
        if session.is_bootstrap() {
            let mut evaluation = Self::evaluate(current, current, levels);
            for entry in &mut evaluation.display {
                entry.crossed = false;
            }
            evaluation.crossings.clear();
            return Some(evaluation);
        }
        let previous = session.previous().unwrap_or(current);
        Some(Self::evaluate(previous, current, levels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(values: &[f64]) -> LevelSet {
        let mut set = LevelSet::new();
        for &value in values {
            set.add(value).unwrap();
        }
        set
    }

    fn shape(evaluation: &Evaluation) -> Vec<(Role, f64)> {
        evaluation
            .display
            .iter()
            .map(|entry| (entry.role, entry.value))
            .collect()
    }

    fn crossed(evaluation: &Evaluation) -> Vec<f64> {
        evaluation.crossings.iter().map(|c| c.level).collect()
    }

    #[test]
    fn test_rising_price_crosses_level_between() {
        let set = levels(&[100.0, 110.0, 120.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(105.0), &Reading::now(115.0), &set);

        assert_eq!(crossed(&evaluation), vec![110.0]);
        assert_eq!(evaluation.crossings[0].direction, Direction::Up);
        assert_eq!(
            shape(&evaluation),
            vec![
                (Role::Level, 100.0),
                (Role::PreviousPrice, 105.0),
                (Role::Level, 110.0),
                (Role::CurrentPrice, 115.0),
                (Role::Level, 120.0),
            ]
        );
    }

    #[test]
    fn test_falling_price_crosses_with_direction_down() {
        let set = levels(&[90.0, 100.0, 110.0, 130.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(120.0), &Reading::now(95.0), &set);

        assert_eq!(crossed(&evaluation), vec![100.0, 110.0]);
        assert!(evaluation
            .crossings
            .iter()
            .all(|c| c.direction == Direction::Down));
        assert_eq!(evaluation.direction, Direction::Down);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let set = levels(&[105.0, 115.0, 116.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(105.0), &Reading::now(115.0), &set);
        assert_eq!(crossed(&evaluation), vec![105.0, 115.0]);
    }

    #[test]
    fn test_boundaries_are_inclusive_when_falling() {
        let set = levels(&[104.0, 105.0, 115.0, 116.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(115.0), &Reading::now(105.0), &set);

        assert_eq!(crossed(&evaluation), vec![105.0, 115.0]);
        assert!(evaluation
            .crossings
            .iter()
            .all(|c| c.direction == Direction::Down));
    }

    #[test]
    fn test_flat_tick_on_level_alerts() {
        let set = levels(&[75.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(75.0), &Reading::now(75.0), &set);

        assert_eq!(crossed(&evaluation), vec![75.0]);
        assert_eq!(evaluation.crossings[0].direction, Direction::Flat);
    }

    #[test]
    fn test_flat_tick_off_level_is_quiet() {
        let set = levels(&[70.0, 80.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(75.0), &Reading::now(75.0), &set);
        assert!(evaluation.crossings.is_empty());
        assert_eq!(evaluation.direction, Direction::Flat);
    }

    #[test]
    fn test_empty_levels() {
        let evaluation = CrossingDetector::evaluate(
            &Reading::now(50.0),
            &Reading::now(60.0),
            &LevelSet::new(),
        );
        assert!(evaluation.crossings.is_empty());
        assert_eq!(
            shape(&evaluation),
            vec![(Role::PreviousPrice, 50.0), (Role::CurrentPrice, 60.0)]
        );
    }

    #[test]
    fn test_equal_values_tie_break() {
        let set = levels(&[100.0]);
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(100.0), &Reading::now(100.0), &set);
        assert_eq!(
            shape(&evaluation),
            vec![
                (Role::Level, 100.0),
                (Role::PreviousPrice, 100.0),
                (Role::CurrentPrice, 100.0),
            ]
        );

        // current below previous but equal to a level
        let evaluation =
            CrossingDetector::evaluate(&Reading::now(101.0), &Reading::now(100.0), &set);
        assert_eq!(
            shape(&evaluation),
            vec![
                (Role::Level, 100.0),
                (Role::CurrentPrice, 100.0),
                (Role::PreviousPrice, 101.0),
            ]
        );
    }

    #[test]
    fn test_display_always_ascending_and_repeatable() {
        let set = levels(&[3.5, -2.0, 99.0, 0.0, 42.0, 7.25]);
        let previous = Reading::now(50.0);
        let current = Reading::now(1.0);

        let first = CrossingDetector::evaluate(&previous, &current, &set);
        let second = CrossingDetector::evaluate(&previous, &current, &set);

        assert_eq!(first, second);
        assert!(first
            .display
            .windows(2)
            .all(|pair| pair[0].value <= pair[1].value));
        assert_eq!(crossed(&first), vec![3.5, 7.25, 42.0]);
    }

    #[test]
    fn test_bootstrap_tick_never_alerts() {
        let set = levels(&[100.0]);
        let mut session = MonitorSession::new();
        session.observe(Reading::now(100.0));

        let evaluation = CrossingDetector::evaluate_session(&session, &set).unwrap();
        assert!(evaluation.crossings.is_empty());
        assert_eq!(evaluation.direction, Direction::Flat);
        assert!(evaluation.display.iter().all(|entry| !entry.crossed));
    }

    #[test]
    fn test_session_after_bootstrap_uses_previous_reading() {
        let set = levels(&[100.0, 110.0, 120.0]);
        let mut session = MonitorSession::new();
        session.observe(Reading::now(105.0));
        session.observe(Reading::now(115.0));

        let evaluation = CrossingDetector::evaluate_session(&session, &set).unwrap();
        assert_eq!(crossed(&evaluation), vec![110.0]);
        assert_eq!(evaluation.direction, Direction::Up);
    }

    #[test]
    fn test_empty_session_has_nothing_to_evaluate() {
        let session = MonitorSession::new();
        assert!(CrossingDetector::evaluate_session(&session, &LevelSet::new()).is_none());
    }
}
