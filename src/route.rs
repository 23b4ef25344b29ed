use serde::Serialize;

use crate::types::{Location, RouteStep, StepStatus, TravelMode};

/// An ordered, normalized route. Insertion order is travel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    mode: TravelMode,
    steps: Vec<RouteStep>,
}

impl Route {
    pub fn new(mode: TravelMode, steps: Vec<RouteStep>) -> Self {
        Self { mode, steps }
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&RouteStep> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn origin(&self) -> Option<&Location> {
        self.steps.first().map(|s| &s.coordinates)
    }

    pub fn destination(&self) -> Option<&Location> {
        self.steps.last().map(|s| &s.coordinates)
    }

    /// Steps after `index`, not including it.
    pub fn remaining_after(&self, index: usize) -> &[RouteStep] {
        self.steps.get(index + 1..).unwrap_or_default()
    }

    /// Sum of the leading number of every step's distance text. Non-numeric text adds 0.
    pub fn total_distance(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| leading_number(&s.distance).unwrap_or(0.0))
            .sum()
    }

    /// Total travel time in whole minutes, rounded up.
    pub fn total_duration_minutes(&self) -> u64 {
        let seconds: f64 = self.steps.iter().map(|s| duration_seconds(&s.duration)).sum();
        (seconds / 60.0).ceil() as u64
    }

    /// Sum of leg fares in NGN. Driving routes have no fares.
    pub fn total_cost(&self) -> Option<u64> {
        match self.mode {
            TravelMode::Transit => Some(
                self.steps
                    .iter()
                    .filter_map(|s| s.fare)
                    .fold(0, u64::saturating_add),
            ),
            TravelMode::Driving => None,
        }
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            mode: self.mode,
            total_distance: (self.total_distance() * 10.0).round() / 10.0,
            total_duration_minutes: self.total_duration_minutes(),
            total_cost: self.total_cost(),
            step_count: self.step_count(),
        }
    }

    /// Where step `index` stands given the navigator's position. Everything is upcoming
    /// when not navigating.
    pub fn status_of(&self, index: usize, current: Option<usize>) -> StepStatus {
        match current {
            Some(c) if index < c => StepStatus::Done,
            Some(c) if index == c => StepStatus::Current,
            _ => StepStatus::Upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub mode: TravelMode,
    pub total_distance: f64,
    pub total_duration_minutes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<u64>,
    pub step_count: usize,
}

/// Leading decimal number of `text`, ignoring thousands separators (`"1,200 m"` is 1200).
pub fn leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(trimmed.len());
    let digits: String = trimmed[..end].chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Seconds in a duration text such as `"5 mins"`, `"45 secs"` or `"1 hour 5 mins"`.
/// Text with no recognised quantity (`"N/A"`) is zero.
pub fn duration_seconds(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let mut seconds = 0.0;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        i += 1;
        let Some(value) = leading_number(token) else {
            continue;
        };
        let number_len = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(token.len());
        let mut unit = &token[number_len..];
        if unit.is_empty() {
            unit = tokens.get(i).copied().unwrap_or_default();
            i += 1;
        }
        seconds += value * unit_seconds(unit);
    }
    seconds
}

fn unit_seconds(unit: &str) -> f64 {
    if unit.starts_with('d') {
        86_400.0
    } else if unit.starts_with('h') {
        3_600.0
    } else if unit.starts_with('m') {
        60.0
    } else if unit.starts_with('s') {
        1.0
    } else {
        0.0
    }
}
