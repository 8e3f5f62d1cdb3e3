//! Pre-dashboard survey and onboarding.
//!
//! The survey asks one question per resource and estimates how many hours
//! the household would hold out: the weakest resource decides. Answers are
//! not stored in the progression state; only the email captured afterwards
//! is.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    EMAIL_MIN_LEN, RISK_HIGH_MAX_HOURS, RISK_LOW_MAX_HOURS, RISK_MEDIUM_MAX_HOURS,
};
use crate::feedback::Tone;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("email must be longer than {EMAIL_MIN_LEN} characters")]
    EmailTooShort,
    #[error("onboarding already completed")]
    AlreadyStarted,
    #[error("survey is not finished")]
    SurveyIncomplete,
}

/// Identity captured at onboarding. Only a length check is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// # Errors
    ///
    /// Returns [`OnboardingError::EmailTooShort`] for inputs of three characters or fewer.
    pub fn parse(raw: &str) -> Result<Self, OnboardingError> {
        if raw.chars().count() > EMAIL_MIN_LEN {
            Ok(Self(raw.to_string()))
        } else {
            Err(OnboardingError::EmailTooShort)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Water,
    Food,
    Energy,
}

impl Resource {
    const fn index(self) -> usize {
        match self {
            Self::Water => 0,
            Self::Food => 1,
            Self::Energy => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyOption {
    pub label: &'static str,
    pub hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyQuestion {
    pub resource: Resource,
    pub title: &'static str,
    pub prompt: &'static str,
    pub options: &'static [SurveyOption],
}

pub static SURVEY: [SurveyQuestion; 3] = [
    SurveyQuestion {
        resource: Resource::Water,
        title: "Water reserves",
        prompt: "How many litres of drinking water do you keep at home?",
        options: &[
            SurveyOption { label: "None, or under 5L", hours: 4 },
            SurveyOption { label: "5-15 litres", hours: 12 },
            SurveyOption { label: "15-30 litres", hours: 24 },
            SurveyOption { label: "More than 30 litres", hours: 48 },
        ],
    },
    SurveyQuestion {
        resource: Resource::Food,
        title: "Food reserves",
        prompt: "How many days could you eat without going shopping?",
        options: &[
            SurveyOption { label: "One day or less", hours: 8 },
            SurveyOption { label: "2-3 days", hours: 24 },
            SurveyOption { label: "4-7 days", hours: 48 },
            SurveyOption { label: "More than a week", hours: 72 },
        ],
    },
    SurveyQuestion {
        resource: Resource::Energy,
        title: "Emergency energy",
        prompt: "What do you have for power emergencies?",
        options: &[
            SurveyOption { label: "Nothing specific", hours: 2 },
            SurveyOption { label: "Only a torch or the phone", hours: 8 },
            SurveyOption { label: "Power bank and torch", hours: 16 },
            SurveyOption { label: "Complete emergency kit", hours: 36 },
        ],
    },
];

/// How exposed the household is, from the survival estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl RiskLevel {
    #[must_use]
    pub const fn from_hours(hours: u32) -> Self {
        if hours <= RISK_HIGH_MAX_HOURS {
            Self::High
        } else if hours <= RISK_MEDIUM_MAX_HOURS {
            Self::Medium
        } else if hours <= RISK_LOW_MAX_HOURS {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::High => Tone::Destructive,
            Self::Medium => Tone::Warning,
            Self::Low => Tone::Info,
            Self::VeryLow => Tone::Success,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::High => "Critical situation: your home needs urgent preparation.",
            Self::Medium => "Basic preparation, with plenty of room to improve.",
            Self::Low => "Acceptable level, but vulnerabilities remain.",
            Self::VeryLow => "Excellent preparation: a born survivor.",
        }
    }
}

/// Minimum of the positive answers; 0 when nothing positive was given.
#[must_use]
pub fn survival_hours(answers: &[u32]) -> u32 {
    answers.iter().copied().filter(|h| *h > 0).min().unwrap_or(0)
}

/// Single-pass walk through [`SURVEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyRunner {
    answers: [u32; 3],
    position: usize,
}

impl SurveyRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Question currently asked, `None` once the survey is done.
    #[must_use]
    pub fn current(&self) -> Option<&'static SurveyQuestion> {
        SURVEY.get(self.position)
    }

    /// 1-based position for "question n of m" displays.
    #[must_use]
    pub const fn question_number(&self) -> usize {
        self.position + 1
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.position >= SURVEY.len()
    }

    /// Answer the current question. Unknown options are ignored.
    pub fn answer(&mut self, option_index: usize) -> Option<u32> {
        let question = self.current()?;
        let option = question.options.get(option_index)?;
        self.answers[question.resource.index()] = option.hours;
        self.position += 1;
        Some(option.hours)
    }

    #[must_use]
    pub fn hours_for(&self, resource: Resource) -> u32 {
        self.answers[resource.index()]
    }

    /// Final estimate, available once every question is answered.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::SurveyIncomplete`] while questions remain.
    pub fn outcome(&self) -> Result<SurveyOutcome, OnboardingError> {
        if !self.is_complete() {
            return Err(OnboardingError::SurveyIncomplete);
        }
        let hours = survival_hours(&self.answers);
        Ok(SurveyOutcome {
            survival_hours: hours,
            risk: RiskLevel::from_hours(hours),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOutcome {
    pub survival_hours: u32,
    pub risk: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_more_than_three_chars() {
        assert_eq!(Email::parse("a@b"), Err(OnboardingError::EmailTooShort));
        assert_eq!(Email::parse(""), Err(OnboardingError::EmailTooShort));
        assert_eq!(Email::parse("a@bc").unwrap().as_str(), "a@bc");
        assert!(Email::parse("not-an-email").is_ok());
    }

    #[test]
    fn weakest_resource_decides() {
        assert_eq!(survival_hours(&[48, 72, 16]), 16);
        assert_eq!(survival_hours(&[0, 24, 0]), 24);
        assert_eq!(survival_hours(&[]), 0);
    }

    #[test]
    fn risk_bands() {
        assert_eq!(RiskLevel::from_hours(2), RiskLevel::High);
        assert_eq!(RiskLevel::from_hours(8), RiskLevel::High);
        assert_eq!(RiskLevel::from_hours(9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_hours(24), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_hours(48), RiskLevel::Low);
        assert_eq!(RiskLevel::from_hours(49), RiskLevel::VeryLow);
    }

    #[test]
    fn runner_walks_every_question_once() {
        let mut runner = SurveyRunner::new();
        assert_eq!(runner.outcome(), Err(OnboardingError::SurveyIncomplete));
        assert_eq!(runner.current().unwrap().resource, Resource::Water);
        assert_eq!(runner.answer(9), None);
        assert_eq!(runner.answer(3), Some(48));
        assert_eq!(runner.answer(2), Some(48));
        assert_eq!(runner.question_number(), 3);
        assert_eq!(runner.answer(1), Some(8));
        assert!(runner.is_complete());
        assert_eq!(runner.answer(0), None);
        assert_eq!(runner.hours_for(Resource::Food), 48);

        let outcome = runner.outcome().unwrap();
        assert_eq!(outcome.survival_hours, 8);
        assert_eq!(outcome.risk, RiskLevel::High);
        assert_eq!(outcome.risk.tone(), Tone::Destructive);
        assert!(outcome.risk.message().starts_with("Critical"));
    }
}
