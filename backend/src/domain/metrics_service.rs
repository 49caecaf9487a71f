//! Derived metrics computed from the profile and the raw log collection.
//!
//! Everything here is pure: no storage, no clock. Callers pass `today`.

use chrono::{Datelike, Duration, NaiveDate};
use shared::{
    BmiCategory, BmiReading, BodyMeasures, DailyLog, DashboardSummary, GrowthDeviation, GrowthLabel,
    GrowthReferencePoint, LogCategory, TrendPoint, UserProfile,
};

use crate::domain::growth_reference::GROWTH_STANDARD;

pub const ADULT_AGE_YEARS: i32 = 18;
const TREND_DAYS: i64 = 7;
/// Percent height difference beyond which a child is labelled one band off
const GROWTH_BAND_PERCENT: f64 = 5.0;

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Clone, Default)]
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    /// Height and weight in effect now.
    ///
    /// The body log with the latest date supplies each measure it carries
    /// (the earliest inserted wins among logs of the same date). A measure
    /// the log lacks falls back to the profile's stored value.
    pub fn current_body_measures(&self, profile: Option<&UserProfile>, logs: &[DailyLog]) -> BodyMeasures {
        let latest = logs
            .iter()
            .filter(|log| log.category == LogCategory::Body)
            .fold(None::<&DailyLog>, |best, log| match best {
                Some(current) if current.date >= log.date => Some(current),
                _ => Some(log),
            });

        let positive = |v: f64| if v > 0.0 { Some(v) } else { None };
        let profile_height = profile.and_then(|p| positive(p.height));
        let profile_weight = profile.and_then(|p| positive(p.weight));

        BodyMeasures {
            height_cm: latest.and_then(DailyLog::body_height).or(profile_height),
            weight_kg: latest.and_then(DailyLog::body_weight).or(profile_weight),
        }
    }

    /// weight / (height in m)^2, undefined when either measure is missing or zero
    pub fn calculate_bmi(&self, height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
        let height = height_cm.filter(|h| *h > 0.0)?;
        let weight = weight_kg.filter(|w| *w > 0.0)?;
        let meters = height / 100.0;
        Some(weight / (meters * meters))
    }

    pub fn classify_bmi(&self, bmi: Option<f64>) -> BmiCategory {
        match bmi {
            None => BmiCategory::Unknown,
            Some(v) if v < 18.5 => BmiCategory::Underweight,
            Some(v) if v < 25.0 => BmiCategory::Normal,
            Some(_) => BmiCategory::Overweight,
        }
    }

    /// BMI and its band. The band is taken from the one-decimal value that
    /// gets displayed, so the label always agrees with the number shown.
    pub fn bmi_reading(&self, measures: &BodyMeasures) -> BmiReading {
        let value = self.calculate_bmi(measures.height_cm, measures.weight_kg);
        BmiReading {
            value,
            category: self.classify_bmi(value.map(round_one_decimal)),
        }
    }

    /// BMI rounded to one decimal, or `--` when undefined
    pub fn bmi_display(&self, reading: &BmiReading) -> String {
        match reading.value {
            Some(v) => format!("{:.1}", round_one_decimal(v)),
            None => "--".to_string(),
        }
    }

    /// Month-granular age: day of month is deliberately ignored
    pub fn age_in_months(&self, birth_date: NaiveDate, today: NaiveDate) -> i32 {
        (today.year() - birth_date.year()) * 12 + (today.month() as i32 - birth_date.month() as i32)
    }

    /// Calendar age in whole years
    pub fn age_in_years(&self, birth_date: NaiveDate, today: NaiveDate) -> i32 {
        let mut years = today.year() - birth_date.year();
        if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
            years -= 1;
        }
        years
    }

    pub fn is_birthday(&self, birth_date: NaiveDate, today: NaiveDate) -> bool {
        birth_date.month() == today.month() && birth_date.day() == today.day()
    }

    /// Child mode default offered during onboarding
    pub fn suggest_child_mode(&self, birth_date: NaiveDate, today: NaiveDate) -> bool {
        self.age_in_years(birth_date, today) < ADULT_AGE_YEARS
    }

    /// Child mode left on for someone who is now an adult
    pub fn child_mode_mismatch(&self, profile: &UserProfile, today: NaiveDate) -> bool {
        profile.is_child_mode && self.age_in_years(profile.birth_date, today) >= ADULT_AGE_YEARS
    }

    /// Reference point with the closest age; equidistant points resolve to the earlier age
    pub fn closest_reference(&self, age_months: i32) -> GrowthReferencePoint {
        let mut best = GROWTH_STANDARD[0];
        for point in GROWTH_STANDARD.iter().skip(1) {
            if (point.age_months - age_months).abs() < (best.age_months - age_months).abs() {
                best = *point;
            }
        }
        best
    }

    /// Approximate height deviation from the reference curve.
    ///
    /// The label is a visualization band, not a clinical percentile.
    pub fn growth_deviation_for(&self, age_months: i32, height_cm: f64) -> GrowthDeviation {
        let reference = self.closest_reference(age_months);
        let percent_difference = (height_cm - reference.height_cm) / reference.height_cm * 100.0;

        let label = if percent_difference > GROWTH_BAND_PERCENT {
            GrowthLabel::PlusOneSd
        } else if percent_difference < -GROWTH_BAND_PERCENT {
            GrowthLabel::MinusOneSd
        } else {
            GrowthLabel::Standard
        };

        GrowthDeviation {
            age_months,
            reference,
            percent_difference,
            label,
        }
    }

    /// Growth deviation for a child-mode profile with both measures known
    pub fn growth_deviation(
        &self,
        profile: &UserProfile,
        measures: &BodyMeasures,
        today: NaiveDate,
    ) -> Option<GrowthDeviation> {
        if !profile.is_child_mode {
            return None;
        }
        let height = measures.height_cm?;
        measures.weight_kg?;

        let age_months = self.age_in_months(profile.birth_date, today);
        Some(self.growth_deviation_for(age_months, height))
    }

    /// Mood and stress for the seven days ending today, oldest first.
    ///
    /// The first matching entry of a day wins; nothing is averaged.
    pub fn weekly_trend(&self, logs: &[DailyLog], today: NaiveDate) -> Vec<TrendPoint> {
        let first_value = |date: NaiveDate, category: LogCategory| {
            logs.iter()
                .find(|log| log.date == date && log.category == category)
                .map(|log| log.value)
        };

        (0..TREND_DAYS)
            .rev()
            .map(|days_back| {
                let date = today - Duration::days(days_back);
                TrendPoint {
                    date,
                    mood: first_value(date, LogCategory::Mood),
                    stress: first_value(date, LogCategory::Stress),
                }
            })
            .collect()
    }

    pub fn dashboard_summary(&self, profile: &UserProfile, logs: &[DailyLog], today: NaiveDate) -> DashboardSummary {
        let measures = self.current_body_measures(Some(profile), logs);
        let bmi = self.bmi_reading(&measures);

        DashboardSummary {
            growth: self.growth_deviation(profile, &measures, today),
            weekly_trend: self.weekly_trend(logs, today),
            is_birthday: self.is_birthday(profile.birth_date, today),
            age_years: self.age_in_years(profile.birth_date, today),
            child_mode_mismatch: self.child_mode_mismatch(profile, today),
            measures,
            bmi,
        }
    }
}
