//! Dawn/dusk window calculation.
//!
//! The window for a run is derived from the sun's position at the configured
//! coordinates on "today", where today is taken from the wall clock after the
//! configured hour offset has been applied. Both instants are expressed in UTC
//! at second precision, matching how frames are partitioned on disk.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::Deserialize;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

use crate::common::constants::{MAXIMUM_HOUR_OFFSET, MINIMUM_HOUR_OFFSET};
use crate::error::WindowError;
use crate::frames::TimeInstant;

/// Which solar depression angle marks dawn and dusk.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Twilight {
    /// Sunrise to sunset (upper limb on the horizon, -0.833°).
    Horizon,
    /// Civil twilight, sun 6° below the horizon.
    #[default]
    Civil,
    /// Nautical twilight, sun 12° below the horizon.
    Nautical,
    /// Astronomical twilight, sun 18° below the horizon.
    Astronomical,
}

impl Twilight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Twilight::Horizon => "horizon",
            Twilight::Civil => "civil",
            Twilight::Nautical => "nautical",
            Twilight::Astronomical => "astronomical",
        }
    }

    /// Solar elevation in degrees at which the event occurs.
    pub fn elevation(&self) -> f64 {
        match self {
            Twilight::Horizon => -0.833,
            Twilight::Civil => -6.0,
            Twilight::Nautical => -12.0,
            Twilight::Astronomical => -18.0,
        }
    }

    fn dawn_event(&self) -> SolarEvent {
        match self {
            Twilight::Horizon => SolarEvent::Sunrise,
            Twilight::Civil => SolarEvent::Dawn(DawnType::Civil),
            Twilight::Nautical => SolarEvent::Dawn(DawnType::Nautical),
            Twilight::Astronomical => SolarEvent::Dawn(DawnType::Astronomical),
        }
    }

    fn dusk_event(&self) -> SolarEvent {
        match self {
            Twilight::Horizon => SolarEvent::Sunset,
            Twilight::Civil => SolarEvent::Dusk(DawnType::Civil),
            Twilight::Nautical => SolarEvent::Dusk(DawnType::Nautical),
            Twilight::Astronomical => SolarEvent::Dusk(DawnType::Astronomical),
        }
    }
}

impl std::str::FromStr for Twilight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizon" => Ok(Twilight::Horizon),
            "civil" => Ok(Twilight::Civil),
            "nautical" => Ok(Twilight::Nautical),
            "astronomical" => Ok(Twilight::Astronomical),
            other => Err(format!(
                "unknown twilight '{other}' (expected horizon, civil, nautical or astronomical)"
            )),
        }
    }
}

/// The `[dawn, dusk]` range selected for one run.
///
/// `start` and `end` are the partition-key forms of `dawn` and `dusk`. They
/// may fall on different calendar days, months or years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub dawn: DateTime<Utc>,
    pub dusk: DateTime<Utc>,
    pub start: TimeInstant,
    pub end: TimeInstant,
}

impl Window {
    pub fn new(dawn: DateTime<Utc>, dusk: DateTime<Utc>, month_offset_correction: bool) -> Self {
        let dawn = truncate_to_second(dawn);
        let dusk = truncate_to_second(dusk);

        Self {
            dawn,
            dusk,
            start: TimeInstant::from_utc(dawn, month_offset_correction),
            end: TimeInstant::from_utc(dusk, month_offset_correction),
        }
    }

    /// Whether dawn and dusk fall into different day partitions.
    pub fn spans_days(&self) -> bool {
        self.start.year != self.end.year || self.start.month_day_key() != self.end.month_day_key()
    }
}

/// Inputs to a window calculation that stay fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarWindowCalculator {
    pub latitude: f64,
    pub longitude: f64,
    /// Hours added to the wall clock before picking the date.
    pub hour_offset: f64,
    pub twilight: Twilight,
    pub month_offset_correction: bool,
}

impl SolarWindowCalculator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            hour_offset: 0.0,
            twilight: Twilight::default(),
            month_offset_correction: false,
        }
    }

    pub fn with_hour_offset(mut self, hour_offset: f64) -> Self {
        self.hour_offset = hour_offset;
        self
    }

    pub fn with_twilight(mut self, twilight: Twilight) -> Self {
        self.twilight = twilight;
        self
    }

    pub fn with_month_offset_correction(mut self, enabled: bool) -> Self {
        self.month_offset_correction = enabled;
        self
    }

    /// The calendar date the window is computed for.
    pub fn target_date(&self, now: DateTime<Utc>) -> Result<NaiveDate, WindowError> {
        if !self.hour_offset.is_finite()
            || !(MINIMUM_HOUR_OFFSET..=MAXIMUM_HOUR_OFFSET).contains(&self.hour_offset)
        {
            return Err(WindowError::OffsetOutOfRange(self.hour_offset));
        }

        let offset = Duration::seconds((self.hour_offset * 3600.0).round() as i64);
        Ok((now + offset).date_naive())
    }

    /// Compute dawn and dusk for the date `now` falls on after the hour offset.
    pub fn compute_window(&self, now: DateTime<Utc>) -> Result<Window, WindowError> {
        let invalid = WindowError::InvalidCoordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid);
        }
        let coordinates = Coordinates::new(self.latitude, self.longitude).ok_or(invalid)?;

        let date = self.target_date(now)?;

        if !event_occurs(self.latitude, date, self.twilight.elevation()) {
            return Err(WindowError::EventNotFound {
                event: "dawn",
                date,
                latitude: self.latitude,
            });
        }

        let solar_day = SolarDay::new(coordinates, date);
        let dawn = solar_day.event_time(self.twilight.dawn_event());
        let dusk = solar_day.event_time(self.twilight.dusk_event());

        // Near the polar threshold the solar model can diverge from the
        // declination estimate; anything not anchored to `date` is unusable.
        if !near_date(dawn, date) {
            return Err(WindowError::EventNotFound {
                event: "dawn",
                date,
                latitude: self.latitude,
            });
        }
        if !near_date(dusk, date) || dusk <= dawn {
            return Err(WindowError::EventNotFound {
                event: "dusk",
                date,
                latitude: self.latitude,
            });
        }

        Ok(Window::new(dawn, dusk, self.month_offset_correction))
    }
}

/// Convenience wrapper around [`SolarWindowCalculator::compute_window`].
pub fn compute_window(
    now: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    hour_offset: f64,
) -> Result<Window, WindowError> {
    SolarWindowCalculator::new(latitude, longitude)
        .with_hour_offset(hour_offset)
        .compute_window(now)
}

/// Whether the sun crosses `elevation` at all on `date` at `latitude`.
///
/// Uses the cosine of the hour angle with an approximate solar declination;
/// outside `[-1, 1]` the sun stays entirely above (polar day) or below
/// (polar night) the requested elevation.
pub fn event_occurs(latitude: f64, date: NaiveDate, elevation: f64) -> bool {
    let day_of_year = f64::from(date.ordinal());
    let declination =
        (-23.44_f64).to_radians() * ((360.0 / 365.0) * (day_of_year + 10.0)).to_radians().cos();
    let phi = latitude.to_radians();

    let cos_hour_angle = (elevation.to_radians().sin() - phi.sin() * declination.sin())
        / (phi.cos() * declination.cos());

    cos_hour_angle.is_finite() && (-1.0..=1.0).contains(&cos_hour_angle)
}

fn near_date(at: DateTime<Utc>, date: NaiveDate) -> bool {
    at.date_naive().signed_duration_since(date).num_days().abs() <= 1
}

fn truncate_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}
