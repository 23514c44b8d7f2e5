//! Configured routes.

use chrono::{NaiveDateTime, NaiveTime};

use super::{
    DepartureOption, Location, TransportModes, TravelDate, TravelWhen, WalkSpeed, WalkingDistance,
};

/// A user-configured origin/destination pair with travel preferences.
///
/// Routes are validated once when configuration is loaded and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfig {
    /// Unique route name, as shown to the user
    pub name: String,

    pub from: Location,
    pub to: Location,

    /// Travel date, possibly relative
    pub date: TravelDate,

    /// Travel time; `None` means "now" at each refresh
    pub time: Option<NaiveTime>,

    pub departure_option: DepartureOption,
    pub transport: TransportModes,
    pub walk_speed: WalkSpeed,

    /// Maximum number of connections; `None` means unlimited
    pub max_connections: Option<u32>,

    pub max_walking_distance: WalkingDistance,
}

impl RouteConfig {
    /// Create a route with default preferences.
    pub fn new(name: impl Into<String>, from: Location, to: Location) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            date: TravelDate::default(),
            time: None,
            departure_option: DepartureOption::default(),
            transport: TransportModes::default(),
            walk_speed: WalkSpeed::default(),
            max_connections: None,
            max_walking_distance: WalkingDistance::default(),
        }
    }

    /// Identifier-safe form of the route name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Resolve the configured date/time against the current local time.
    pub fn travel_when(&self, now: NaiveDateTime) -> TravelWhen {
        TravelWhen::resolve(self.date, self.time, now)
    }
}

/// Convert a display name into an identifier fragment.
///
/// Lower-cases ASCII letters, turns every run of other characters into a
/// single underscore, and trims underscores from both ends.
///
/// # Examples
///
/// ```
/// use transperth_server::domain::slugify;
///
/// assert_eq!(slugify("Home → Work"), "home_work");
/// assert_eq!(slugify("  City  Loop 2 "), "city_loop_2");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn route() -> RouteConfig {
        let from = Location::new("Home", None, "-31.95,115.86", None).unwrap();
        let to = Location::new("Work", None, "-31.90,115.80", None).unwrap();
        RouteConfig::new("Morning Commute", from, to)
    }

    #[test]
    fn defaults() {
        let route = route();
        assert_eq!(route.date, TravelDate::Today);
        assert_eq!(route.time, None);
        assert_eq!(route.departure_option, DepartureOption::LeaveAfter);
        assert_eq!(route.walk_speed, WalkSpeed::Normal);
        assert_eq!(route.max_connections, None);
        assert_eq!(route.max_walking_distance.metres(), 2000);
        assert_eq!(route.slug(), "morning_commute");
    }

    #[test]
    fn travel_when_tracks_now() {
        let route = route();
        let now = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        let when = route.travel_when(now);
        assert_eq!(when.date_string(), "2026-05-04");
        assert_eq!(when.time_string(), "06:30");
    }

    #[test]
    fn slug_edge_cases() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("__a__"), "a");
        assert_eq!(slugify("Café 5"), "caf_5");
    }

    proptest! {
        #[test]
        fn slug_is_identifier_safe(name in ".{0,40}") {
            let slug = slugify(&name);

            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!slug.starts_with('_'));
            prop_assert!(!slug.ends_with('_'));
            prop_assert!(!slug.contains("__"));
        }

        #[test]
        fn slug_is_idempotent(name in ".{0,40}") {
            let once = slugify(&name);
            prop_assert_eq!(slugify(&once), once.clone());
        }
    }
}
