//! The driver entity and its validation rules.

use crate::error::{CoreError, CoreResult};
use crate::types::{DriverId, Location};

/// Upper bound of the rating scale.
pub const MAX_RATING: f64 = 5.0;

/// Rating assigned to drivers built without an explicit rating or history.
pub const DEFAULT_RATING: f64 = 5.0;

/// A driver known to the registry.
///
/// Fields are read through accessors; all mutation of registered drivers
/// goes through the registry so that the indexes stay in step.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRecord {
    id: DriverId,
    name: String,
    rating: f64,
    rating_sum: u64,
    rating_count: u32,
    location: Location,
    total_rides: u64,
    tombstoned: bool,
}

impl DriverRecord {
    /// Creates an active driver with the default rating and no history.
    pub fn new(id: u64, name: impl Into<String>, location: Location) -> Self {
        Self {
            id: DriverId::new(id),
            name: name.into(),
            rating: DEFAULT_RATING,
            rating_sum: 0,
            rating_count: 0,
            location,
            total_rides: 0,
            tombstoned: false,
        }
    }

    /// Sets the current rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the lifetime ride count.
    #[must_use]
    pub fn with_total_rides(mut self, rides: u64) -> Self {
        self.total_rides = rides;
        self
    }

    /// Sets the accumulated rating history.
    ///
    /// When `count > 0` the rating is re-derived as `sum / count`.
    #[must_use]
    pub fn with_rating_history(mut self, sum: u64, count: u32) -> Self {
        self.rating_sum = sum;
        self.rating_count = count;
        if count > 0 {
            self.rating = sum as f64 / f64::from(count);
        }
        self
    }

    /// Returns the driver id.
    pub fn id(&self) -> DriverId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current rating.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Returns the sum of all received ratings.
    pub fn rating_sum(&self) -> u64 {
        self.rating_sum
    }

    /// Returns the number of received ratings.
    pub fn rating_count(&self) -> u32 {
        self.rating_count
    }

    /// Returns the current location.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the lifetime ride count.
    pub fn total_rides(&self) -> u64 {
        self.total_rides
    }

    /// Returns true once the driver has been deleted.
    pub fn is_tombstoned(&self) -> bool {
        self.tombstoned
    }

    /// Checks every field a caller can set.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_rating(self.rating)?;
        validate_location(self.location)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub(crate) fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }

    pub(crate) fn set_total_rides(&mut self, rides: u64) {
        self.total_rides = rides;
    }

    pub(crate) fn record_ride(&mut self) {
        self.total_rides = self.total_rides.saturating_add(1);
    }

    pub(crate) fn record_rating(&mut self, stars: u32) {
        self.rating_sum = self.rating_sum.saturating_add(u64::from(stars));
        self.rating_count = self.rating_count.saturating_add(1);
        self.rating = self.rating_sum as f64 / f64::from(self.rating_count);
    }

    pub(crate) fn tombstone(&mut self) {
        self.tombstoned = true;
    }
}

/// A partial update to a registered driver.
///
/// Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New location.
    pub location: Option<Location>,
    /// New rating.
    pub rating: Option<f64>,
    /// New lifetime ride count.
    pub total_rides: Option<u64>,
}

impl DriverUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the driver.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Moves the driver.
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Overrides the rating.
    #[must_use]
    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Overrides the ride count.
    #[must_use]
    pub fn total_rides(mut self, rides: u64) -> Self {
        self.total_rides = Some(rides);
        self
    }

    /// Returns true if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.rating.is_none()
            && self.total_rides.is_none()
    }

    /// Checks every field that is set.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let Some(location) = self.location {
            validate_location(location)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::invalid_field("name", "must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_rating(rating: f64) -> CoreResult<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(CoreError::invalid_field(
            "rating",
            format!("{rating} is outside 0.0..={MAX_RATING}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_location(location: Location) -> CoreResult<()> {
    if !location.is_finite() {
        return Err(CoreError::invalid_field(
            "location",
            format!("coordinates must be finite, got {location}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_stars(stars: u32) -> CoreResult<()> {
    if !(1..=5).contains(&stars) {
        return Err(CoreError::invalid_field(
            "stars",
            format!("{stars} is outside 1..=5"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> DriverRecord {
        DriverRecord::new(1, "Nguyen Van An", Location::new(1.0, 2.0))
    }

    #[test]
    fn new_driver_defaults() {
        let d = driver();
        assert_eq!(d.id(), DriverId::new(1));
        assert_eq!(d.rating(), DEFAULT_RATING);
        assert_eq!(d.rating_count(), 0);
        assert_eq!(d.total_rides(), 0);
        assert!(!d.is_tombstoned());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn history_derives_rating() {
        let d = driver().with_rating(1.0).with_rating_history(9, 2);
        assert_eq!(d.rating(), 4.5);

        // Empty history keeps the explicit rating.
        let d = driver().with_rating(3.2).with_rating_history(0, 0);
        assert_eq!(d.rating(), 3.2);
    }

    #[test]
    fn record_rating_updates_average() {
        let mut d = driver().with_rating_history(4, 1);
        d.record_rating(5);
        assert_eq!(d.rating_sum(), 9);
        assert_eq!(d.rating_count(), 2);
        assert_eq!(d.rating(), 4.5);
    }

    #[test]
    fn validation_failures_name_the_field() {
        let blank = DriverRecord::new(1, "   ", Location::new(0.0, 0.0));
        assert!(matches!(
            blank.validate(),
            Err(CoreError::InvalidField { field: "name", .. })
        ));

        let high = driver().with_rating(5.5);
        assert!(matches!(
            high.validate(),
            Err(CoreError::InvalidField { field: "rating", .. })
        ));

        let nan = driver().with_rating(f64::NAN);
        assert!(nan.validate().is_err());

        let lost = DriverRecord::new(1, "A", Location::new(f64::NAN, 0.0));
        assert!(matches!(
            lost.validate(),
            Err(CoreError::InvalidField {
                field: "location",
                ..
            })
        ));
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(-0.1).is_err());
    }

    #[test]
    fn stars_range() {
        assert!(validate_stars(1).is_ok());
        assert!(validate_stars(5).is_ok());
        assert!(validate_stars(0).is_err());
        assert!(validate_stars(6).is_err());
    }

    #[test]
    fn update_validation() {
        assert!(DriverUpdate::new().is_empty());
        assert!(DriverUpdate::new().name("Le Thi Lan").validate().is_ok());
        assert!(DriverUpdate::new().name("").validate().is_err());
        assert!(DriverUpdate::new().rating(7.0).validate().is_err());
        assert!(DriverUpdate::new()
            .location(Location::new(f64::INFINITY, 0.0))
            .validate()
            .is_err());
    }
}
