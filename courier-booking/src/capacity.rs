use crate::models::Trip;

/// Comparison granularity for fractional mass units.
pub const EPSILON_KG: f64 = 1e-6;

#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    #[error("capacity exceeded: requested {requested} kg, remaining {remaining} kg")]
    Exceeded { requested: f64, remaining: f64 },

    #[error("reservation would strand {remainder} kg below the {floor} kg floor")]
    UnusableRemainder { remainder: f64, floor: f64 },

    #[error("invalid reservation amount: {0} kg")]
    InvalidAmount(f64),
}

/// Owns a trip's declared and consumed capacity.
///
/// Remaining capacity is always computed from the trip record inside the
/// current transaction; nothing here is cached across transactions.
#[derive(Debug, Clone, Copy)]
pub struct CapacityLedger {
    floor_kg: f64,
}

impl CapacityLedger {
    pub fn new(floor_kg: f64) -> Self {
        Self { floor_kg }
    }

    pub fn floor_kg(&self) -> f64 {
        self.floor_kg
    }

    pub fn remaining(&self, trip: &Trip) -> f64 {
        (trip.total_capacity_kg - trip.consumed_kg).max(0.0)
    }

    /// Whether a reservation of `amount` would be accepted right now.
    ///
    /// Exact fits are allowed; anything that would leave a sliver between
    /// zero and the configured floor is rejected as unusable.
    pub fn check(&self, trip: &Trip, amount: f64) -> Result<(), CapacityError> {
        if !(amount > 0.0) {
            return Err(CapacityError::InvalidAmount(amount));
        }
        let remaining = self.remaining(trip);
        if amount > remaining + EPSILON_KG {
            return Err(CapacityError::Exceeded {
                requested: amount,
                remaining,
            });
        }
        let remainder = remaining - amount;
        if remainder > EPSILON_KG && remainder < self.floor_kg - EPSILON_KG {
            return Err(CapacityError::UnusableRemainder {
                remainder,
                floor: self.floor_kg,
            });
        }
        Ok(())
    }

    /// Consume capacity for a booking. Must run inside the same atomic unit
    /// as booking creation so the check and the reservation cannot race.
    pub fn reserve(&self, trip: &mut Trip, amount: f64) -> Result<(), CapacityError> {
        self.check(trip, amount)?;
        trip.consumed_kg = (trip.consumed_kg + amount).min(trip.total_capacity_kg);
        trip.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Return capacity to the pool when a booking is cancelled before
    /// delivery completion.
    pub fn release(&self, trip: &mut Trip, amount: f64) {
        trip.consumed_kg = (trip.consumed_kg - amount).max(0.0);
        trip.updated_at = chrono::Utc::now();
    }
}
