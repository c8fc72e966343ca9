/// Monetary units
///
/// Coins are stored as droplets, a fixed-point integer with six decimal
/// places. Coin hours are whole units that accrue on every output at one
/// hour per whole coin held for an hour, and are burned as fees.
///
/// Number of droplets in one coin
pub const DROPLETS_PER_COIN: u64 = 1_000_000;

/// Maximum number of whole coins that will ever exist
pub const MAX_COIN_SUPPLY: u64 = 2_800_000_000;

/// Seconds it takes for one whole coin to accrue one hour
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Coin hours an output holds at time `now`.
///
/// Saturates instead of overflowing, and never goes below the hours the
/// output was created with even if `now` precedes its creation.
pub fn coin_hours(coins: u64, hours: u64, created: u64, now: u64) -> u64 {
    if now <= created {
        return hours;
    }
    let elapsed_hours = (now - created) / SECONDS_PER_HOUR;
    let whole_coins = coins / DROPLETS_PER_COIN;
    hours.saturating_add(elapsed_hours.saturating_mul(whole_coins))
}

/// Utility functions for monetary conversions
pub mod conversions {
    use super::*;

    pub fn coins_to_droplets(coins: u64) -> Option<u64> {
        coins.checked_mul(DROPLETS_PER_COIN)
    }

    pub fn droplets_to_coins(droplets: u64) -> f64 {
        droplets as f64 / DROPLETS_PER_COIN as f64
    }

    pub fn format_droplets(droplets: u64) -> String {
        format!(
            "{}.{:06}",
            droplets / DROPLETS_PER_COIN,
            droplets % DROPLETS_PER_COIN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::conversions::*;
    use super::*;

    #[test]
    fn test_coin_hours_accrue_per_whole_coin_hour() {
        let coins = 10 * DROPLETS_PER_COIN;
        assert_eq!(coin_hours(coins, 5, 1000, 1000), 5);
        assert_eq!(coin_hours(coins, 5, 1000, 1000 + 3599), 5);
        assert_eq!(coin_hours(coins, 5, 1000, 1000 + 3600), 15);
        assert_eq!(coin_hours(coins, 5, 1000, 1000 + 7200), 25);
    }

    #[test]
    fn test_coin_hours_ignore_fractional_coins() {
        assert_eq!(coin_hours(DROPLETS_PER_COIN / 2, 0, 0, 10 * 3600), 0);
    }

    #[test]
    fn test_coin_hours_before_creation() {
        assert_eq!(coin_hours(DROPLETS_PER_COIN, 7, 5000, 10), 7);
    }

    #[test]
    fn test_coin_hours_saturate() {
        assert_eq!(coin_hours(u64::MAX, u64::MAX - 1, 0, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(coins_to_droplets(3), Some(3_000_000));
        assert_eq!(coins_to_droplets(u64::MAX), None);
        assert_eq!(format_droplets(1_500_000), "1.500000");
        assert!((droplets_to_coins(2_500_000) - 2.5).abs() < f64::EPSILON);
        assert_eq!(
            coins_to_droplets(MAX_COIN_SUPPLY),
            Some(2_800_000_000_000_000)
        );
    }
}
