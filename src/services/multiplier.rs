use crate::constants::{MULTIPLIER_BUCKETS, MULTIPLIER_PER_FEATURED_NFT};

/// Ladder contribution for one count input. Buckets are inclusive on the
/// lower bound; the highest bucket whose bound the count reaches wins.
pub fn bucket_multiplier(count: u64) -> f64 {
    let mut contribution = 0.0;
    for (lower_bound, value) in MULTIPLIER_BUCKETS {
        if count >= lower_bound {
            contribution = value;
        }
    }
    contribution
}

/// Damage multiplier for a player: transaction count and follower count each
/// go through the bucket ladder, every featured NFT held adds a flat 0.5.
pub fn damage_multiplier(tx_count: u64, follower_count: u64, nft_count: u64) -> f64 {
    bucket_multiplier(tx_count)
        + bucket_multiplier(follower_count)
        + MULTIPLIER_PER_FEATURED_NFT * nft_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn bucket_boundaries_are_inclusive_lower_bounds() {
        assert_close(bucket_multiplier(0), 0.0);
        assert_close(bucket_multiplier(1), 0.2);
        assert_close(bucket_multiplier(10), 0.2);
        assert_close(bucket_multiplier(11), 0.4);
        assert_close(bucket_multiplier(20), 0.4);
        assert_close(bucket_multiplier(21), 0.6);
        assert_close(bucket_multiplier(40), 0.6);
        assert_close(bucket_multiplier(41), 0.8);
        assert_close(bucket_multiplier(100), 0.8);
        assert_close(bucket_multiplier(101), 1.2);
        assert_close(bucket_multiplier(1_000_000), 1.2);
    }

    #[test]
    fn multiplier_sums_three_contributions() {
        // 5 txs (0.2) + 0 followers (0.0) + 2 featured NFTs (1.0)
        assert_close(damage_multiplier(5, 0, 2), 1.2);
        // 101 txs (1.2) + 50 followers (0.8) + no NFTs
        assert_close(damage_multiplier(101, 50, 0), 2.0);
        assert_close(damage_multiplier(0, 0, 0), 0.0);
    }

    #[test]
    fn multiplier_is_monotonic_in_each_input() {
        let mut previous = bucket_multiplier(0);
        for count in 1..=200 {
            let current = bucket_multiplier(count);
            assert!(current >= previous, "ladder decreased at {count}");
            previous = current;
        }

        for nft in 0..10u64 {
            assert!(damage_multiplier(0, 0, nft + 1) > damage_multiplier(0, 0, nft));
        }
    }
}
