//! Alignment arithmetic shared by the router, the fallback allocator, and the
//! builtin strategies.

/// Minimum natural alignment on this platform. Every normalized alignment is
/// at least this large, matching what `malloc` itself guarantees.
pub const MIN_ALIGNMENT: usize = std::mem::align_of::<libc::max_align_t>();

/// Returns true if `value` is a non-zero power of two.
#[must_use]
pub const fn is_power_of_two(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Maps any requested alignment (including 0) to the smallest power of two
/// that is >= both the platform minimum and the request. Requests above the
/// largest representable power of two saturate to it instead of wrapping.
///
/// Idempotent: normalizing an already-normalized value returns it unchanged.
#[must_use]
pub fn normalize_alignment(requested: usize) -> usize {
    const MAX_POW2: usize = 1 << (usize::BITS - 1);
    requested
        .max(MIN_ALIGNMENT)
        .checked_next_power_of_two()
        .unwrap_or(MAX_POW2)
}

/// Rounds `addr` up to the next multiple of `alignment`, clamping to the
/// highest aligned address when the sum would wrap.
///
/// `alignment` must be a non-zero power of two; callers normalize first.
#[must_use]
pub fn align_up(addr: usize, alignment: usize) -> usize {
    debug_assert!(is_power_of_two(alignment));
    match addr.checked_add(alignment - 1) {
        Some(sum) => sum & !(alignment - 1),
        None => usize::MAX & !(alignment - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_detection() {
        assert!(!is_power_of_two(0));
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(!is_power_of_two(3));
        assert!(is_power_of_two(4096));
        assert!(!is_power_of_two(4097));
    }

    #[test]
    fn normalization_respects_platform_minimum() {
        assert_eq!(normalize_alignment(0), MIN_ALIGNMENT);
        assert_eq!(normalize_alignment(1), MIN_ALIGNMENT);
        assert_eq!(normalize_alignment(MIN_ALIGNMENT), MIN_ALIGNMENT);
    }

    #[test]
    fn normalization_rounds_to_power_of_two() {
        assert_eq!(normalize_alignment(24), 32);
        assert_eq!(normalize_alignment(33), 64);
        assert_eq!(normalize_alignment(64), 64);
    }

    #[test]
    fn normalization_is_idempotent() {
        for requested in [0usize, 1, 3, 7, 16, 24, 100, 512, 4096, usize::MAX] {
            let once = normalize_alignment(requested);
            assert_eq!(normalize_alignment(once), once);
            assert!(is_power_of_two(once));
        }
    }

    #[test]
    fn normalization_saturates_on_extreme_requests() {
        const MAX_POW2: usize = 1 << (usize::BITS - 1);
        assert_eq!(normalize_alignment(usize::MAX), MAX_POW2);
        assert_eq!(normalize_alignment(MAX_POW2 + 1), MAX_POW2);
        assert_eq!(normalize_alignment(MAX_POW2), MAX_POW2);
        assert!(is_power_of_two(normalize_alignment(usize::MAX)));
    }

    #[test]
    fn align_up_rounds_to_boundary() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(16, 16), 16);
        assert_eq!(align_up(17, 32), 32);
        assert_eq!(align_up(65, 64), 128);
    }

    #[test]
    fn align_up_clamps_instead_of_wrapping() {
        let clamped = align_up(usize::MAX - 3, 64);
        assert_eq!(clamped, usize::MAX & !63);
        assert_eq!(clamped % 64, 0);
        assert_eq!(align_up(usize::MAX, 16), usize::MAX & !15);
    }
}
