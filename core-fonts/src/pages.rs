//! Priority page catalogue.
//!
//! The most commonly read surahs, offered as a default preload set. Which
//! pages a host actually preloads stays the host's decision.

use crate::identity::{FIRST_PAGE, LAST_PAGE};
use std::ops::RangeInclusive;

/// Al-Fatihah
pub const AL_FATIHAH_PAGES: RangeInclusive<u16> = 1..=2;

/// Al-Kahf, read on Fridays
pub const AL_KAHF_PAGES: RangeInclusive<u16> = 293..=304;

/// Yasin
pub const YASIN_PAGES: RangeInclusive<u16> = 440..=445;

/// Ar-Rahman
pub const AR_RAHMAN_PAGES: RangeInclusive<u16> = 531..=534;

/// Al-Mulk
pub const AL_MULK_PAGES: RangeInclusive<u16> = 562..=564;

/// Juz 30, the most memorized part
pub const JUZ_30_PAGES: RangeInclusive<u16> = 582..=604;

/// Every priority page, ascending and without duplicates.
pub fn priority_pages() -> Vec<u16> {
    let mut pages: Vec<u16> = [
        AL_FATIHAH_PAGES,
        AL_KAHF_PAGES,
        YASIN_PAGES,
        AL_MULK_PAGES,
        AR_RAHMAN_PAGES,
        JUZ_30_PAGES,
    ]
    .into_iter()
    .flatten()
    .collect();

    pages.sort_unstable();
    pages.dedup();
    pages
}

/// Every page of the mushaf.
pub fn all_pages() -> Vec<u16> {
    (FIRST_PAGE..=LAST_PAGE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::is_valid_page;

    #[test]
    fn test_priority_pages() {
        let pages = priority_pages();

        assert_eq!(pages.len(), 50);
        assert_eq!(pages.first(), Some(&1));
        assert_eq!(pages.last(), Some(&604));
        assert!(pages.windows(2).all(|w| w[0] < w[1]));
        assert!(pages.iter().all(|&p| is_valid_page(p)));
        assert!(pages.contains(&300));
        assert!(pages.contains(&563));
    }

    #[test]
    fn test_all_pages() {
        let pages = all_pages();
        assert_eq!(pages.len(), 604);
        assert_eq!(pages[0], 1);
        assert_eq!(pages[603], 604);
    }
}
