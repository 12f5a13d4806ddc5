//! Computes the six summary tables from the joined, feature-enriched set.
//!
//! All grouping uses `BTreeMap` (or the fixed category/weekday orders), so
//! row order never depends on hash iteration and repeated runs over the
//! same input produce byte-identical tables.
//!
//! Null grouping keys are excluded from their table rather than bucketed:
//! the exclusion is deliberate, tested, and observable through
//! [`RunStats`](mke_crime_models::RunStats) instead of silent.

use std::collections::BTreeMap;

use chrono::Weekday;
use mke_crime_models::{
    HourlyCount, JoinedRecord, MonthlyCount, MostCommonOffense, NeighborhoodCounts, Offense,
    OffenseTotal, Summaries, WeekdayCount, weekday_name,
};

/// Sunday-first weekday ordering, the fixed tie-break order for
/// [`crimes_by_weekday`].
const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Computes all six summary tables in one pass over the joined set.
#[must_use]
pub fn summarize(joined: &[JoinedRecord]) -> Summaries {
    Summaries {
        crimes_per_month: crimes_per_month(joined),
        crimes_by_hour: crimes_by_hour(joined),
        crimes_by_weekday: crimes_by_weekday(joined),
        crime_type_distribution: crime_type_distribution(joined),
        crimes_per_neighborhood: crimes_per_neighborhood(joined),
        most_common_offense_per_neighborhood: most_common_offense_per_neighborhood(joined),
    }
}

/// Record count per (Year, Month), ascending (Year, Month).
///
/// Records with an unparseable timestamp have null Year/Month and are
/// excluded; the excluded count is observable as
/// `RunStats::unparseable_timestamps`.
#[must_use]
pub fn crimes_per_month(joined: &[JoinedRecord]) -> Vec<MonthlyCount> {
    let mut groups: BTreeMap<(i32, u32), u64> = BTreeMap::new();

    for record in joined {
        if let (Some(year), Some(month)) = (record.year, record.month) {
            *groups.entry((year, month)).or_insert(0) += 1;
        }
    }

    groups
        .into_iter()
        .map(|((year, month), crime_count)| MonthlyCount {
            year,
            month,
            crime_count,
        })
        .collect()
}

/// Record count per hour of day, ascending hour. Null hours are excluded.
#[must_use]
pub fn crimes_by_hour(joined: &[JoinedRecord]) -> Vec<HourlyCount> {
    let mut groups: BTreeMap<u32, u64> = BTreeMap::new();

    for record in joined {
        if let Some(hour) = record.hour {
            *groups.entry(hour).or_insert(0) += 1;
        }
    }

    groups
        .into_iter()
        .map(|(hour, crime_count)| HourlyCount { hour, crime_count })
        .collect()
}

/// Record count per weekday, descending count; ties break by Sunday-first
/// weekday order. Null weekdays are excluded; weekdays with no records do
/// not produce a row.
#[must_use]
pub fn crimes_by_weekday(joined: &[JoinedRecord]) -> Vec<WeekdayCount> {
    let mut counts = [0_u64; 7];

    for record in joined {
        if let Some(weekday) = record.weekday {
            counts[weekday.num_days_from_sunday() as usize] += 1;
        }
    }

    let mut rows: Vec<(usize, u64)> = counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(rank, count)| (rank, *count))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    rows.into_iter()
        .map(|(rank, crime_count)| WeekdayCount {
            weekday: weekday_name(SUNDAY_FIRST[rank]).to_string(),
            crime_count,
        })
        .collect()
}

/// Count of records with each offense flag true, one row per offense in
/// canonical category order.
///
/// A record with multiple true flags contributes to every matching row;
/// this is a reshape over the flag columns, not a single-label
/// classification. The ten rows are the table's schema and appear even
/// with zero counts, independent of join results.
#[must_use]
pub fn crime_type_distribution(joined: &[JoinedRecord]) -> Vec<OffenseTotal> {
    Offense::all()
        .iter()
        .map(|offense| OffenseTotal {
            offense: *offense,
            crime_count: joined
                .iter()
                .filter(|record| record.incident.offenses.get(*offense))
                .count() as u64,
        })
        .collect()
}

/// Per-offense sums per neighborhood plus a `CrimeCount` column equal to
/// the row-wise sum across the ten flags, ascending neighborhood name.
///
/// Records with a null assignment are excluded; the excluded count is
/// observable as `RunStats::unassigned`. A multi-offense record adds one
/// to each of its offense columns, so `CrimeCount` sums flags, not
/// records.
#[must_use]
pub fn crimes_per_neighborhood(joined: &[JoinedRecord]) -> Vec<NeighborhoodCounts> {
    offense_sums_by_neighborhood(joined)
        .into_iter()
        .map(|(name, sums)| NeighborhoodCounts::from_sums(name.to_string(), sums))
        .collect()
}

/// The offense with the maximum summed count per neighborhood, ascending
/// neighborhood name.
///
/// Ties resolve to the first offense in canonical category order, so the
/// result is identical across runs regardless of how the tie arose. A
/// neighborhood whose group sums are all zero reports the first offense
/// with a zero count, matching the reference behavior.
#[must_use]
pub fn most_common_offense_per_neighborhood(joined: &[JoinedRecord]) -> Vec<MostCommonOffense> {
    offense_sums_by_neighborhood(joined)
        .into_iter()
        .map(|(name, sums)| {
            let mut best = Offense::all()[0];
            for offense in Offense::all() {
                if sums[offense.index()] > sums[best.index()] {
                    best = *offense;
                }
            }
            MostCommonOffense {
                neighborhood: name.to_string(),
                offense: best,
                crime_count: sums[best.index()],
            }
        })
        .collect()
}

/// Groups records by assigned neighborhood and sums each offense flag over
/// the group. Null assignments are skipped.
fn offense_sums_by_neighborhood(joined: &[JoinedRecord]) -> BTreeMap<&str, [u64; 10]> {
    let mut groups: BTreeMap<&str, [u64; 10]> = BTreeMap::new();

    for record in joined {
        let Some(name) = record.neighborhood.as_deref() else {
            continue;
        };
        let sums = groups.entry(name).or_insert([0; 10]);
        for offense in Offense::all() {
            if record.incident.offenses.get(*offense) {
                sums[offense.index()] += 1;
            }
        }
    }

    groups
}
