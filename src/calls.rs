use crate::db_types::{Call, NewCall};
use crate::error::AppError;
use crate::types::{CallStats, DayVolume, MissedCallsPercentage};

use sqlx::{Pool, Postgres};
use time::{Duration, OffsetDateTime, Weekday};
use tracing::{debug, error};

/// Store one call record verbatim.
pub async fn create_call(pool: &Pool<Postgres>, call: NewCall) -> Result<Call, AppError> {
    sqlx::query_as::<_, Call>(
        r#"
        insert into calls (
          user_id,
          "timestamp",
          duration_seconds,
          rating,
          appointment_booked,
          notes,
          call_type
        ) values ($1, $2, $3, $4, $5, $6, $7)
        returning *
        "#,
    )
    .bind(call.user_id)
    .bind(call.timestamp)
    .bind(call.duration_seconds)
    .bind(call.rating)
    .bind(call.appointment_booked)
    .bind(call.notes)
    .bind(call.call_type)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        error!(error=%e, "failed to insert call row");
        AppError::StorageUnavailable(e)
    })
}

/// All of a user's calls, newest first.
pub async fn list_calls(pool: &Pool<Postgres>, user_id: i32) -> Result<Vec<Call>, AppError> {
    sqlx::query_as::<_, Call>(
        r#"
        select *
        from calls
        where user_id = $1
        order by "timestamp" desc
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error=%e, "failed to fetch call rows");
        AppError::StorageUnavailable(e)
    })
}

/// Weekly stats over the trailing seven days ending now.  Only rows inside
/// the window ever reach the reducer.
pub async fn call_stats(pool: &Pool<Postgres>, user_id: i32) -> Result<CallStats, AppError> {
    let now = OffsetDateTime::now_utc();
    let window_start = now - Duration::days(7);
    let calls = sqlx::query_as::<_, Call>(
        r#"
        select *
        from calls
        where user_id = $1
          and "timestamp" >= $2
        "#,
    )
    .bind(user_id)
    .bind(window_start)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error=%e, "failed to fetch call rows for the stats window");
        AppError::StorageUnavailable(e)
    })?;
    debug!(user_id, calls = calls.len(), "computing weekly call stats");

    Ok(compute_call_stats(&calls, now))
}

/// Reduce one user's trailing-week calls to dashboard metrics.  `now` marks
/// the end of the window: the service passes wall-clock UTC, tests pass a
/// fixed instant.
pub fn compute_call_stats(calls: &[Call], now: OffsetDateTime) -> CallStats {
    let total_calls = calls.len();
    let appointments_booked = calls.iter().filter(|c| c.appointment_booked).count();

    // Missing durations and ratings count as zero rather than being skipped.
    let total_duration: i64 = calls
        .iter()
        .map(|c| i64::from(c.duration_seconds.unwrap_or(0)))
        .sum();
    let avg_duration_seconds = if total_calls > 0 {
        (total_duration as f64 / total_calls as f64).round() as i64
    } else {
        0
    };
    let avg_duration = format!("{}:{:02}", avg_duration_seconds / 60, avg_duration_seconds % 60);

    let total_rating: f64 = calls
        .iter()
        .map(|c| f64::from(c.rating.unwrap_or(0.0)))
        .sum();
    let avg_rating = if total_calls > 0 {
        round1(total_rating / total_calls as f64)
    } else {
        0.0
    };

    let call_to_appointment_rate = if total_calls > 0 {
        round1(appointments_booked as f64 / total_calls as f64 * 100.0)
    } else {
        0.0
    };

    // One bucket per calendar day, generated today-first and then flipped so
    // the sequence reads oldest to newest.
    let mut weekly_call_volume: Vec<DayVolume> = (0..7)
        .map(|i| {
            let date = (now - Duration::days(i)).date();
            let count = calls.iter().filter(|c| c.timestamp.date() == date).count();
            DayVolume {
                day: weekday_abbrev(date.weekday()).to_string(),
                calls: count,
            }
        })
        .collect();
    weekly_call_volume.reverse();

    // Strictly-greater scan: the chronologically first bucket wins ties.
    let mut top = &weekly_call_volume[0];
    for bucket in &weekly_call_volume[1..] {
        if bucket.calls > top.calls {
            top = bucket;
        }
    }
    let top_performing_day = top.day.clone();

    let mut hour_counts = [0usize; 24];
    for call in calls {
        hour_counts[usize::from(call.timestamp.hour())] += 1;
    }
    // The lowest hour wins ties.
    let mut peak_hour = 0;
    for (hour, count) in hour_counts.iter().enumerate() {
        if *count > hour_counts[peak_hour] {
            peak_hour = hour;
        }
    }
    let peak_call_hours = format!("{peak_hour}:00");

    CallStats {
        total_calls,
        appointments_booked,
        avg_duration,
        avg_rating,
        call_to_appointment_rate,
        missed_calls_percentage: MissedCallsPercentage::NotComputed,
        weekly_call_volume,
        top_performing_day,
        peak_call_hours,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // A Wednesday, so the reversed week runs Thu..Wed.
    const NOW: OffsetDateTime = datetime!(2024-05-15 12:00 UTC);

    fn call(
        timestamp: OffsetDateTime,
        duration_seconds: Option<i32>,
        rating: Option<f32>,
        appointment_booked: bool,
    ) -> Call {
        Call {
            id: 0,
            user_id: 1,
            timestamp,
            duration_seconds,
            rating,
            appointment_booked,
            notes: None,
            call_type: "inquiry".to_string(),
        }
    }

    #[test]
    fn two_call_example() {
        let calls = vec![
            call(datetime!(2024-05-15 9:05 UTC), Some(120), Some(4.0), true),
            call(datetime!(2024-05-14 9:40 UTC), Some(180), Some(3.0), false),
        ];
        let stats = compute_call_stats(&calls, NOW);

        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.appointments_booked, 1);
        assert_eq!(stats.avg_duration, "2:30");
        assert_eq!(stats.avg_rating, 3.5);
        assert_eq!(stats.call_to_appointment_rate, 50.0);
        assert_eq!(stats.peak_call_hours, "9:00");
    }

    #[test]
    fn no_calls_still_produces_well_defined_stats() {
        let stats = compute_call_stats(&[], NOW);

        assert_eq!(stats.total_calls, 0);
        assert_eq!(stats.appointments_booked, 0);
        assert_eq!(stats.avg_duration, "0:00");
        assert_eq!(stats.avg_rating, 0.0);
        assert_eq!(stats.call_to_appointment_rate, 0.0);
        assert_eq!(stats.peak_call_hours, "0:00");
        // All buckets empty, so the chronologically first day wins.
        assert_eq!(stats.top_performing_day, "Thu");
        assert!(stats.weekly_call_volume.iter().all(|d| d.calls == 0));
    }

    #[test]
    fn weekly_buckets_run_oldest_to_newest_and_sum_to_total() {
        let calls = vec![
            call(datetime!(2024-05-15 8:00 UTC), None, None, false),
            call(datetime!(2024-05-13 10:15 UTC), Some(60), None, true),
            call(datetime!(2024-05-13 19:30 UTC), Some(90), Some(5.0), false),
            call(datetime!(2024-05-09 23:59 UTC), None, Some(2.0), false),
        ];
        let stats = compute_call_stats(&calls, NOW);

        let days: Vec<&str> = stats
            .weekly_call_volume
            .iter()
            .map(|d| d.day.as_str())
            .collect();
        assert_eq!(days, ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);

        let total: usize = stats.weekly_call_volume.iter().map(|d| d.calls).sum();
        assert_eq!(total, stats.total_calls);
        assert_eq!(stats.weekly_call_volume[0].calls, 1); // Thu, May 9
        assert_eq!(stats.weekly_call_volume[4].calls, 2); // Mon, May 13
        assert_eq!(stats.weekly_call_volume[6].calls, 1); // Wed, today
    }

    #[test]
    fn top_day_tie_goes_to_the_chronologically_first() {
        let calls = vec![
            call(datetime!(2024-05-13 10:00 UTC), None, None, false), // Mon
            call(datetime!(2024-05-14 10:00 UTC), None, None, false), // Tue
        ];
        let stats = compute_call_stats(&calls, NOW);
        assert_eq!(stats.top_performing_day, "Mon");
    }

    #[test]
    fn top_day_prefers_strictly_higher_volume() {
        let calls = vec![
            call(datetime!(2024-05-13 10:00 UTC), None, None, false),
            call(datetime!(2024-05-14 10:00 UTC), None, None, false),
            call(datetime!(2024-05-14 16:00 UTC), None, None, false),
        ];
        let stats = compute_call_stats(&calls, NOW);
        assert_eq!(stats.top_performing_day, "Tue");
    }

    #[test]
    fn peak_hour_tie_goes_to_the_lowest_hour() {
        let calls = vec![
            call(datetime!(2024-05-15 14:00 UTC), None, None, false),
            call(datetime!(2024-05-14 9:00 UTC), None, None, false),
        ];
        let stats = compute_call_stats(&calls, NOW);
        assert_eq!(stats.peak_call_hours, "9:00");
    }

    #[test]
    fn missing_durations_and_ratings_count_as_zero() {
        let calls = vec![
            call(datetime!(2024-05-15 9:00 UTC), None, None, false),
            call(datetime!(2024-05-15 10:00 UTC), Some(300), Some(4.0), false),
        ];
        let stats = compute_call_stats(&calls, NOW);

        assert_eq!(stats.avg_duration, "2:30");
        assert_eq!(stats.avg_rating, 2.0);
    }

    #[test]
    fn booking_rate_stays_within_bounds() {
        let calls = vec![
            call(datetime!(2024-05-15 9:00 UTC), None, None, true),
            call(datetime!(2024-05-14 9:00 UTC), None, None, true),
            call(datetime!(2024-05-13 9:00 UTC), None, None, true),
        ];
        let stats = compute_call_stats(&calls, NOW);

        assert!(stats.appointments_booked <= stats.total_calls);
        assert!(stats.call_to_appointment_rate >= 0.0);
        assert!(stats.call_to_appointment_rate <= 100.0);
        assert_eq!(stats.call_to_appointment_rate, 100.0);
    }

    #[test]
    fn rate_rounds_to_one_decimal_place() {
        // 1 of 3 booked: 33.333... rounds to 33.3.
        let calls = vec![
            call(datetime!(2024-05-15 9:00 UTC), None, None, true),
            call(datetime!(2024-05-14 9:00 UTC), None, None, false),
            call(datetime!(2024-05-13 9:00 UTC), None, None, false),
        ];
        let stats = compute_call_stats(&calls, NOW);
        assert_eq!(stats.call_to_appointment_rate, 33.3);
    }
}
