//! Minimal ICS (RFC 5545) calendar export - one VEVENT per assignment.

use std::fmt::Write as _;

use chrono::Duration;

use super::Schedule;

pub fn export_ics(schedule: &Schedule) -> String {
    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR\r\n");
    out.push_str("VERSION:2.0\r\n");
    out.push_str("PRODID:-//dutyweave//schedule//EN\r\n");

    for (physician, assignments) in &schedule.assignments {
        for a in assignments {
            let dtend = a.end_date + Duration::days(1); // ICS DTEND is exclusive
            out.push_str("BEGIN:VEVENT\r\n");
            let _ = writeln!(out, "SUMMARY:{} \u{2212} {}\r", a.task, physician);
            let _ = writeln!(out, "DTSTART;VALUE=DATE:{}\r", a.start_date.format("%Y%m%d"));
            let _ = writeln!(out, "DTEND;VALUE=DATE:{}\r", dtend.format("%Y%m%d"));
            let _ = writeln!(
                out,
                "DESCRIPTION:Physician: {physician}\\nTask: {}\\nScore: {}\r",
                a.task, a.score
            );
            out.push_str("END:VEVENT\r\n");
        }
    }

    out.push_str("END:VCALENDAR\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Assignment;
    use chrono::NaiveDate;

    #[test]
    fn dtend_is_exclusive_one_day_past_end_date() {
        let mut schedule = Schedule::default();
        schedule.assignments.insert(
            "Dr. Alpha".into(),
            vec![Assignment {
                task: "CTU_A".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
                days: (13..=17)
                    .map(|d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap())
                    .collect(),
                score: 0.0,
            }],
        );

        let ics = export_ics(&schedule);
        assert!(ics.contains("DTSTART;VALUE=DATE:20250113"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250118"));
        assert!(ics.contains("SUMMARY:CTU_A \u{2212} Dr. Alpha"));
    }
}
