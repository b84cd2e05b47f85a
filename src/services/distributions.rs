//! Per-course chart data: totals for the pie chart, per-period breakdowns
//! for the line and bar charts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::record::RawRecord;
use crate::transformations::cleaning::row_dropout_total;

/// Total dropouts of one course across the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseTotal {
    pub course: String,
    pub total: f64,
}

/// One course's values across the breakdown's period axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSeries {
    pub course: String,
    pub values: Vec<f64>,
}

/// Dropouts per period per course, zero-filled where a course has no rows
/// in a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseBreakdown {
    pub periods: Vec<String>,
    pub courses: Vec<CourseSeries>,
}

/// Compute total dropouts per course, in first-appearance order.
pub fn course_totals(records: &[RawRecord]) -> Vec<CourseTotal> {
    let mut totals: Vec<CourseTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let course = record.get("curso").unwrap_or("").to_string();
        let total = row_dropout_total(record);

        match index.get(&course) {
            Some(&i) => totals[i].total += total,
            None => {
                index.insert(course.clone(), totals.len());
                totals.push(CourseTotal { course, total });
            }
        }
    }

    totals
}

/// Compute the per-period, per-course dropout matrix.
///
/// The period axis holds the distinct `ano.semestre` labels present in the
/// data, sorted; courses keep first-appearance order. Rows sharing a course
/// and period sum together.
pub fn course_period_breakdown(records: &[RawRecord]) -> CourseBreakdown {
    let mut periods: Vec<String> = Vec::new();
    let mut courses: Vec<String> = Vec::new();
    let mut sums: HashMap<(String, String), f64> = HashMap::new();

    for record in records {
        let course = record.get("curso").unwrap_or("").to_string();
        let period = format!(
            "{}.{}",
            record.get("ano").unwrap_or(""),
            record.get("semestre").unwrap_or("")
        );

        if !periods.contains(&period) {
            periods.push(period.clone());
        }
        if !courses.contains(&course) {
            courses.push(course.clone());
        }

        *sums.entry((course, period)).or_insert(0.0) += row_dropout_total(record);
    }

    periods.sort();

    let courses = courses
        .into_iter()
        .map(|course| {
            let values = periods
                .iter()
                .map(|period| {
                    sums.get(&(course.clone(), period.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();
            CourseSeries { course, values }
        })
        .collect();

    CourseBreakdown { periods, courses }
}
