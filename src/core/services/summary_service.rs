use chrono::NaiveDate;

use super::LogRepository;
use crate::domain::LogEntry;

/// Spending recorded on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Spending grouped under one category (case-insensitive grouping, first
/// casing wins).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn daily(repo: &LogRepository, date: NaiveDate) -> DailySummary {
        let (total, count) = repo
            .entries_on(date)
            .fold((0.0, 0), |(total, count), entry| (total + entry.amount, count + 1));
        DailySummary { date, total, count }
    }

    /// Category totals, largest first. Restricted to a single day when `date`
    /// is given.
    pub fn totals_by_category(repo: &LogRepository, date: Option<NaiveDate>) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        let entries: Box<dyn Iterator<Item = &LogEntry> + '_> = match date {
            Some(day) => Box::new(repo.entries_on(day)),
            None => Box::new(repo.entries().iter()),
        };
        for entry in entries {
            let key = entry.category.trim().to_lowercase();
            match totals
                .iter_mut()
                .find(|existing| existing.category.to_lowercase() == key)
            {
                Some(existing) => {
                    existing.total += entry.amount;
                    existing.count += 1;
                }
                None => totals.push(CategoryTotal {
                    category: entry.category.trim().to_string(),
                    total: entry.amount,
                    count: 1,
                }),
            }
        }
        totals.sort_by(|a, b| b.total.total_cmp(&a.total));
        totals
    }
}
