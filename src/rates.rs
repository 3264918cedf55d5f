//! Converts two cumulative snapshots into per-category CPU percentages.
//!
//! Both snapshots are normalized to per-logical-CPU cycles; the elapsed
//! cycles between them give the scale that turns each category delta into a
//! percentage. Nothing here touches the OS or the metric sink.

use crate::error::RateError;
use crate::system::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    User,
    System,
    Iowait,
    Idle,
    Stolen,
    Guest,
}

impl Category {
    /// Emission order of the category gauges.
    pub const ALL: [Category; 6] = [
        Category::User,
        Category::System,
        Category::Iowait,
        Category::Idle,
        Category::Stolen,
        Category::Guest,
    ];

    pub fn metric_name(self) -> &'static str {
        match self {
            Category::User => "system.cpu.user",
            Category::System => "system.cpu.system",
            Category::Iowait => "system.cpu.iowait",
            Category::Idle => "system.cpu.idle",
            Category::Stolen => "system.cpu.stolen",
            Category::Guest => "system.cpu.guest",
        }
    }

    fn cumulative(self, snapshot: &Snapshot) -> f64 {
        let t = &snapshot.times;
        match self {
            Category::User => t.user,
            Category::System => t.system,
            Category::Iowait => t.iowait,
            Category::Idle => t.idle,
            Category::Stolen => t.stolen,
            Category::Guest => t.guest,
        }
    }
}

/// Percentages of elapsed CPU time per category. Values are not clamped to
/// 100; a category whose counter went backwards is floored at 0 and listed
/// in `floored`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateResult {
    pub user: f64,
    pub system: f64,
    pub iowait: f64,
    pub idle: f64,
    pub stolen: f64,
    pub guest: f64,
    pub floored: Vec<Category>,
}

impl RateResult {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::User => self.user,
            Category::System => self.system,
            Category::Iowait => self.iowait,
            Category::Idle => self.idle,
            Category::Stolen => self.stolen,
            Category::Guest => self.guest,
        }
    }

    fn set(&mut self, category: Category, value: f64) {
        let slot = match category {
            Category::User => &mut self.user,
            Category::System => &mut self.system,
            Category::Iowait => &mut self.iowait,
            Category::Idle => &mut self.idle,
            Category::Stolen => &mut self.stolen,
            Category::Guest => &mut self.guest,
        };
        *slot = value;
    }

    /// `(metric name, percentage)` pairs in emission order.
    pub fn gauges(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Category::ALL
            .into_iter()
            .map(|c| (c.metric_name(), self.get(c)))
    }

    pub fn total(&self) -> f64 {
        Category::ALL.into_iter().map(|c| self.get(c)).sum()
    }
}

pub fn compute_rates(prev: &Snapshot, curr: &Snapshot) -> Result<RateResult, RateError> {
    if curr.logical_cpus == 0 || prev.logical_cpus == 0 {
        return Err(RateError::NoLogicalCpus);
    }
    if prev.logical_cpus != curr.logical_cpus {
        return Err(RateError::LogicalCpuMismatch {
            prev: prev.logical_cpus,
            curr: curr.logical_cpus,
        });
    }

    let delta_cycles = curr.cycles() - prev.cycles();
    if delta_cycles == 0.0 || !delta_cycles.is_finite() {
        return Err(RateError::InsufficientElapsedTime { delta_cycles });
    }
    if delta_cycles < 0.0 {
        return Err(RateError::CounterWentBackwards { delta_cycles });
    }

    let cpus = curr.logical_cpus as f64;
    let scale = 100.0 / delta_cycles;

    let mut result = RateResult::default();
    for category in Category::ALL {
        let delta = (category.cumulative(curr) - category.cumulative(prev)) / cpus;
        let rate = delta * scale;
        if rate < 0.0 {
            result.floored.push(category);
            result.set(category, 0.0);
        } else {
            result.set(category, rate);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::CpuTimes;

    fn snapshot(user: f64, system: f64, idle: f64, cpus: usize) -> Snapshot {
        Snapshot::new(
            CpuTimes {
                user,
                system,
                idle,
                ..CpuTimes::default()
            },
            cpus,
        )
    }

    #[test]
    fn four_cpu_example() {
        let prev = snapshot(100.0, 50.0, 850.0, 4);
        let curr = snapshot(140.0, 70.0, 990.0, 4);
        let rates = compute_rates(&prev, &curr).unwrap();

        assert_eq!(rates.user, 20.0);
        assert_eq!(rates.system, 10.0);
        assert_eq!(rates.idle, 70.0);
        assert_eq!(rates.iowait, 0.0);
        assert_eq!(rates.stolen, 0.0);
        assert_eq!(rates.guest, 0.0);
        assert!(rates.floored.is_empty());
        assert!((rates.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn gauges_use_fixed_names_in_order() {
        let prev = snapshot(100.0, 50.0, 850.0, 4);
        let curr = snapshot(140.0, 70.0, 990.0, 4);
        let names: Vec<_> = compute_rates(&prev, &curr)
            .unwrap()
            .gauges()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "system.cpu.user",
                "system.cpu.system",
                "system.cpu.iowait",
                "system.cpu.idle",
                "system.cpu.stolen",
                "system.cpu.guest",
            ]
        );
    }

    #[test]
    fn all_categories_sum_to_100() {
        let prev = Snapshot::new(
            CpuTimes {
                user: 1000.0,
                system: 400.0,
                idle: 8000.0,
                iowait: 120.0,
                stolen: 30.0,
                guest: 50.0,
            },
            8,
        );
        let curr = Snapshot::new(
            CpuTimes {
                user: 1800.0,
                system: 650.0,
                idle: 9900.0,
                iowait: 180.0,
                stolen: 45.0,
                guest: 90.0,
            },
            8,
        );
        let rates = compute_rates(&prev, &curr).unwrap();
        assert!((rates.total() - 100.0).abs() < 1e-9);
        assert!(rates.iowait > 0.0 && rates.stolen > 0.0 && rates.guest > 0.0);
    }

    #[test]
    fn identical_snapshots_do_not_divide_by_zero() {
        let snap = snapshot(100.0, 50.0, 850.0, 4);
        assert_eq!(
            compute_rates(&snap, &snap),
            Err(RateError::InsufficientElapsedTime { delta_cycles: 0.0 })
        );
    }

    #[test]
    fn counter_reset_is_reported() {
        let prev = snapshot(140.0, 70.0, 990.0, 4);
        let curr = snapshot(10.0, 5.0, 85.0, 4);
        assert!(matches!(
            compute_rates(&prev, &curr),
            Err(RateError::CounterWentBackwards { .. })
        ));
    }

    #[test]
    fn negative_category_delta_is_floored_and_flagged() {
        // system went backwards while the total still advanced
        let prev = snapshot(100.0, 50.0, 850.0, 1);
        let curr = snapshot(160.0, 40.0, 900.0, 1);
        let rates = compute_rates(&prev, &curr).unwrap();
        assert_eq!(rates.system, 0.0);
        assert_eq!(rates.floored, vec![Category::System]);
        assert_eq!(rates.user, 60.0);
        assert_eq!(rates.idle, 50.0);
    }

    #[test]
    fn zero_cpu_snapshots_are_rejected() {
        let prev = snapshot(100.0, 50.0, 850.0, 0);
        let curr = snapshot(140.0, 70.0, 990.0, 0);
        assert_eq!(compute_rates(&prev, &curr), Err(RateError::NoLogicalCpus));
    }

    #[test]
    fn cpu_count_change_is_rejected() {
        let prev = snapshot(100.0, 50.0, 850.0, 4);
        let curr = snapshot(140.0, 70.0, 990.0, 8);
        assert_eq!(
            compute_rates(&prev, &curr),
            Err(RateError::LogicalCpuMismatch { prev: 4, curr: 8 })
        );
    }
}
