use crate::UpdateInterval;

/// Decides, in simulation time, when the scope view should be redrawn.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: UpdateInterval,
    next_refresh: i64,
}

impl RefreshSchedule {
    pub fn new(interval: UpdateInterval) -> Self {
        Self {
            interval,
            next_refresh: interval.seconds(),
        }
    }

    pub fn interval(&self) -> UpdateInterval {
        self.interval
    }

    pub fn reset(&mut self) {
        self.next_refresh = self.interval.seconds();
    }

    /// Returns `true` once per crossed refresh boundary. Long simulation steps
    /// that skip several boundaries yield a single refresh.
    pub fn is_due(&mut self, simulation_time: i64) -> bool {
        if simulation_time < self.next_refresh {
            return false;
        }

        let step = self.interval.seconds();
        self.next_refresh = (simulation_time / step + 1) * step;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_refreshes_once_per_hour() {
        let mut schedule = RefreshSchedule::new(UpdateInterval::Hourly);
        let due: Vec<_> = [600, 1800, 3600, 3700, 7199, 7200]
            .into_iter()
            .filter(|&time| schedule.is_due(time))
            .collect();

        assert_eq!(due, vec![3600, 7200]);
    }

    #[test]
    fn skipping_several_boundaries_refreshes_once() {
        let mut schedule = RefreshSchedule::new(UpdateInterval::Realtime);
        assert!(schedule.is_due(10));
        assert!(!schedule.is_due(10));
        assert!(schedule.is_due(11));
    }

    #[test]
    fn reset_restarts_from_first_boundary() {
        let mut schedule = RefreshSchedule::new(UpdateInterval::Daily);
        assert!(schedule.is_due(90_000));
        schedule.reset();
        assert!(schedule.is_due(86_400));
    }
}
