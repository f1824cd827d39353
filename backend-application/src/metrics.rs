use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    predict_requests: AtomicU64,
    predict_fraud: AtomicU64,
    predict_rejected: AtomicU64,
    scoring_errors: AtomicU64,
    notification_sweeps: AtomicU64,
    notifications_dispatched: AtomicU64,
    notification_errors: AtomicU64,
}

impl Metrics {
    pub fn record_prediction(&self, is_fraud: bool) {
        self.predict_requests.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.predict_fraud.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rejected(&self) {
        self.predict_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scoring_error(&self) {
        self.scoring_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, dispatched: usize) {
        self.notification_sweeps.fetch_add(1, Ordering::Relaxed);
        self.notifications_dispatched
            .fetch_add(dispatched as u64, Ordering::Relaxed);
    }

    pub fn record_notification_error(&self) {
        self.notification_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scoring_errors(&self) -> u64 {
        self.scoring_errors.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("fraudlens_predict_requests_total", &self.predict_requests),
            ("fraudlens_predict_fraud_total", &self.predict_fraud),
            ("fraudlens_predict_rejected_total", &self.predict_rejected),
            ("fraudlens_scoring_errors_total", &self.scoring_errors),
            ("fraudlens_notification_sweeps_total", &self.notification_sweeps),
            (
                "fraudlens_notifications_dispatched_total",
                &self.notifications_dispatched,
            ),
            ("fraudlens_notification_errors_total", &self.notification_errors),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {} counter\n{} {}\n",
                name,
                name,
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}
