pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One-shot UI transition measured against the frame clock.
#[derive(Debug, Clone)]
pub struct Transition {
    pub start_time: f64,
    pub duration: f64,
    pub current_time: f64,
}

impl Transition {
    /// A transition that has already finished, so nothing animates on the first frame.
    pub fn settled(duration: f64) -> Self {
        Self {
            start_time: f64::NEG_INFINITY,
            duration,
            current_time: 0.0,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f64) {
        self.current_time = now;
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn eased_progress(&self) -> f32 {
        ease_out_cubic(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_transition_starts_finished() {
        let mut tr = Transition::settled(0.5);
        tr.update(0.0);
        assert_eq!(tr.progress(), 1.0);
        assert_eq!(tr.eased_progress(), 1.0);
    }

    #[test]
    fn transition_runs_over_its_duration() {
        let mut tr = Transition::settled(0.5);
        tr.start(10.0);
        assert_eq!(tr.progress(), 0.0);
        tr.update(10.25);
        assert!((tr.progress() - 0.5).abs() < 1e-6);
        assert!(tr.eased_progress() > 0.5);
        tr.update(11.0);
        assert_eq!(tr.progress(), 1.0);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }
}
