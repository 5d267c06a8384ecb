use anyhow::{anyhow, Result};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::debug;
use std::time::Duration;

/// Interval between refreshes for an fps cap; a cap of zero is treated as one.
pub fn frame_interval(fps_cap: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps_cap.max(1) as f64)
}

/// Registers repeating per-frame callbacks on a calloop event loop.
pub struct FrameScheduler<'l, D> {
    handle: LoopHandle<'l, D>,
    interval: Duration,
}

impl<'l, D> FrameScheduler<'l, D> {
    pub fn new(handle: LoopHandle<'l, D>, interval: Duration) -> Self {
        Self { handle, interval }
    }

    /// Calls `callback` once per frame interval until the handle is cancelled or dropped.
    pub fn request_frames<F>(&self, name: &'static str, mut callback: F) -> Result<FrameHandle<'l, D>>
    where
        F: FnMut(&mut D) + 'l,
    {
        let interval = self.interval;
        let token = self
            .handle
            .insert_source(Timer::from_duration(interval), move |_, _, data| {
                callback(data);
                TimeoutAction::ToDuration(interval)
            })
            .map_err(|e| anyhow!("failed to register {} frames: {}", name, e.error))?;
        debug!("{} frames every {:?}", name, interval);

        Ok(FrameHandle {
            name,
            handle: self.handle.clone(),
            token: Some(token),
        })
    }
}

/// Live registration of a frame callback. Dropping it stops the callback.
pub struct FrameHandle<'l, D> {
    name: &'static str,
    handle: LoopHandle<'l, D>,
    token: Option<RegistrationToken>,
}

impl<D> FrameHandle<'_, D> {
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
            debug!("{} frames cancelled", self.name);
        }
    }
}

impl<D> Drop for FrameHandle<'_, D> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;

    fn pump(event_loop: &mut EventLoop<u32>, count: &mut u32, rounds: usize) {
        for _ in 0..rounds {
            event_loop
                .dispatch(Some(Duration::from_millis(5)), count)
                .unwrap();
        }
    }

    #[test]
    fn interval_from_fps_cap() {
        assert_eq!(frame_interval(50), Duration::from_millis(20));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn callback_repeats_until_cancelled() {
        let mut event_loop: EventLoop<u32> = EventLoop::try_new().unwrap();
        let scheduler = FrameScheduler::new(event_loop.handle(), Duration::from_millis(1));
        let mut handle = scheduler.request_frames("test", |n: &mut u32| *n += 1).unwrap();

        let mut count = 0;
        pump(&mut event_loop, &mut count, 10);
        assert!(count >= 2, "ran {} times", count);

        handle.cancel();
        assert!(!handle.is_active());
        let before = count;
        pump(&mut event_loop, &mut count, 5);
        assert_eq!(count, before);
    }

    #[test]
    fn dropping_the_handle_cancels() {
        let mut event_loop: EventLoop<u32> = EventLoop::try_new().unwrap();
        let scheduler = FrameScheduler::new(event_loop.handle(), Duration::from_millis(1));
        let handle = scheduler.request_frames("dropped", |n: &mut u32| *n += 1).unwrap();
        drop(handle);

        let mut count = 0;
        pump(&mut event_loop, &mut count, 5);
        assert_eq!(count, 0);
    }

    #[test]
    fn independent_callbacks_both_run() {
        let mut event_loop: EventLoop<u32> = EventLoop::try_new().unwrap();
        let scheduler = FrameScheduler::new(event_loop.handle(), Duration::from_millis(1));
        let _ones = scheduler.request_frames("ones", |n: &mut u32| *n += 1).unwrap();
        let _hundreds = scheduler.request_frames("hundreds", |n: &mut u32| *n += 100).unwrap();

        let mut count = 0;
        pump(&mut event_loop, &mut count, 10);
        assert!(count % 100 > 0);
        assert!(count >= 100);
    }
}
