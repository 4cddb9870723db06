use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Shared stop switch and frame counter for a [`FrameLoop`].
#[derive(Clone, Debug)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
    frames: Rc<Cell<u64>>,
}

impl LoopHandle {
    /// The current frame, if one is running, still completes.
    pub fn stop(&self) {
        if self.running.replace(false) {
            tracing::debug!(frames = self.frames.get(), "frame loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

/// One unit of per-frame work, driven by whoever owns the display clock.
///
/// The browser driver chains `requestAnimationFrame` while [`FrameLoop::tick`]
/// returns `Continue`; tests call `tick` directly. A body returning `Break`
/// stops the loop as if [`LoopHandle::stop`] had been called.
pub struct FrameLoop {
    body: Box<dyn FnMut() -> ControlFlow<()>>,
    handle: LoopHandle,
}

impl FrameLoop {
    pub fn new(body: impl FnMut() -> ControlFlow<()> + 'static) -> Self {
        Self {
            body: Box::new(body),
            handle: LoopHandle {
                running: Rc::new(Cell::new(true)),
                frames: Rc::new(Cell::new(0)),
            },
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Run one frame unless stopped. `Continue` means another frame should be requested.
    pub fn tick(&mut self) -> ControlFlow<()> {
        if !self.handle.is_running() {
            return ControlFlow::Break(());
        }
        let flow = (self.body)();
        self.handle.frames.set(self.handle.frames.get() + 1);
        if flow.is_break() {
            self.handle.stop();
        }

        if self.handle.is_running() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    /// Tick up to `n` times; returns how many frames ran.
    pub fn run_frames(&mut self, n: u64) -> u64 {
        let start = self.handle.frames();
        for _ in 0..n {
            if !self.handle.is_running() {
                break;
            }
            if self.tick().is_break() {
                break;
            }
        }
        self.handle.frames() - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_bounded_frames() {
        let count = Rc::new(Cell::new(0));
        let mut frame_loop = FrameLoop::new({
            let count = count.clone();
            move || {
                count.set(count.get() + 1);
                ControlFlow::Continue(())
            }
        });

        assert_eq!(frame_loop.run_frames(5), 5);
        assert_eq!(count.get(), 5);
        assert_eq!(frame_loop.handle().frames(), 5);
        assert!(frame_loop.handle().is_running());
    }

    #[test]
    fn test_stop_prevents_further_frames() {
        let count = Rc::new(Cell::new(0));
        let mut frame_loop = FrameLoop::new({
            let count = count.clone();
            move || {
                count.set(count.get() + 1);
                ControlFlow::Continue(())
            }
        });
        let handle = frame_loop.handle();

        assert!(frame_loop.tick().is_continue());
        handle.stop();
        assert!(frame_loop.tick().is_break());
        assert_eq!(frame_loop.run_frames(10), 0);
        assert_eq!(count.get(), 1);
        assert!(!handle.is_running());
    }

    #[test]
    fn test_body_can_stop_its_own_loop() {
        let count = Rc::new(Cell::new(0));
        let mut frame_loop = FrameLoop::new({
            let count = count.clone();
            move || {
                count.set(count.get() + 1);
                if count.get() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
            }
        });

        assert_eq!(frame_loop.run_frames(100), 3);
        assert_eq!(count.get(), 3);
        assert!(!frame_loop.handle().is_running());
    }
}
