/// Something that happened during a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    ModuleStarted { module: String },
    ModuleSkipped { module: String, reason: SkipReason },
    ClassRendered { name: String },
    EnumRendered { name: String },
    Warning { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Ignored,
    NothingToEmit,
}

/// Explicit sink for render events
pub trait RenderObserver {
    fn on_event(&mut self, event: RenderEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {
    fn on_event(&mut self, _event: RenderEvent) {}
}

impl RenderObserver for Vec<RenderEvent> {
    fn on_event(&mut self, event: RenderEvent) {
        self.push(event);
    }
}
