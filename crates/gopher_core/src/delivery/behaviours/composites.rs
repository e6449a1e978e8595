//! Composite behaviours: sequences and selectors.

use crate::delivery::behaviours::{Activity, Behaviour, Status};

/// Ticks children in order, failing fast.
///
/// A terminal sequence restarts from its first child on the next tick.
pub struct Sequence {
    name: String,
    children: Vec<Box<dyn Behaviour>>,
    cursor: usize,
    status: Status,
}

impl Sequence {
    pub fn new(name: &str, children: Vec<Box<dyn Behaviour>>) -> Self {
        Self { name: name.to_string(), children, cursor: 0, status: Status::Invalid }
    }

    /// The child the sequence is currently parked on, if any.
    pub fn current_child(&self) -> Option<&dyn Behaviour> {
        self.children.get(self.cursor).map(|child| child.as_ref())
    }
}

impl Behaviour for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) -> Status {
        if self.children.is_empty() {
            self.status = Status::Success;
            return self.status;
        }
        if matches!(self.status, Status::Success | Status::Failure) {
            for child in &mut self.children {
                child.reset();
            }
            self.cursor = 0;
        }
        while self.cursor < self.children.len() {
            match self.children[self.cursor].tick() {
                Status::Success => self.cursor += 1,
                Status::Running => {
                    self.status = Status::Running;
                    return self.status;
                }
                Status::Failure | Status::Invalid => {
                    self.status = Status::Failure;
                    return self.status;
                }
            }
        }
        self.status = Status::Success;
        self.status
    }

    fn status(&self) -> Status {
        self.status
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.cursor = 0;
        self.status = Status::Invalid;
    }

    fn feedback_message(&self) -> String {
        if self.status == Status::Running {
            self.current_child().map(|child| child.feedback_message()).unwrap_or_default()
        } else {
            String::new()
        }
    }

    fn activity(&self) -> Option<Activity> {
        if self.status == Status::Running {
            self.current_child().and_then(|child| child.activity())
        } else {
            None
        }
    }
}

/// Ticks children in priority order, succeeding fast.
///
/// Memory-less: every tick re-evaluates from the highest priority child, so
/// a higher-priority branch can pre-empt a running lower-priority one. The
/// pre-empted child is reset.
pub struct Selector {
    name: String,
    children: Vec<Box<dyn Behaviour>>,
    running_child: Option<usize>,
    status: Status,
}

impl Selector {
    pub fn new(name: &str, children: Vec<Box<dyn Behaviour>>) -> Self {
        Self { name: name.to_string(), children, running_child: None, status: Status::Invalid }
    }

    pub fn current_child(&self) -> Option<&dyn Behaviour> {
        self.running_child.and_then(|index| self.children.get(index)).map(|child| child.as_ref())
    }
}

impl Behaviour for Selector {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) -> Status {
        if self.children.is_empty() {
            self.status = Status::Success;
            return self.status;
        }
        for index in 0..self.children.len() {
            let status = self.children[index].tick();
            match status {
                Status::Running | Status::Success => {
                    if let Some(previous) = self.running_child
                        && previous > index
                    {
                        self.children[previous].reset();
                    }
                    self.running_child = (status == Status::Running).then_some(index);
                    self.status = status;
                    return self.status;
                }
                Status::Failure | Status::Invalid => continue,
            }
        }
        self.running_child = None;
        self.status = Status::Failure;
        self.status
    }

    fn status(&self) -> Status {
        self.status
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.running_child = None;
        self.status = Status::Invalid;
    }

    fn feedback_message(&self) -> String {
        self.current_child().map(|child| child.feedback_message()).unwrap_or_default()
    }

    fn activity(&self) -> Option<Activity> {
        self.current_child().and_then(|child| child.activity())
    }
}

/// A sequence that latches its first terminal status.
///
/// Once the inner sequence has succeeded or failed, further ticks return
/// the latched status without ticking children. The delivery run uses this
/// so a finished run keeps its outcome until the coordinator swaps it out.
pub struct OneshotSequence {
    inner: Sequence,
    latched: Option<Status>,
}

impl OneshotSequence {
    pub fn new(name: &str, children: Vec<Box<dyn Behaviour>>) -> Self {
        Self { inner: Sequence::new(name, children), latched: None }
    }

    pub fn current_child(&self) -> Option<&dyn Behaviour> {
        self.inner.current_child()
    }
}

impl Behaviour for OneshotSequence {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn tick(&mut self) -> Status {
        if let Some(status) = self.latched {
            return status;
        }
        let status = self.inner.tick();
        if matches!(status, Status::Success | Status::Failure) {
            self.latched = Some(status);
        }
        status
    }

    fn status(&self) -> Status {
        self.latched.unwrap_or_else(|| self.inner.status())
    }

    fn reset(&mut self) {
        self.latched = None;
        self.inner.reset();
    }

    fn feedback_message(&self) -> String {
        self.inner.feedback_message()
    }

    fn activity(&self) -> Option<Activity> {
        if self.latched.is_none() { self.inner.activity() } else { None }
    }
}
