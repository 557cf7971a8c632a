//! In-memory host document.
//!
//! [`HeadlessDocument`] keeps a ledger of every script attached to it and a
//! queue of scripts that have not been executed yet. It executes nothing by
//! itself; whoever drives the event loop drains [`HeadlessDocument::take_unexecuted`]
//! and runs the components.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::document::{HostDocument, InjectionPoint, ScriptElement};
use crate::error::HostError;
use crate::readiness::{HostEnvironment, ReadinessMechanism};

/// A document that lives only in memory.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    /// Containers present in the document.
    containers: HashSet<InjectionPoint>,
    /// Readiness mechanisms this host can deliver.
    mechanisms: HashSet<ReadinessMechanism>,
    /// Every script ever attached, with the container it went into.
    additions: Vec<(InjectionPoint, ScriptElement)>,
    /// Attached scripts not yet handed to the event loop.
    unexecuted: VecDeque<ScriptElement>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    /// A document with both containers that supports every event mechanism.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: [InjectionPoint::Head, InjectionPoint::Body]
                .into_iter()
                .collect(),
            mechanisms: ReadinessMechanism::PREFERENCE
                .into_iter()
                .filter(|m| m.is_event())
                .collect(),
            additions: Vec::new(),
            unexecuted: VecDeque::new(),
        }
    }

    /// Remove a container, so attaching to it fails.
    #[must_use]
    pub fn without_container(mut self, point: InjectionPoint) -> Self {
        self.containers.remove(&point);
        self
    }

    /// Restrict the readiness mechanisms this host advertises.
    #[must_use]
    pub fn with_mechanisms(
        mut self,
        mechanisms: impl IntoIterator<Item = ReadinessMechanism>,
    ) -> Self {
        self.mechanisms = mechanisms.into_iter().collect();
        self
    }

    /// Every script attached so far, in attach order.
    #[must_use]
    pub fn additions(&self) -> &[(InjectionPoint, ScriptElement)] {
        &self.additions
    }

    /// Scripts attached to one container, in attach order.
    pub fn scripts_in(&self, point: InjectionPoint) -> impl Iterator<Item = &ScriptElement> {
        self.additions
            .iter()
            .filter(move |(p, _)| *p == point)
            .map(|(_, s)| s)
    }

    /// Take the scripts that have been attached but not yet executed.
    pub fn take_unexecuted(&mut self) -> Vec<ScriptElement> {
        self.unexecuted.drain(..).collect()
    }
}

impl HostDocument for HeadlessDocument {
    fn attach_script(
        &mut self,
        script: ScriptElement,
        target: InjectionPoint,
    ) -> Result<(), HostError> {
        if script.src.is_empty() {
            return Err(HostError::EmptySource);
        }
        if !self.containers.contains(&target) {
            return Err(HostError::MissingContainer(target));
        }
        debug!(component = script.component, src = script.src, %target, "script attached");
        self.additions.push((target, script.clone()));
        self.unexecuted.push_back(script);
        Ok(())
    }
}

impl HostEnvironment for HeadlessDocument {
    fn supports(&self, mechanism: ReadinessMechanism) -> bool {
        self.mechanisms.contains(&mechanism)
    }
}
