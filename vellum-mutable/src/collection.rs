//! Mutation tracking shared by the mutable collections.
//!
//! Collections form a tree rooted at the user-held handle. Each one owns a
//! [`MutationMark`] holding a mutated flag and a refcounted link to its
//! parent's mark. The first mutation anywhere below a node walks the chain
//! toward the root, setting flags until it meets one already set — ancestors
//! already known to be dirty never get rewalked.

use std::cell::Cell;
use std::rc::Rc;

use vellum_core::SharedKeys;

/// One link in the upward mutation-propagation chain.
#[derive(Debug)]
pub struct MutationMark {
    mutated: Cell<bool>,
    parent: Option<Rc<MutationMark>>,
}

impl MutationMark {
    fn new(parent: Option<Rc<MutationMark>>) -> Rc<MutationMark> {
        Rc::new(MutationMark {
            mutated: Cell::new(false),
            parent,
        })
    }

    /// Mark this node and every clean ancestor up to the root.
    pub fn mutate(&self) {
        let mut cur: Option<&MutationMark> = Some(self);
        while let Some(mark) = cur {
            if mark.mutated.get() {
                break;
            }
            mark.mutated.set(true);
            cur = mark.parent.as_deref();
        }
    }

    pub fn is_mutated(&self) -> bool {
        self.mutated.get()
    }
}

/// Base state carried by every mutable collection: the mutation mark and the
/// shared-key table that flows to every immutable-dict lookup.
#[derive(Debug)]
pub struct MCollection {
    mark: Rc<MutationMark>,
    shared_keys: Option<Rc<SharedKeys>>,
}

impl MCollection {
    pub fn new(shared_keys: Option<Rc<SharedKeys>>) -> MCollection {
        MCollection {
            mark: MutationMark::new(None),
            shared_keys,
        }
    }

    /// Install this collection under `parent`: mutations here will propagate
    /// into the parent's mark chain, and the parent's shared keys are
    /// inherited when this collection has none of its own.
    pub fn init(&mut self, parent: Option<&MCollection>) {
        self.mark = MutationMark::new(parent.map(|p| p.mark.clone()));
        if let Some(parent) = parent {
            if self.shared_keys.is_none() {
                self.shared_keys = parent.shared_keys.clone();
            }
        }
    }

    #[inline]
    pub fn mutate(&self) {
        self.mark.mutate();
    }

    #[inline]
    pub fn is_mutated(&self) -> bool {
        self.mark.is_mutated()
    }

    pub fn shared_keys(&self) -> Option<&SharedKeys> {
        self.shared_keys.as_deref()
    }

    pub fn shared_keys_handle(&self) -> Option<&Rc<SharedKeys>> {
        self.shared_keys.as_ref()
    }
}

impl Clone for MCollection {
    /// The clone keeps the mutated flag but detaches from the parent chain;
    /// it is an independent root.
    fn clone(&self) -> MCollection {
        MCollection {
            mark: Rc::new(MutationMark {
                mutated: Cell::new(self.mark.mutated.get()),
                parent: None,
            }),
            shared_keys: self.shared_keys.clone(),
        }
    }
}
