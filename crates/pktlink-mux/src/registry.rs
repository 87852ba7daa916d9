use std::fmt;

use pktlink_frame::{is_reserved, SubRecord};
use tracing::trace;

use crate::error::{MuxError, Result};
use crate::slots::SlotArena;

/// Receives sub-records for a program.
///
/// The record borrows the receive buffer and is only valid for the call.
/// Handlers run synchronously inside [`Multiplexer::poll`](crate::Multiplexer::poll)
/// and should return quickly.
pub trait Handler: Send {
    fn handle(&mut self, record: &SubRecord<'_>);
}

impl<F> Handler for F
where
    F: FnMut(&SubRecord<'_>) + Send,
{
    fn handle(&mut self, record: &SubRecord<'_>) {
        self(record)
    }
}

/// The two hooks that live outside the program table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Fires for records whose program has no registration.
    Unknown,
    /// Fires for every parsed record.
    All,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Unknown => f.write_str("unknown-program"),
            Hook::All => f.write_str("all-programs"),
        }
    }
}

struct Registration {
    program: u8,
    handler: Box<dyn Handler>,
}

/// Program ID to handler table, plus the unknown and observe-all hooks.
pub struct RegistrationTable {
    slots: SlotArena<Registration>,
    unknown: Option<Box<dyn Handler>>,
    all: Option<Box<dyn Handler>>,
}

impl RegistrationTable {
    /// Allocate a table with `capacity` registration slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SlotArena::new(capacity),
            unknown: None,
            all: None,
        }
    }

    /// Drop every registration and reallocate with `capacity` slots.
    ///
    /// Hooks are kept. Returns how many registrations were discarded.
    pub fn reset(&mut self, capacity: usize) -> usize {
        let discarded = self.slots.len();
        self.slots = SlotArena::new(capacity);
        discarded
    }

    /// Total registration slots.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Registered programs.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no program is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `program` has a handler.
    pub fn is_registered(&self, program: u8) -> bool {
        self.slots.position(|r| r.program == program).is_some()
    }

    /// Registered program IDs in slot order.
    pub fn programs(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots.iter().map(|(_, r)| r.program)
    }

    /// Attach a handler for `program` in the lowest free slot.
    pub fn attach<H: Handler + 'static>(&mut self, program: u8, handler: H) -> Result<usize> {
        if is_reserved(program) {
            return Err(MuxError::ReservedProgram(program));
        }
        if self.is_registered(program) {
            return Err(MuxError::AlreadyRegistered(program));
        }

        let registration = Registration {
            program,
            handler: Box::new(handler),
        };
        self.slots
            .insert(registration)
            .map_err(|_| MuxError::RegistryFull {
                capacity: self.slots.capacity(),
            })
    }

    /// Remove the handler for `program`.
    pub fn detach(&mut self, program: u8) -> Result<()> {
        if is_reserved(program) {
            return Err(MuxError::ReservedProgram(program));
        }
        let index = self
            .slots
            .position(|r| r.program == program)
            .ok_or(MuxError::NotRegistered(program))?;
        self.slots.take(index);
        Ok(())
    }

    /// Set the handler for records with no registration.
    pub fn attach_unknown<H: Handler + 'static>(&mut self, handler: H) -> Result<()> {
        attach_hook(&mut self.unknown, Hook::Unknown, handler)
    }

    /// Clear the unknown-program handler.
    pub fn detach_unknown(&mut self) -> Result<()> {
        detach_hook(&mut self.unknown, Hook::Unknown)
    }

    /// Set the handler that sees every record.
    pub fn attach_all<H: Handler + 'static>(&mut self, handler: H) -> Result<()> {
        attach_hook(&mut self.all, Hook::All, handler)
    }

    /// Clear the observe-all handler.
    pub fn detach_all(&mut self) -> Result<()> {
        detach_hook(&mut self.all, Hook::All)
    }

    /// Whether a hook has a handler.
    pub fn has_hook(&self, hook: Hook) -> bool {
        match hook {
            Hook::Unknown => self.unknown.is_some(),
            Hook::All => self.all.is_some(),
        }
    }

    /// Route one record.
    ///
    /// Every registration for the record's program runs in slot order. If
    /// none matched, the unknown hook runs. The observe-all hook always runs
    /// last. Returns the number of registrations that matched.
    pub fn dispatch(&mut self, record: &SubRecord<'_>) -> usize {
        let mut matched = 0;
        for (_, registration) in self
            .slots
            .iter_mut()
            .filter(|(_, r)| r.program == record.program())
        {
            registration.handler.handle(record);
            matched += 1;
        }

        if matched == 0 {
            if let Some(handler) = self.unknown.as_mut() {
                trace!(program = record.program(), "no registration; running unknown hook");
                handler.handle(record);
            }
        }
        if let Some(handler) = self.all.as_mut() {
            handler.handle(record);
        }
        matched
    }
}

impl Default for RegistrationTable {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_PROGRAMS)
    }
}

impl fmt::Debug for RegistrationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationTable")
            .field("capacity", &self.capacity())
            .field("programs", &self.programs().collect::<Vec<_>>())
            .field("unknown", &self.unknown.is_some())
            .field("all", &self.all.is_some())
            .finish()
    }
}

fn attach_hook<H: Handler + 'static>(
    slot: &mut Option<Box<dyn Handler>>,
    hook: Hook,
    handler: H,
) -> Result<()> {
    if slot.is_some() {
        return Err(MuxError::HookAttached(hook));
    }
    *slot = Some(Box::new(handler));
    Ok(())
}

fn detach_hook(slot: &mut Option<Box<dyn Handler>>, hook: Hook) -> Result<()> {
    slot.take().map(|_| ()).ok_or(MuxError::HookDetached(hook))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Log = Arc<Mutex<Vec<(&'static str, u8, Vec<u8>)>>>;

    fn recorder(log: &Log, tag: &'static str) -> impl Handler + 'static {
        let log = Arc::clone(log);
        move |record: &SubRecord<'_>| {
            log.lock()
                .unwrap()
                .push((tag, record.program(), record.payload().to_vec()));
        }
    }

    #[test]
    fn attach_rejects_duplicates_until_detached() {
        let log = Log::default();
        let mut table = RegistrationTable::new(4);

        table.attach(7, recorder(&log, "first")).unwrap();
        assert!(matches!(
            table.attach(7, recorder(&log, "second")),
            Err(MuxError::AlreadyRegistered(7))
        ));

        table.detach(7).unwrap();
        table.attach(7, recorder(&log, "second")).unwrap();

        table.dispatch(&SubRecord::new(7, b"x"));
        assert_eq!(log.lock().unwrap()[0].0, "second");
    }

    #[test]
    fn attach_rejects_reserved_and_full() {
        let log = Log::default();
        let mut table = RegistrationTable::new(1);
        assert!(matches!(
            table.attach(0xFF, recorder(&log, "x")),
            Err(MuxError::ReservedProgram(0xFF))
        ));
        assert!(matches!(
            table.attach(0x00, recorder(&log, "x")),
            Err(MuxError::ReservedProgram(0x00))
        ));
        table.attach(1, recorder(&log, "x")).unwrap();
        assert!(matches!(
            table.attach(2, recorder(&log, "y")),
            Err(MuxError::RegistryFull { capacity: 1 })
        ));
    }

    #[test]
    fn detach_rejects_reserved_and_missing() {
        let mut table = RegistrationTable::new(2);
        assert!(matches!(
            table.detach(0xFF),
            Err(MuxError::ReservedProgram(0xFF))
        ));
        assert!(matches!(table.detach(3), Err(MuxError::NotRegistered(3))));
    }

    #[test]
    fn attach_reuses_lowest_free_slot() {
        let log = Log::default();
        let mut table = RegistrationTable::new(3);
        table.attach(1, recorder(&log, "a")).unwrap();
        table.attach(2, recorder(&log, "b")).unwrap();
        table.detach(1).unwrap();
        assert_eq!(table.attach(3, recorder(&log, "c")).unwrap(), 0);
        assert_eq!(table.programs().collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn hooks_attach_once_and_detach_once() {
        let log = Log::default();
        let mut table = RegistrationTable::new(1);

        table.attach_unknown(recorder(&log, "u")).unwrap();
        assert!(matches!(
            table.attach_unknown(recorder(&log, "u2")),
            Err(MuxError::HookAttached(Hook::Unknown))
        ));
        table.detach_unknown().unwrap();
        assert!(matches!(
            table.detach_unknown(),
            Err(MuxError::HookDetached(Hook::Unknown))
        ));

        table.attach_all(recorder(&log, "a")).unwrap();
        assert!(table.has_hook(Hook::All));
        assert!(matches!(
            table.attach_all(recorder(&log, "a2")),
            Err(MuxError::HookAttached(Hook::All))
        ));
        table.detach_all().unwrap();
        assert!(matches!(
            table.detach_all(),
            Err(MuxError::HookDetached(Hook::All))
        ));
    }

    #[test]
    fn dispatch_falls_back_to_unknown_and_always_observes() {
        let log = Log::default();
        let mut table = RegistrationTable::new(2);
        table.attach(1, recorder(&log, "one")).unwrap();
        table.attach_unknown(recorder(&log, "unknown")).unwrap();
        table.attach_all(recorder(&log, "all")).unwrap();

        assert_eq!(table.dispatch(&SubRecord::new(1, b"a")), 1);
        assert_eq!(table.dispatch(&SubRecord::new(9, b"b")), 0);

        let tags: Vec<_> = log
            .lock()
            .unwrap()
            .iter()
            .map(|(tag, program, _)| (*tag, *program))
            .collect();
        assert_eq!(
            tags,
            vec![("one", 1), ("all", 1), ("unknown", 9), ("all", 9)]
        );
    }

    #[test]
    fn dispatch_without_hooks_is_silent() {
        let mut table = RegistrationTable::new(1);
        assert_eq!(table.dispatch(&SubRecord::new(4, b"z")), 0);
    }

    #[test]
    fn reset_discards_registrations_but_keeps_hooks() {
        let log = Log::default();
        let mut table = RegistrationTable::new(2);
        table.attach(1, recorder(&log, "one")).unwrap();
        table.attach_all(recorder(&log, "all")).unwrap();

        assert_eq!(table.reset(5), 1);
        assert_eq!(table.capacity(), 5);
        assert!(table.is_empty());
        assert!(table.has_hook(Hook::All));
    }

    #[test]
    fn struct_handlers_are_supported() {
        struct Counter(Arc<Mutex<usize>>);
        impl Handler for Counter {
            fn handle(&mut self, record: &SubRecord<'_>) {
                *self.0.lock().unwrap() += record.len();
            }
        }

        let total = Arc::new(Mutex::new(0));
        let mut table = RegistrationTable::new(1);
        table.attach(2, Counter(Arc::clone(&total))).unwrap();
        table.dispatch(&SubRecord::new(2, b"abc"));
        table.dispatch(&SubRecord::new(2, b"de"));
        assert_eq!(*total.lock().unwrap(), 5);
    }
}
