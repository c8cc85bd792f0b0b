//! Endpoint — the capability object handed to every dispatched task.
//!
//! Bundles the resource store, the per-resource callback registry, the
//! transport session and the blink actuator behind one `&mut` that the
//! dispatcher threads through each task. No global resource pointers:
//! nothing outside a running task can reach the store, which is what makes
//! the single-writer rule hold.
//!
//! ## Reentrancy hazard
//!
//! Callbacks run with full `&mut Endpoint` access. A callback must not call
//! [`Endpoint::set_value`] for the handle it is currently firing for — the
//! cooperative model cannot detect the cycle, and the second notification
//! would recurse into the same callback slot. Documented, not enforced.

use log::warn;

use crate::dispatch::TimerQueue;
use crate::error::StoreError;
use crate::pattern::Blink;
use crate::ports::{BlinkPort, DeliveryStatus, TransportPort};
use crate::store::{Access, ResourceHandle, ResourceStore, Value, ValueKind};

type NotifyFn = Box<dyn FnMut(&mut Endpoint, ResourceHandle, DeliveryStatus) + Send>;
type PutFn = Box<dyn FnMut(&mut Endpoint, ResourceHandle, &str) + Send>;
type PostFn = Box<dyn FnMut(&mut Endpoint, &mut TimerQueue<Endpoint>, ResourceHandle, &[u8]) + Send>;

/// At most one callback per resource; the kind is tied to the access mask
/// (notification ↔ observable, put ↔ WRITE, post ↔ EXECUTE).
enum ResourceCallback {
    Notification(NotifyFn),
    Put(PutFn),
    Post(PostFn),
}

pub struct Endpoint {
    store: ResourceStore,
    callbacks: Vec<Option<ResourceCallback>>,
    transport: Box<dyn TransportPort + Send>,
    blink: Box<dyn BlinkPort + Send>,
}

impl Endpoint {
    pub fn new(transport: Box<dyn TransportPort + Send>, blink: Box<dyn BlinkPort + Send>) -> Self {
        Self {
            store: ResourceStore::new(),
            callbacks: Vec::new(),
            transport,
            blink,
        }
    }

    // ── Resource table ────────────────────────────────────────

    /// Register a resource. `initial` fixes the value variant for life.
    pub fn create_resource(
        &mut self,
        path: &str,
        name: &str,
        access: Access,
        initial: Value,
    ) -> Result<ResourceHandle, StoreError> {
        let handle = self.store.create(path, name, access, initial)?;
        self.callbacks.push(None);
        Ok(handle)
    }

    /// Read-only view of the store for sensors, tests and logging.
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn set_observable(&mut self, handle: ResourceHandle, observable: bool) {
        self.store.set_observable(handle, observable);
    }

    /// Write a value. On an observable resource this also pushes a change
    /// notification through the transport; the delivery status comes back
    /// later via [`Endpoint::notify_delivery`].
    pub fn set_value(&mut self, handle: ResourceHandle, value: Value) -> Result<(), StoreError> {
        self.store.set(handle, value)?;
        if self.store.is_observable(handle) {
            let path = self.store.path(handle);
            self.transport.notify(&path, self.store.value(handle));
        }
        Ok(())
    }

    // ── Callback registration ─────────────────────────────────

    pub fn attach_notification_callback(
        &mut self,
        handle: ResourceHandle,
        cb: impl FnMut(&mut Endpoint, ResourceHandle, DeliveryStatus) + Send + 'static,
    ) -> Result<(), StoreError> {
        if !self.store.is_observable(handle) {
            return Err(StoreError::CallbackMismatch(
                "notification callback requires an observable resource",
            ));
        }
        self.callbacks[handle.index()] = Some(ResourceCallback::Notification(Box::new(cb)));
        Ok(())
    }

    pub fn attach_put_callback(
        &mut self,
        handle: ResourceHandle,
        cb: impl FnMut(&mut Endpoint, ResourceHandle, &str) + Send + 'static,
    ) -> Result<(), StoreError> {
        if !self.store.access(handle).allows(Access::WRITE) {
            return Err(StoreError::CallbackMismatch(
                "put callback requires WRITE access",
            ));
        }
        self.callbacks[handle.index()] = Some(ResourceCallback::Put(Box::new(cb)));
        Ok(())
    }

    pub fn attach_post_callback(
        &mut self,
        handle: ResourceHandle,
        cb: impl FnMut(&mut Endpoint, &mut TimerQueue<Endpoint>, ResourceHandle, &[u8]) + Send + 'static,
    ) -> Result<(), StoreError> {
        if !self.store.access(handle).allows(Access::EXECUTE) {
            return Err(StoreError::CallbackMismatch(
                "post callback requires EXECUTE access",
            ));
        }
        self.callbacks[handle.index()] = Some(ResourceCallback::Post(Box::new(cb)));
        Ok(())
    }

    // ── Remote operations (marshalled onto the dispatcher by the
    //    transport collaborator) ───────────────────────────────

    /// Apply a remote PUT. The wire carries a string; it is parsed into
    /// the resource's fixed variant. Unparseable input is rejected with a
    /// warning and the stored value left intact.
    pub fn deliver_put(&mut self, handle: ResourceHandle, raw: &str) {
        if !self.store.access(handle).allows(Access::WRITE) {
            warn!("PUT rejected on {}: not writable", self.store.path(handle));
            return;
        }
        let value = match self.store.kind(handle) {
            ValueKind::Str => Value::Str(raw.to_owned()),
            ValueKind::Int => match raw.trim().parse::<i64>() {
                Ok(v) => Value::Int(v),
                Err(_) => {
                    warn!(
                        "PUT on {} rejected: {raw:?} is not an integer",
                        self.store.path(handle)
                    );
                    return;
                }
            },
            ValueKind::Float => match raw.trim().parse::<f64>() {
                Ok(v) => Value::Float(v),
                Err(_) => {
                    warn!(
                        "PUT on {} rejected: {raw:?} is not a float",
                        self.store.path(handle)
                    );
                    return;
                }
            },
        };
        if let Err(e) = self.set_value(handle, value) {
            warn!("PUT on {} rejected: {e}", self.store.path(handle));
            return;
        }
        match self.callbacks[handle.index()].take() {
            Some(ResourceCallback::Put(mut cb)) => {
                cb(self, handle, raw);
                self.restore_callback(handle, ResourceCallback::Put(cb));
            }
            other => self.callbacks[handle.index()] = other,
        }
    }

    /// Apply a remote POST (execute).
    pub fn deliver_post(
        &mut self,
        timers: &mut TimerQueue<Endpoint>,
        handle: ResourceHandle,
        payload: &[u8],
    ) {
        if !self.store.access(handle).allows(Access::EXECUTE) {
            warn!("POST rejected on {}: not executable", self.store.path(handle));
            return;
        }
        match self.callbacks[handle.index()].take() {
            Some(ResourceCallback::Post(mut cb)) => {
                cb(self, timers, handle, payload);
                self.restore_callback(handle, ResourceCallback::Post(cb));
            }
            other => self.callbacks[handle.index()] = other,
        }
    }

    /// Report the fate of a pushed notification.
    pub fn notify_delivery(&mut self, handle: ResourceHandle, status: DeliveryStatus) {
        match self.callbacks[handle.index()].take() {
            Some(ResourceCallback::Notification(mut cb)) => {
                cb(self, handle, status);
                self.restore_callback(handle, ResourceCallback::Notification(cb));
            }
            other => self.callbacks[handle.index()] = other,
        }
    }

    // A callback may have attached a replacement for its own slot while it
    // ran; the replacement wins.
    fn restore_callback(&mut self, handle: ResourceHandle, cb: ResourceCallback) {
        let slot = &mut self.callbacks[handle.index()];
        if slot.is_none() {
            *slot = Some(cb);
        }
    }

    // ── Collaborator access ───────────────────────────────────

    pub fn transport_mut(&mut self) -> &mut dyn TransportPort {
        &mut *self.transport
    }

    /// Called on the recurring idle-service tick.
    pub fn service_transport(&mut self) {
        self.transport.service();
    }
}

impl Blink for Endpoint {
    fn toggle_blink(&mut self) {
        self.blink.toggle();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
