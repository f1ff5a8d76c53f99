//! Publish/subscribe event bus module.

use serde_json::json;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use xorb_core::{Data, MemberKind, Module, ModuleError};

/// Identifies one subscription, returned by [`EventsModule::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&str, &Data) + Send + Sync>;

struct Subscriptions {
    event: String,
    listeners: Vec<(ListenerId, Listener)>,
}

/// An in-process event bus.
///
/// Listeners run in subscription order and receive the event type and its
/// payload. Emitting without a payload hands listeners an empty object.
#[derive(Default)]
pub struct EventsModule {
    events: Mutex<Vec<Subscriptions>>,
    next_id: AtomicU64,
}

impl EventsModule {
    /// Create an event bus with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&str, &Data) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let event = event.into();
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        match events.iter_mut().find(|slot| slot.event == event) {
            Some(slot) => slot.listeners.push((id, Arc::new(listener))),
            None => events.push(Subscriptions {
                event,
                listeners: vec![(id, Arc::new(listener))],
            }),
        }
        id
    }

    /// Unsubscribe one listener, or every listener of `event` when `id` is `None`.
    ///
    /// Returns whether the event was known.
    pub fn off(&self, event: &str, id: Option<ListenerId>) -> bool {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(position) = events.iter().position(|slot| slot.event == event) else {
            return false;
        };
        match id {
            Some(id) => events[position]
                .listeners
                .retain(|(listener, _)| *listener != id),
            None => {
                events.remove(position);
            }
        }
        true
    }

    /// Call every listener of `event`. Returns whether the event was known.
    pub fn emit(&self, event: &str, data: Option<Data>) -> bool {
        let listeners: Vec<Listener> = {
            let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
            match events.iter().find(|slot| slot.event == event) {
                Some(slot) => slot.listeners.iter().map(|(_, l)| l.clone()).collect(),
                None => return false,
            }
        };
        let data = data.unwrap_or_else(|| json!({}));
        for listener in listeners {
            listener(event, &data);
        }
        true
    }

    /// Event types with subscriptions, in first-subscription order.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|slot| slot.event.clone())
            .collect()
    }

    /// Number of listeners subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|slot| slot.event == event)
            .map_or(0, |slot| slot.listeners.len())
    }
}

fn event_name(method: &str, args: &[Data]) -> Result<String, ModuleError> {
    args.first()
        .and_then(Data::as_str)
        .map(str::to_string)
        .ok_or_else(|| ModuleError::InvalidArguments(format!("{method} expects an event name")))
}

impl Module for EventsModule {
    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        matches!(name, "emit" | "events" | "listeners").then_some(MemberKind::Method)
    }

    fn members(&self) -> Vec<String> {
        vec!["emit".into(), "events".into(), "listeners".into()]
    }

    fn call_method(&self, name: &str, args: Vec<Data>) -> Result<Data, ModuleError> {
        match name {
            "emit" => {
                let event = event_name(name, &args)?;
                Ok(json!(self.emit(&event, args.into_iter().nth(1))))
            }
            "events" => Ok(json!(self.events())),
            "listeners" => {
                let event = event_name(name, &args)?;
                Ok(json!(self.listener_count(&event)))
            }
            other => Err(ModuleError::UnknownMember(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_to_listeners_in_subscription_order() {
        let bus = EventsModule::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            bus.on("save", move |event, data| {
                seen.lock().unwrap().push(format!("{tag}:{event}:{data}"));
            });
        }

        assert!(bus.emit("save", Some(json!(1))));
        assert!(!bus.emit("load", None));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:save:1".to_string(), "second:save:1".to_string()]
        );
    }

    #[test]
    fn missing_payload_becomes_an_empty_object() {
        let bus = EventsModule::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        bus.on("ping", move |_, data| *slot.lock().unwrap() = Some(data.clone()));

        bus.emit("ping", None);
        assert_eq!(*seen.lock().unwrap(), Some(json!({})));
    }

    #[test]
    fn off_removes_one_or_all_listeners() {
        let bus = EventsModule::new();
        let a = bus.on("tick", |_, _| {});
        bus.on("tick", |_, _| {});
        bus.on("tock", |_, _| {});

        assert!(bus.off("tick", Some(a)));
        assert_eq!(bus.listener_count("tick"), 1);

        assert!(bus.off("tick", None));
        assert_eq!(bus.events(), vec!["tock"]);
        assert!(!bus.off("tick", None));
    }

    #[test]
    fn exposes_members_through_the_module_contract() {
        let bus = EventsModule::new();
        bus.on("tick", |_, _| {});

        assert_eq!(bus.call_method("listeners", vec![json!("tick")]), Ok(json!(1)));
        assert_eq!(bus.call_method("emit", vec![json!("tick")]), Ok(json!(true)));
        assert_eq!(bus.call_method("events", vec![]), Ok(json!(["tick"])));
        assert!(matches!(
            bus.call_method("emit", vec![]),
            Err(ModuleError::InvalidArguments(_))
        ));
    }
}
