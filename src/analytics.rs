use std::cell::RefCell;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

/// Anything that wants to hear about user interactions.
pub trait EventSink {
    /// `properties` is expected to be a JSON object; `null` means "none".
    fn record(&self, name: &str, properties: Value);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: Properties,
    pub timestamp: DateTime<Utc>,
}

/// In-memory event log, mirrored into `window.analyticsEvents` in the browser.
#[derive(Debug, Default)]
pub struct AnalyticsLog {
    events: RefCell<Vec<AnalyticsEvent>>,
}

impl AnalyticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    #[cfg(test)]
    pub fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.name == name).count()
    }

    #[cfg(test)]
    pub fn last(&self, name: &str) -> Option<AnalyticsEvent> {
        self.events.borrow().iter().rev().find(|e| e.name == name).cloned()
    }
}

impl EventSink for AnalyticsLog {
    fn record(&self, name: &str, properties: Value) {
        let properties = match properties {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let event = AnalyticsEvent {
            name: name.to_string(),
            properties,
            timestamp: Utc::now(),
        };

        info!("Event: {}", event.name);
        #[cfg(target_arch = "wasm32")]
        mirror_to_window(&event);

        self.events.borrow_mut().push(event);
    }
}

#[cfg(target_arch = "wasm32")]
fn mirror_to_window(event: &AnalyticsEvent) {
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::js_sys::{Array, Reflect};

    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let properties = event
        .properties
        .serialize(&serializer)
        .unwrap_or(JsValue::UNDEFINED);
    gloo_console::log!(format!("📊 Event: {}", event.name), properties);

    let Ok(value) = event.serialize(&serializer) else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };
    let key = JsValue::from_str("analyticsEvents");
    let log = match Reflect::get(&window, &key).map(|v| v.dyn_into::<Array>()) {
        Ok(Ok(array)) => array,
        _ => {
            let array = Array::new();
            let _ = Reflect::set(&window, &key, &array);
            array
        }
    };
    log.push(&value);
}
