use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use log::debug;
use wasm_bindgen::JsValue;
use web_sys::Element;

use super::scroll::observe_once;
use super::Page;
use crate::config;

/// Values shown on each tick while counting up to `target` in `steps` ticks.
/// The last frame is always exactly `target`.
#[derive(Debug, Clone)]
pub struct CounterFrames {
    current: f64,
    target: f64,
    increment: f64,
    done: bool,
}

impl CounterFrames {
    pub fn new(target: u32, steps: u32) -> Self {
        let target = f64::from(target);
        Self {
            current: 0.0,
            target,
            increment: target / f64::from(steps.max(1)),
            done: false,
        }
    }
}

impl Iterator for CounterFrames {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.done {
            return None;
        }
        self.current += self.increment;
        if self.current >= self.target {
            self.current = self.target;
            self.done = true;
        }
        Some(self.current.floor() as u32)
    }
}

/// `5000` → `"5,000"`.
pub fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn trust_line(value: u32) -> String {
    format!("Trusted by {}+ aspiring filmmakers", group_thousands(value))
}

pub fn wire(page: &Page) -> Result<(), JsValue> {
    let document = page.document();
    let Some(section) = document.query_selector(".trust-section")? else {
        return Ok(());
    };
    let Some(title) = document.query_selector(".trust-title")? else {
        return Ok(());
    };
    observe_once(&[section], 0.5, None, move |_| animate(title.clone()))
}

fn animate(title: Element) {
    debug!("Counting up trust title");
    let mut frames = CounterFrames::new(config::COUNTER_TARGET, config::COUNTER_STEPS);
    let handle: Rc<RefCell<Option<Interval>>> = Rc::new(RefCell::new(None));
    let handle_clone = Rc::clone(&handle);

    let interval = Interval::new(config::COUNTER_TICK_MS, move || match frames.next() {
        Some(value) => title.set_text_content(Some(&trust_line(value))),
        None => {
            if let Some(interval) = handle_clone.borrow_mut().take() {
                drop(interval);
            }
        }
    });
    *handle.borrow_mut() = Some(interval);
}
