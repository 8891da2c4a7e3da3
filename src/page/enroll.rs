use log::{debug, info};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlAnchorElement};

use super::{listen, query_all, strip_legacy_handlers, text_of, Page};
use crate::config;

const SELECTORS: [&str; 5] = [
    ".enroll-btn",
    ".guarantee-btn",
    ".final-cta-btn",
    "a[href*=\"typeform.com\"]",
    "a[href*=\"p1dfW2Ab\"]",
];

/// Marks elements that already have our click handler.
const WIRED_ATTR: &str = "data-enroll-wired";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLocation {
    Hero,
    Guarantee,
    FinalCta,
    VideoModal,
    Other,
}

impl ButtonLocation {
    const SECTIONS: [(&'static str, ButtonLocation); 4] = [
        (".hero-section", ButtonLocation::Hero),
        (".guarantee-section", ButtonLocation::Guarantee),
        (".final-cta-section", ButtonLocation::FinalCta),
        (".video-modal-overlay", ButtonLocation::VideoModal),
    ];

    /// First section in page order for which `inside` holds.
    pub fn classify(mut inside: impl FnMut(&str) -> bool) -> Self {
        Self::SECTIONS
            .iter()
            .find(|(selector, _)| inside(selector))
            .map_or(ButtonLocation::Other, |(_, location)| *location)
    }

    pub fn of(element: &Element) -> Self {
        Self::classify(|selector| matches!(element.closest(selector), Ok(Some(_))))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonLocation::Hero => "hero",
            ButtonLocation::Guarantee => "guarantee",
            ButtonLocation::FinalCta => "final-cta",
            ButtonLocation::VideoModal => "video-modal",
            ButtonLocation::Other => "other",
        }
    }
}

pub fn wire(page: &Page) -> Result<(), JsValue> {
    let document = page.document();
    let mut count = 0;

    for selector in SELECTORS {
        for element in query_all(document, selector) {
            if element.has_attribute(WIRED_ATTR) {
                continue;
            }
            count += 1;
            debug!("Setting up enroll button {}: {}", count, text_of(&element));

            let link = as_enroll_link(document, element)?;
            strip_legacy_handlers(&link)?;
            link.set_attribute(WIRED_ATTR, "")?;

            let page = page.clone();
            let anchor = link.clone();
            listen(&link, "click", move |_| enroll_clicked(&page, &anchor))?;
        }
    }

    info!("Total enroll buttons configured: {}", count);
    Ok(())
}

/// Turns `element` into a new-tab link to the enroll form, replacing it in
/// the tree when it is not an anchor already.
fn as_enroll_link(document: &Document, element: Element) -> Result<HtmlAnchorElement, JsValue> {
    let link = match element.dyn_into::<HtmlAnchorElement>() {
        Ok(link) => link,
        Err(element) => {
            let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
            link.set_class_name(&element.class_name());
            link.set_inner_html(&element.inner_html());
            if let Some(style) = element.get_attribute("style") {
                link.set_attribute("style", &style)?;
            }
            if let Some(parent) = element.parent_node() {
                parent.replace_child(&link, &element)?;
            }
            link
        }
    };
    link.set_href(config::ENROLL_URL);
    link.set_target("_blank");
    link.set_rel("noopener noreferrer");
    Ok(link)
}

fn enroll_clicked(page: &Page, link: &HtmlAnchorElement) {
    info!("Enroll button clicked: {}", link.href());
    page.press(link, "0.98");
    page.notices
        .success("Opening enrollment form...", config::QUICK_NOTICE_MS);
    page.record(
        "enroll_click",
        json!({
            "button_location": ButtonLocation::of(link).as_str(),
            "button_text": text_of(link),
            "url": link.href(),
        }),
    );
}
