use yew::prelude::*;

use crate::lifecycle::notice::NoticeKind;

#[derive(Properties, PartialEq)]
pub struct NoticeBodyProps {
    pub message: String,
    #[prop_or_default]
    pub kind: NoticeKind,
}

/// Icon and text inside a notice banner. The banner itself (position,
/// colour, slide transition) belongs to the surface that mounts it.
#[function_component(NoticeBody)]
pub fn notice_body(props: &NoticeBodyProps) -> Html {
    let icon = classes!("fas", format!("fa-{}", props.kind.icon()));

    html! {
        <div class="notification-body" style="display: flex; align-items: center; gap: 10px;">
            <i class={icon} aria-hidden="true"></i>
            <span>{ props.message.clone() }</span>
        </div>
    }
}
