use yew::prelude::*;

use crate::config;

/// What the preview overlay says. Close controls carry the `close-modal` /
/// `close-modal-btn` classes and the enroll link `modal-enroll-btn`; the
/// surface listens for clicks on those.
#[derive(Properties, PartialEq, Clone, Debug)]
pub struct PreviewProps {
    pub title: String,
    pub body: String,
    pub enroll_url: String,
    pub enroll_label: String,
    pub dismiss_label: String,
    pub guarantee: String,
}

impl PreviewProps {
    pub fn course_preview() -> Self {
        Self {
            title: "Course Preview Coming Soon!".to_string(),
            body: "Our comprehensive course preview video is currently being produced with \
                   professional quality. Meanwhile, secure your spot in the next batch \
                   starting September 15, 2025!"
                .to_string(),
            enroll_url: config::ENROLL_URL.to_string(),
            enroll_label: "Enroll Now".to_string(),
            dismiss_label: "Maybe Later".to_string(),
            guarantee: "7-day money-back guarantee".to_string(),
        }
    }
}

#[function_component(PreviewCard)]
pub fn preview_card(props: &PreviewProps) -> Html {
    html! {
        <>
            <style>
                {r#"
                    .preview-card .close-modal {
                        position: absolute;
                        top: 15px;
                        right: 20px;
                        background: none;
                        border: none;
                        font-size: 2rem;
                        cursor: pointer;
                        color: #666;
                        line-height: 1;
                        width: 35px;
                        height: 35px;
                        border-radius: 50%;
                        transition: all 0.2s ease;
                    }
                    .preview-card .preview-icon {
                        width: 80px;
                        height: 80px;
                        background: linear-gradient(135deg, #ff6b35, #ff8c42);
                        border-radius: 50%;
                        display: flex;
                        align-items: center;
                        justify-content: center;
                        margin: 0 auto 1.5rem;
                        box-shadow: 0 8px 25px rgba(255, 107, 53, 0.3);
                    }
                    .preview-card h3 {
                        margin-bottom: 1rem;
                        color: #333;
                        font-size: 1.75rem;
                        font-weight: 700;
                    }
                    .preview-card .preview-body {
                        margin-bottom: 2rem;
                        color: #666;
                        line-height: 1.6;
                        font-size: 1.1rem;
                    }
                    .preview-card .preview-actions {
                        display: flex;
                        gap: 1rem;
                        justify-content: center;
                        flex-wrap: wrap;
                        margin-bottom: 1rem;
                    }
                    .preview-card .modal-enroll-btn {
                        background: linear-gradient(135deg, #ff6b35, #ff8c42);
                        color: white;
                        padding: 14px 28px;
                        border-radius: 8px;
                        text-decoration: none;
                        display: inline-flex;
                        align-items: center;
                        font-weight: 700;
                        font-size: 1.05rem;
                        box-shadow: 0 4px 15px rgba(255, 107, 53, 0.3);
                    }
                    .preview-card .close-modal-btn {
                        background: #f8f9fa;
                        color: #333;
                        padding: 14px 28px;
                        border: 2px solid #e5e5e5;
                        border-radius: 8px;
                        cursor: pointer;
                        font-weight: 600;
                        font-size: 1.05rem;
                    }
                    .preview-card .preview-guarantee {
                        margin-top: 1rem;
                        font-size: 0.9rem;
                        color: #999;
                    }
                "#}
            </style>
            <div class="preview-card">
                <button class="close-modal" aria-label="Close modal">{"×"}</button>
                <div class="preview-icon">
                    <i class="fas fa-play-circle" style="font-size: 2rem; color: white;"></i>
                </div>
                <h3>{ props.title.clone() }</h3>
                <p class="preview-body">{ props.body.clone() }</p>
                <div class="preview-actions">
                    <a
                        href={props.enroll_url.clone()}
                        target="_blank"
                        rel="noopener noreferrer"
                        class="modal-enroll-btn"
                    >
                        <i class="fas fa-rocket" style="margin-right: 8px;"></i>
                        { props.enroll_label.clone() }
                    </a>
                    <button class="close-modal-btn">{ props.dismiss_label.clone() }</button>
                </div>
                <p class="preview-guarantee">
                    <i class="fas fa-shield-alt" style="margin-right: 5px; color: #22c55e;"></i>
                    { props.guarantee.clone() }
                </p>
            </div>
        </>
    }
}
