/// Reusable UI components
use crate::color::{ColorTag, swatch_for_name};
use crate::debounce::Debouncer;
use crate::ui::bridge::sleep;
use patternfly_yew::prelude::*;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// How long a success message stays up
pub const SUCCESS_CLEAR: Duration = Duration::from_secs(2);
/// How long an error or info message stays up
pub const NOTICE_CLEAR: Duration = Duration::from_secs(3);

/// Transient status line shown under the page controls
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Idle,
    /// Work in progress; stays up until the result replaces it
    Pending(String),
    Info(String),
    Success(String),
    Error(String),
}

impl Status {
    /// When the status goes away on its own
    pub fn clear_after(&self) -> Option<Duration> {
        match self {
            Status::Success(_) => Some(SUCCESS_CLEAR),
            Status::Info(_) | Status::Error(_) => Some(NOTICE_CLEAR),
            Status::Idle | Status::Pending(_) => None,
        }
    }
}

/// Show `status` and clear it after its delay
///
/// A newer status replaces the pending clear, so a quick second message
/// is not wiped by the timer of the first.
pub fn show_status(handle: &UseStateHandle<Status>, clearer: &Debouncer, status: Status) {
    let delay = status.clear_after();
    let pending = clearer.arm();
    handle.set(status);

    if let Some(delay) = delay {
        let handle = handle.clone();
        spawn_local(async move {
            if pending.settle(sleep(delay)).await {
                handle.set(Status::Idle);
            }
        });
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
    pub status: Status,
}

#[function_component(StatusBanner)]
pub fn status_banner(props: &StatusBannerProps) -> Html {
    let (alert_type, text) = match &props.status {
        Status::Idle => return html! {},
        Status::Pending(text) | Status::Info(text) => (AlertType::Info, text),
        Status::Success(text) => (AlertType::Success, text),
        Status::Error(text) => (AlertType::Danger, text),
    };

    html! {
        <div class="status-banner">
            <Alert r#type={alert_type} title={text.clone()} inline={true}>
            </Alert>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ColorSwatchProps {
    /// Stored color name
    pub color: String,
}

#[function_component(ColorSwatch)]
pub fn color_swatch(props: &ColorSwatchProps) -> Html {
    html! {
        <span
            class="color-swatch"
            title={props.color.clone()}
            style={format!("display: inline-block; width: 14px; height: 14px; border-radius: 50%; background-color: {};", swatch_for_name(&props.color))}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct ColorSelectProps {
    /// Stored color name; may be one the palette does not know
    pub value: String,
    pub onchange: Callback<ColorTag>,
}

/// Palette dropdown with a swatch of the current choice
#[function_component(ColorSelect)]
pub fn color_select(props: &ColorSelectProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(color) = ColorTag::from_name(&select.value()) {
                    onchange.emit(color);
                }
            }
        })
    };

    html! {
        <span class="color-select">
            <ColorSwatch color={props.value.clone()} />
            <select class="pf-v5-c-form-control" {onchange}>
                {for ColorTag::ALL.iter().map(|color| html! {
                    <option value={color.name()} selected={color.name() == props.value}>
                        {color.name()}
                    </option>
                })}
            </select>
        </span>
    }
}
