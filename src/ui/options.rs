/// Options page: settings editor and regroup on save
use crate::color::ColorTag;
use crate::command::{ActionResult, Command};
use crate::debounce::{Debouncer, REGROUP_DEBOUNCE};
use crate::rules::{Rule, RuleCondition};
use crate::settings::{Settings, load_settings, save_settings};
use crate::ui::bridge::{PageStorage, count_all_tabs, send_command_untimed, sleep};
use crate::ui::components::{ColorSelect, Status, StatusBanner, show_status};
use crate::ui::sidebar::{button_label, run_command};
use patternfly_yew::prelude::*;
use std::future::Future;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Pause between ungrouping and grouping again during a regroup
pub const REGROUP_GAP: Duration = Duration::from_millis(500);

/// Fewest open tabs worth regrouping
pub const MIN_REGROUP_TABS: usize = 2;

/// Commands offered under "Actions" besides regrouping, in page order
const PAGE_ACTIONS: [Command; 5] = [
    Command::GroupByDomain,
    Command::RemoveDuplicates,
    Command::ExpandAll,
    Command::CollapseAll,
    Command::UngroupAll,
];

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Ready,
}

fn toggle_message(index: usize, enabled: bool) -> String {
    let state = if enabled { "enabled" } else { "disabled" };
    format!("Rule {} {}!", index + 1, state)
}

fn expect_success(result: ActionResult) -> Result<(), String> {
    if result.success {
        Ok(())
    } else {
        Err(result.error.unwrap_or_else(|| "Action failed".to_string()))
    }
}

/// Normalize a domain typed into the color editor
fn domain_key(input: &str) -> Option<String> {
    let domain = input.trim().to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    if domain.is_empty() { None } else { Some(domain.to_string()) }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Ungroup everything, wait for `pause`, then group by domain again
///
/// The grouping step is sent even when ungrouping failed: grouping by
/// domain clears the old groups itself, so the window never stays
/// ungrouped because of the first step.
async fn regroup<F, Fut, P>(send: F, pause: P) -> Result<(), String>
where
    F: Fn(Command) -> Fut,
    Fut: Future<Output = Result<ActionResult, String>>,
    P: Future<Output = ()>,
{
    if let Err(e) = send(Command::UngroupAll).await.and_then(expect_success) {
        log::warn!("Ungrouping before regroup failed: {}", e);
    }
    pause.await;
    send(Command::GroupByDomain).await.and_then(expect_success)
}

async fn regroup_tabs(status: UseStateHandle<Status>, clearer: Debouncer) {
    let count = match count_all_tabs().await {
        Ok(count) => count,
        Err(e) => {
            show_status(&status, &clearer, Status::Error(format!("Error regrouping tabs: {}", e)));
            return;
        }
    };
    if count < MIN_REGROUP_TABS {
        show_status(
            &status,
            &clearer,
            Status::Info("Not enough tabs to regroup (need at least 2).".to_string()),
        );
        return;
    }

    show_status(&status, &clearer, Status::Pending("Regrouping tabs...".to_string()));
    match regroup(send_command_untimed, sleep(REGROUP_GAP)).await {
        Ok(()) => show_status(&status, &clearer, Status::Success("Tabs regrouped successfully!".to_string())),
        Err(e) => {
            log::error!("Error regrouping tabs: {}", e);
            show_status(&status, &clearer, Status::Error(format!("Error regrouping tabs: {}", e)));
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct RuleEditorProps {
    pub index: usize,
    pub rule: Rule,
    pub on_change: Callback<Rule>,
    pub on_delete: Callback<()>,
}

/// One row of the rules list
#[function_component(RuleEditor)]
pub fn rule_editor(props: &RuleEditorProps) -> Html {
    let edit = |apply: fn(&mut Rule, String)| {
        let rule = props.rule.clone();
        let on_change = props.on_change.clone();
        move |value: String| {
            let mut rule = rule.clone();
            apply(&mut rule, value);
            on_change.emit(rule);
        }
    };

    let on_enabled = {
        let rule = props.rule.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut rule = rule.clone();
                rule.enabled = input.checked();
                on_change.emit(rule);
            }
        })
    };

    let on_condition = {
        let apply = edit(|rule, key| {
            if let Some(condition) = RuleCondition::from_key(&key) {
                rule.condition = condition;
            }
        });
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                apply(select.value());
            }
        })
    };

    let on_value = {
        let apply = edit(|rule, value| rule.value = value);
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                apply(input.value());
            }
        })
    };

    let on_group_name = {
        let apply = edit(|rule, name| rule.group_name = name);
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                apply(input.value());
            }
        })
    };

    let on_color = {
        let apply = edit(|rule, color| rule.color = color);
        Callback::from(move |color: ColorTag| apply(color.name().to_string()))
    };

    let on_delete = {
        let on_delete = props.on_delete.clone();
        Callback::from(move |_: MouseEvent| on_delete.emit(()))
    };

    let rule = &props.rule;
    html! {
        <div class="rule-item">
            <div class="rule-header">
                <label>
                    <input type="checkbox" checked={rule.enabled} onchange={on_enabled} />
                    {format!(" Rule {}", props.index + 1)}
                </label>
                <Button onclick={on_delete} variant={ButtonVariant::Danger}>
                    {"Delete"}
                </Button>
            </div>
            <div class="rule-inputs">
                <select class="pf-v5-c-form-control" onchange={on_condition}>
                    {for RuleCondition::ALL.iter().map(|condition| html! {
                        <option value={condition.key()} selected={*condition == rule.condition}>
                            {condition.label()}
                        </option>
                    })}
                </select>
                <input
                    type="text"
                    class="pf-v5-c-form-control"
                    placeholder="Enter pattern..."
                    value={rule.value.clone()}
                    oninput={on_value}
                />
                <ColorSelect value={rule.color.clone()} onchange={on_color} />
            </div>
            <input
                type="text"
                class="pf-v5-c-form-control rule-group-name"
                placeholder="Group name..."
                value={rule.group_name.clone()}
                oninput={on_group_name}
            />
        </div>
    }
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| PageState::Loading);
    let settings = use_state(Settings::default);
    let status = use_state(|| Status::Idle);
    let clearer = use_memo((), |_| Debouncer::new());
    let regroup_slot = use_memo((), |_| Debouncer::new());
    let new_domain = use_state(String::new);
    let new_color = use_state(|| ColorTag::Blue);

    // Load settings on mount
    {
        let state = state.clone();
        let settings = settings.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_settings(&PageStorage).await {
                    Ok(loaded) => settings.set(loaded),
                    Err(e) => {
                        log::warn!("Using default settings: {}", e);
                        show_status(&status, &clearer, Status::Error(format!("Failed to load settings: {}", e)));
                    }
                }
                state.set(PageState::Ready);
            });
            || ()
        });
    }

    let on_auto_group = {
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*settings).clone();
                next.auto_group = input.checked();
                settings.set(next);
            }
        })
    };

    let on_group_by_domain = {
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*settings).clone();
                next.group_by_domain = input.checked();
                settings.set(next);
            }
        })
    };

    let on_add_rule = {
        let settings = settings.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*settings).clone();
            next.add_rule(Rule::blank());
            settings.set(next);
        })
    };

    let on_rule_change = |index: usize| {
        let settings = settings.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();
        Callback::from(move |rule: Rule| {
            let mut next = (*settings).clone();
            let toggled = next.custom_rules.get(index).is_some_and(|r| r.enabled != rule.enabled);
            let enabled = rule.enabled;
            if next.update_rule(index, rule) {
                settings.set(next);
                if toggled {
                    show_status(&status, &clearer, Status::Success(toggle_message(index, enabled)));
                }
            }
        })
    };

    let on_rule_delete = |index: usize| {
        let settings = settings.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();
        Callback::from(move |_: ()| {
            if !confirm(&format!("Are you sure you want to delete Rule {}?", index + 1)) {
                return;
            }
            let mut next = (*settings).clone();
            if next.remove_rule(index) {
                settings.set(next);
                show_status(&status, &clearer, Status::Success("Rule deleted successfully!".to_string()));
            }
        })
    };

    let on_domain_color = |domain: String| {
        let settings = settings.clone();
        Callback::from(move |color: ColorTag| {
            let mut next = (*settings).clone();
            next.set_domain_color(&domain, color);
            settings.set(next);
        })
    };

    let on_remove_domain = |domain: String| {
        let settings = settings.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*settings).clone();
            if next.remove_domain_color(&domain) {
                settings.set(next);
            }
        })
    };

    let on_new_domain = {
        let new_domain = new_domain.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_domain.set(input.value());
            }
        })
    };

    let on_new_color = {
        let new_color = new_color.clone();
        Callback::from(move |color: ColorTag| new_color.set(color))
    };

    let on_add_domain = {
        let settings = settings.clone();
        let new_domain = new_domain.clone();
        let new_color = new_color.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();
        Callback::from(move |_: MouseEvent| match domain_key(&new_domain) {
            Some(domain) => {
                let mut next = (*settings).clone();
                next.set_domain_color(&domain, *new_color);
                settings.set(next);
                new_domain.set(String::new());
            }
            None => show_status(&status, &clearer, Status::Error("Enter a domain first".to_string())),
        })
    };

    let on_save = {
        let settings = settings.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();
        let regroup_slot = (*regroup_slot).clone();
        Callback::from(move |_: MouseEvent| {
            let snapshot = (*settings).clone();
            let status = status.clone();
            let clearer = clearer.clone();
            let regroup_slot = regroup_slot.clone();

            spawn_local(async move {
                if let Err(e) = save_settings(&PageStorage, &snapshot).await {
                    log::error!("Error saving settings: {}", e);
                    show_status(&status, &clearer, Status::Error("Error saving settings".to_string()));
                    return;
                }
                show_status(&status, &clearer, Status::Success("Settings saved successfully!".to_string()));

                // A later save re-arms the slot and this regroup is dropped
                let pending = regroup_slot.arm();
                if pending.settle(sleep(REGROUP_DEBOUNCE)).await {
                    regroup_tabs(status, clearer).await;
                }
            });
        })
    };

    let on_reset = {
        let settings = settings.clone();
        let status = status.clone();
        let clearer = (*clearer).clone();
        Callback::from(move |_: MouseEvent| {
            if confirm("Are you sure you want to reset all settings to defaults? This will remove all custom rules.") {
                settings.set(Settings::default());
                show_status(&status, &clearer, Status::Success("Settings reset to defaults!".to_string()));
            }
        })
    };

    let on_action = |command: Command| {
        let status = status.clone();
        let clearer = (*clearer).clone();
        Callback::from(move |_: MouseEvent| {
            spawn_local(run_command(status.clone(), clearer.clone(), command));
        })
    };

    let on_regroup_now = {
        let status = status.clone();
        let clearer = (*clearer).clone();
        let regroup_slot = (*regroup_slot).clone();
        Callback::from(move |_: MouseEvent| {
            // Supersedes a regroup still waiting on a recent save
            drop(regroup_slot.arm());
            spawn_local(regroup_tabs(status.clone(), clearer.clone()));
        })
    };

    if *state == PageState::Loading {
        return html! {
            <div class="loading-text-center">
                <Spinner />
                <p class="loading-text">{"Loading settings..."}</p>
            </div>
        };
    }

    html! {
        <div class="padding-20 options-page">
            <h1 class="popup-title">{"Tab Forge Options"}</h1>

            <section class="options-section">
                <h2>{"General"}</h2>
                <label class="toggle-row">
                    <input type="checkbox" checked={settings.auto_group} onchange={on_auto_group} />
                    {" Automatically group new tabs"}
                </label>
                <label class="toggle-row">
                    <input type="checkbox" checked={settings.group_by_domain} onchange={on_group_by_domain} />
                    {" Group by domain when no rule matches"}
                </label>
            </section>

            <section class="options-section">
                <h2>{"Custom rules"}</h2>
                if settings.custom_rules.is_empty() {
                    <p class="empty-state-hint">{"No custom rules yet."}</p>
                }
                {for settings.custom_rules.iter().enumerate().map(|(index, rule)| html! {
                    <RuleEditor
                        key={index}
                        index={index}
                        rule={rule.clone()}
                        on_change={on_rule_change(index)}
                        on_delete={on_rule_delete(index)}
                    />
                })}
                <Button onclick={on_add_rule} variant={ButtonVariant::Secondary}>
                    {"Add rule"}
                </Button>
            </section>

            <section class="options-section">
                <h2>{"Domain colors"}</h2>
                {for settings.colors.iter().map(|(domain, color)| html! {
                    <div class="domain-color-row" key={domain.clone()}>
                        <span class="domain-name">{domain}</span>
                        <ColorSelect value={color.clone()} onchange={on_domain_color(domain.clone())} />
                        <Button onclick={on_remove_domain(domain.clone())} variant={ButtonVariant::Link}>
                            {"Remove"}
                        </Button>
                    </div>
                })}
                <div class="domain-color-row">
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        placeholder="example.com"
                        value={(*new_domain).clone()}
                        oninput={on_new_domain}
                    />
                    <ColorSelect value={new_color.name().to_string()} onchange={on_new_color} />
                    <Button onclick={on_add_domain} variant={ButtonVariant::Secondary}>
                        {"Add"}
                    </Button>
                </div>
            </section>

            <section class="options-section">
                <h2>{"Actions"}</h2>
                <div class="flex-column-gap">
                    <Button onclick={on_regroup_now} variant={ButtonVariant::Secondary} block={true}>
                        {"Regroup Tabs"}
                    </Button>
                    {for PAGE_ACTIONS.into_iter().map(|command| html! {
                        <Button onclick={on_action(command)} variant={ButtonVariant::Secondary} block={true}>
                            {button_label(command)}
                        </Button>
                    })}
                </div>
            </section>

            <div class="flex-row-gap">
                <Button onclick={on_save} variant={ButtonVariant::Primary}>
                    {"Save"}
                </Button>
                <Button onclick={on_reset} variant={ButtonVariant::Secondary}>
                    {"Reset to defaults"}
                </Button>
            </div>

            <StatusBanner status={(*status).clone()} />
        </div>
    }
}
