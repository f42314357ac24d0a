/// Side panel: one button per background command
use crate::command::{ActionResult, Command};
use crate::debounce::Debouncer;
use crate::ui::bridge::{open_options_page, send_command};
use crate::ui::components::{Status, StatusBanner, show_status};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Button text for a command
pub(crate) fn button_label(command: Command) -> &'static str {
    match command {
        Command::GroupByDomain => "Group by Domain",
        Command::UngroupAll => "Ungroup All",
        Command::ExpandAll => "Expand All",
        Command::CollapseAll => "Collapse All",
        Command::RemoveDuplicates => "Remove Duplicates",
    }
}

/// Status shown once the background worker reports success
fn done_message(command: Command) -> &'static str {
    match command {
        Command::GroupByDomain => "Tabs grouped by domain!",
        Command::UngroupAll => "All tabs ungrouped!",
        Command::ExpandAll => "All groups expanded!",
        Command::CollapseAll => "All groups collapsed!",
        Command::RemoveDuplicates => "Duplicate tabs removed!",
    }
}

fn outcome_status(command: Command, outcome: Result<ActionResult, String>) -> Status {
    match outcome {
        Ok(result) if result.success => Status::Success(done_message(command).to_string()),
        Ok(result) => Status::Error(result.error.unwrap_or_else(|| "Unknown error".to_string())),
        Err(e) => Status::Error(e),
    }
}

/// Send one command and report its outcome on the page
pub(crate) async fn run_command(status: UseStateHandle<Status>, clearer: Debouncer, command: Command) {
    show_status(&status, &clearer, Status::Pending("Processing...".to_string()));
    let outcome = send_command(command).await;
    if let Err(e) = &outcome {
        log::error!("{} failed: {}", command.action(), e);
    }
    show_status(&status, &clearer, outcome_status(command, outcome));
}

#[function_component(Sidebar)]
pub fn sidebar() -> Html {
    let status = use_state(|| Status::Idle);
    let clearer = use_memo((), |_| Debouncer::new());

    let on_command = |command: Command| {
        let status = status.clone();
        let clearer = (*clearer).clone();

        Callback::from(move |_: MouseEvent| {
            spawn_local(run_command(status.clone(), clearer.clone(), command));
        })
    };

    let on_options = Callback::from(|_: MouseEvent| {
        spawn_local(open_options_page());
    });

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Forge"}</h1>

            <div class="flex-column-gap">
                {for Command::ALL.into_iter().map(|command| html! {
                    <Button onclick={on_command(command)} variant={ButtonVariant::Secondary} block={true}>
                        {button_label(command)}
                    </Button>
                })}
                <Button onclick={on_options} variant={ButtonVariant::Link} block={true}>
                    {"Options"}
                </Button>
            </div>

            <StatusBanner status={(*status).clone()} />
        </div>
    }
}
