//! Account forms: sign-in, registration, activation, and password reset.

use std::future::Future;

use drive_host::DriveError;
use leptos::*;
use leptos_router::{use_navigate, use_query_map, NavigateOptions, A};

use crate::context::use_drive_context;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormStatus {
    Idle,
    Busy,
    Done(String),
    Failed(String),
}

fn submit<Fut>(status: RwSignal<FormStatus>, task: Fut, on_done: impl FnOnce(&str) + 'static)
where
    Fut: Future<Output = Result<String, DriveError>> + 'static,
{
    status.set(FormStatus::Busy);
    spawn_local(async move {
        match task.await {
            Ok(message) => {
                on_done(&message);
                status.set(FormStatus::Done(message));
            }
            Err(err) => {
                logging::warn!("account request failed: {err}");
                status.set(FormStatus::Failed(err.user_message()));
            }
        }
    });
}

fn status_line(status: RwSignal<FormStatus>) -> impl IntoView {
    move || match status.get() {
        FormStatus::Idle => ().into_view(),
        FormStatus::Busy => view! { <p class="form-status">"Working..."</p> }.into_view(),
        FormStatus::Done(message) => view! { <p class="form-status">{message}</p> }.into_view(),
        FormStatus::Failed(message) => {
            view! { <p class="form-status error" role="alert">{message}</p> }.into_view()
        }
    }
}

fn text_field(label: &'static str, kind: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <label class="form-field">
            <span>{label}</span>
            <input
                type=kind
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
/// Email and password sign-in; lands on Home when it succeeds.
pub fn LoginPage() -> impl IntoView {
    let context = use_drive_context();
    let navigate = use_navigate();
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let status = create_rw_signal(FormStatus::Idle);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let auth = context.auth.clone();
        let signed_in = context.signed_in;
        let navigate = navigate.clone();
        let task = async move {
            auth.sign_in(&email.get_untracked(), &password.get_untracked())
                .await
                .map(|()| "Signed in.".to_string())
        };
        submit(status, task, move |_| {
            signed_in.set(true);
            navigate("/home", NavigateOptions::default());
        });
    };

    view! {
        <form class="account-form" on:submit=on_submit>
            <h1>"Sign in"</h1>
            {text_field("Email", "email", email)}
            {text_field("Password", "password", password)}
            <button type="submit" disabled=move || status.get() == FormStatus::Busy>"Sign in"</button>
            {status_line(status)}
            <p>
                <A href="/register">"Create an account"</A>
                " · "
                <A href="/forgot-password">"Forgot password?"</A>
            </p>
        </form>
    }
}

#[component]
/// New account form; activation happens through the emailed link.
pub fn RegisterPage() -> impl IntoView {
    let context = use_drive_context();
    let first_name = create_rw_signal(String::new());
    let last_name = create_rw_signal(String::new());
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let status = create_rw_signal(FormStatus::Idle);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let auth = context.auth.clone();
        let task = async move {
            auth.register(
                &first_name.get_untracked(),
                &last_name.get_untracked(),
                &email.get_untracked(),
                &password.get_untracked(),
            )
            .await
        };
        submit(status, task, move |_| password.set(String::new()));
    };

    view! {
        <form class="account-form" on:submit=on_submit>
            <h1>"Create account"</h1>
            {text_field("First name", "text", first_name)}
            {text_field("Last name", "text", last_name)}
            {text_field("Email", "email", email)}
            {text_field("Password", "password", password)}
            <button type="submit" disabled=move || status.get() == FormStatus::Busy>"Register"</button>
            {status_line(status)}
            <p><A href="/login">"Back to sign in"</A></p>
        </form>
    }
}

#[component]
/// Activates the account named by the `token` query parameter as soon as it mounts.
pub fn ActivatePage() -> impl IntoView {
    let context = use_drive_context();
    let token = use_query_map()
        .with_untracked(|query| query.get("token").cloned())
        .unwrap_or_default();
    let status = create_rw_signal(FormStatus::Idle);

    let auth = context.auth.clone();
    submit(status, async move { auth.activate(&token).await }, |_| {});

    view! {
        <section class="account-form">
            <h1>"Account activation"</h1>
            {status_line(status)}
            <p><A href="/login">"Continue to sign in"</A></p>
        </section>
    }
}

#[component]
/// Requests a password-reset email.
pub fn ForgotPasswordPage() -> impl IntoView {
    let context = use_drive_context();
    let email = create_rw_signal(String::new());
    let status = create_rw_signal(FormStatus::Idle);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let auth = context.auth.clone();
        let task = async move { auth.forgot_password(&email.get_untracked()).await };
        submit(status, task, |_| {});
    };

    view! {
        <form class="account-form" on:submit=on_submit>
            <h1>"Reset password"</h1>
            {text_field("Email", "email", email)}
            <button type="submit" disabled=move || status.get() == FormStatus::Busy>"Send reset link"</button>
            {status_line(status)}
            <p><A href="/login">"Back to sign in"</A></p>
        </form>
    }
}

#[component]
/// Sets a new password using the `token` query parameter from the reset email.
pub fn ResetPasswordPage() -> impl IntoView {
    let context = use_drive_context();
    let navigate = use_navigate();
    let token = use_query_map()
        .with_untracked(|query| query.get("token").cloned())
        .unwrap_or_default();
    let password = create_rw_signal(String::new());
    let confirm = create_rw_signal(String::new());
    let status = create_rw_signal(FormStatus::Idle);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if password.get_untracked() != confirm.get_untracked() {
            status.set(FormStatus::Failed("Passwords do not match.".to_string()));
            return;
        }
        let auth = context.auth.clone();
        let token = token.clone();
        let navigate = navigate.clone();
        let task = async move { auth.reset_password(&token, &password.get_untracked()).await };
        submit(status, task, move |_| {
            navigate("/login", NavigateOptions::default());
        });
    };

    view! {
        <form class="account-form" on:submit=on_submit>
            <h1>"Choose a new password"</h1>
            {text_field("New password", "password", password)}
            {text_field("Confirm password", "password", confirm)}
            <button type="submit" disabled=move || status.get() == FormStatus::Busy>"Save password"</button>
            {status_line(status)}
        </form>
    }
}
