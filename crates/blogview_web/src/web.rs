use blogview::chart::ChartSpec;
use blogview::config::ViewerConfig;
use blogview::controls::{DisplayMode, PanelVisibility};
use blogview::playback::{drive_while, Playback, PlaybackEnd, PlaybackRuns};
use blogview::renderer::ChartRenderer;
use blogview::response::DropdownOption;
use blogview::session::{Applied, Completion, Session};
use blogview::snippet::SnippetRequest;
use blogview::submission::SubmissionForm;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::ui_model::{overlay_lines, RadioGroup};

mod charts;
mod http;
mod storage;

use charts::{CanvasSurface, DrawHandle};

/// Optional inline JSON config: `<script id="blogview-config" type="application/json">`.
const CONFIG_ELEMENT_ID: &str = "blogview-config";

const STYLE: &str = r#"
.editor { position: relative; font: 13px/1.4 ui-monospace, Menlo, monospace; }
.editor pre, .editor textarea { margin: 0; padding: 8px; width: 100%; min-height: 260px; box-sizing: border-box; white-space: pre-wrap; word-wrap: break-word; font: inherit; border: 1px solid #ccc; }
.editor pre { position: absolute; inset: 0; pointer-events: none; color: #222; border-color: transparent; }
.editor textarea { position: relative; background: transparent; color: transparent; caret-color: #222; resize: vertical; }
.cm-keyword { color: #708; font-weight: bold; }
.cm-tag { color: #170; }
.cm-atom { color: #219; }
.status { color: #555; }
"#;

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

fn alert(msg: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(msg);
    }
}

fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

fn load_config() -> ViewerConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|e| e.text_content());
    match raw {
        Some(text) => ViewerConfig::from_json(&text).unwrap_or_else(|e| {
            warn(&format!("ignoring #{CONFIG_ELEMENT_ID}: {e}"));
            ViewerConfig::default()
        }),
        None => ViewerConfig::default(),
    }
}

type Renderer = StoredValue<ChartRenderer<CanvasSurface>, LocalStorage>;

/// Draw the query at `index` of the current result set.
fn draw_index(
    renderer: Renderer,
    session: StoredValue<Session>,
    index: usize,
) -> Result<DrawHandle, String> {
    let entry = session
        .with_value(|s| s.results().entry(index).cloned())
        .ok_or_else(|| format!("no query at index {index}"))?;
    let mut out = None;
    renderer.update_value(|r| {
        let spec = ChartSpec::for_entry(&entry, r.config());
        out = Some(r.draw_spec(spec).map_err(|e| e.to_string()));
    });
    out.unwrap_or_else(|| Err("chart renderer disposed".to_string()))
}

#[component]
fn App() -> impl IntoView {
    let cfg = load_config();
    let initial = storage::load_selections(&cfg);

    let session = StoredValue::new(Session::new());
    let renderer: Renderer =
        StoredValue::new_local(ChartRenderer::new(cfg.ids.chart.clone(), cfg.chart.clone()));
    // A running playback stops once its run id is no longer current.
    let play_gen = StoredValue::new(PlaybackRuns::default());

    let text = RwSignal::new(String::new());
    let selections = RwSignal::new(initial.clone());
    let slider = RwSignal::new(initial.slider(&cfg));
    let (panels, set_panels) = signal(PanelVisibility::idle());
    let (log_text, set_log_text) = signal(String::new());
    let (options, set_options) = signal(Vec::<DropdownOption>::new());
    let (selected, set_selected) = signal(0usize);
    let (user_text, set_user_text) = signal(DisplayMode::None);
    let (status, set_status) = signal(String::new());

    Effect::new(move |_| storage::save_selections(&selections.get()));

    let sync_panels = move || set_panels.set(session.with_value(|s| s.panels()));

    let show_first = move |applied: Applied| {
        set_log_text.set(applied.log_text);
        set_options.set(applied.options);
        set_selected.set(0);
        let Some(index) = applied.show_first else {
            sync_panels();
            set_status.set("no queries in response".to_string());
            return;
        };
        match draw_index(renderer, session, index) {
            Ok(handle) => spawn_local(async move {
                let _ = JsFuture::from(handle.ready).await;
                // A newer submission owns the panels now.
                if session.with_value(|s| s.in_flight().is_none()) {
                    session.update_value(|s| s.chart_ready());
                    sync_panels();
                }
            }),
            Err(e) => {
                session.update_value(|s| s.chart_ready());
                sync_panels();
                set_status.set(format!("chart failed: {e}"));
            }
        }
    };

    let submit_url = cfg.submit_url.clone();
    let do_submit = move || {
        let sel = selections.get_untracked();
        let form = SubmissionForm::new(text.get_untracked(), sel.base, sel.engine, sel.algorithm);

        let mut begun = None;
        session.update_value(|s| begun = Some(s.begin(form)));
        let pending = match begun {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                alert(&e.to_string());
                return;
            }
            None => return,
        };

        play_gen.update_value(PlaybackRuns::cancel);
        sync_panels();
        set_status.set("computing...".to_string());

        let ticket = pending.ticket();
        let fields: Vec<(String, String)> = pending
            .fields()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let url = submit_url.clone();

        spawn_local(async move {
            let refs: Vec<(&str, &str)> =
                fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let body = match http::post_form(&url, &refs).await {
                Ok(body) => body,
                Err(e) => {
                    let mut current = false;
                    session.update_value(|s| current = s.fail(ticket));
                    if current {
                        sync_panels();
                        set_status.set(e.clone());
                        alert(&e);
                    } else {
                        warn(&format!("superseded submission failed: {e}"));
                    }
                    return;
                }
            };

            let mut outcome = None;
            session.update_value(|s| outcome = Some(s.complete(ticket, &body)));
            match outcome {
                Some(Ok(Completion::Applied(applied))) => {
                    set_status.set(format!("{} queries", applied.options.len()));
                    show_first(applied);
                }
                Some(Ok(Completion::Stale(t))) => {
                    warn(&format!("dropping stale response for submission {}", t.id()));
                }
                Some(Err(e)) => {
                    sync_panels();
                    set_status.set(e.to_string());
                    alert(&e.to_string());
                }
                None => {}
            }
        });
    };

    let do_select = move |index: usize| {
        let mut found = false;
        session.update_value(|s| found = s.select(index).is_some());
        if !found {
            return;
        }
        // A manual pick ends any running playback.
        play_gen.update_value(PlaybackRuns::cancel);
        set_selected.set(index);
        if let Err(e) = draw_index(renderer, session, index) {
            set_status.set(format!("chart failed: {e}"));
        }
    };

    let do_play = move || {
        let total = session.with_value(|s| s.results().len());
        if total == 0 {
            return;
        }
        let mut generation = 0;
        play_gen.update_value(|runs| generation = runs.start());

        spawn_local(async move {
            let end = drive_while(
                Playback::full(total),
                move || play_gen.with_value(|runs| runs.is_current(generation)),
                move |index| {
                    session.update_value(|s| {
                        s.select(index);
                    });
                    set_selected.set(index);
                    let handle = draw_index(renderer, session, index);
                    async move {
                        let handle = handle?;
                        JsFuture::from(handle.finished)
                            .await
                            .map(|_| ())
                            .map_err(|_| "animation promise rejected".to_string())
                    }
                },
            )
            .await;
            match end {
                Ok(PlaybackEnd::Completed(n)) => set_status.set(format!("played {n} charts")),
                Ok(PlaybackEnd::Cancelled(n)) => {
                    set_status.set(format!("playback stopped after {n}"))
                }
                Err(e) => set_status.set(format!("playback failed: {e}")),
            }
        });
    };

    let snippet_url = cfg.snippet_url.clone();
    let do_load_snippet = move |name: String| {
        if name.is_empty() {
            return;
        }
        let url = snippet_url.clone();
        spawn_local(async move {
            let req = SnippetRequest::new(name);
            match http::post_form(&url, &req.fields()).await {
                Ok(body) => text.set(SnippetRequest::editor_text(body)),
                Err(e) => {
                    set_status.set(e.clone());
                    alert(&e);
                }
            }
        });
    };

    let set_choice = move |group: RadioGroup, value: String| {
        if group == RadioGroup::Base {
            slider.update(|s| {
                s.apply_base(&value);
            });
            let samples = slider.get_untracked().value;
            selections.update(|p| p.samples = samples);
        }
        selections.update(|p| p.set(group, value));
    };

    let on_slider = move |raw: String| {
        slider.update(|s| {
            s.on_input(&raw);
        });
        let samples = slider.get_untracked().value;
        selections.update(|p| p.samples = samples);
    };

    let ids = cfg.ids.clone();
    let radio_groups = RadioGroup::all()
        .iter()
        .map(|&group| {
            let choices = group.choices(&cfg).to_vec();
            view! {
                <fieldset class="radio-group">
                    <legend>{group.label()}</legend>
                    {choices
                        .into_iter()
                        .map(|choice| {
                            let c_checked = choice.clone();
                            let c_change = choice.clone();
                            view! {
                                <label style="margin-right: 10px;">
                                    <input
                                        type="radio"
                                        name=group.field()
                                        value=choice.clone()
                                        prop:checked=move || {
                                            selections.get().get(group) == c_checked
                                        }
                                        on:change=move |_| set_choice(group, c_change.clone())
                                    />
                                    {choice}
                                </label>
                            }
                        })
                        .collect_view()}
                </fieldset>
            }
        })
        .collect_view();

    let snippet_names = cfg.snippets.clone();

    view! {
        <style>{STYLE}</style>
        <main style="font-family: system-ui, -apple-system, Segoe UI, Roboto, sans-serif; padding: 18px; max-width: 960px; margin: 0 auto;">
            <h1 style="margin: 0 0 8px 0;">"BLOG model viewer"</h1>

            <section style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 10px; align-items: center;">
                <label>
                    "Example: "
                    <select
                        id=ids.snippet_select.clone()
                        on:change=move |ev| do_load_snippet(event_target_value(&ev))
                    >
                        <option value="">"(choose a file)"</option>
                        {snippet_names
                            .into_iter()
                            .map(|n| view! { <option value=n.clone()>{n}</option> })
                            .collect_view()}
                    </select>
                </label>
                <button on:click=move |_| set_user_text.set(user_text.get_untracked().toggle())>
                    "Help"
                </button>
                <span class="status">{move || status.get()}</span>
            </section>

            <div id=ids.user_text.clone() style:display=move || user_text.get().css()>
                <p style="color: #555;">
                    "Write a model, pick the number of samples, an engine and an algorithm, then Run. "
                    "ParticleFilter needs a dynamic model (one that uses @ timesteps)."
                </p>
            </div>

            <div class="editor">
                <pre aria-hidden="true">
                    {move || {
                        overlay_lines(&text.get())
                            .into_iter()
                            .map(|line| {
                                view! {
                                    <div>
                                        {line
                                            .into_iter()
                                            .map(|p| {
                                                let class = p.class.unwrap_or("");
                                                view! { <span class=class>{p.text}</span> }
                                            })
                                            .collect_view()}
                                        "\u{200b}"
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </pre>
                <textarea
                    id=ids.editor.clone()
                    spellcheck="false"
                    prop:value=move || text.get()
                    on:input=move |ev| text.set(event_target_value(&ev))
                ></textarea>
            </div>

            <section style="margin: 12px 0;">{radio_groups}</section>

            <section style="display: flex; gap: 10px; align-items: center; margin-bottom: 12px;">
                <input
                    type="range"
                    id=ids.slider.clone()
                    prop:min=move || slider.get().min.to_string()
                    prop:max=move || slider.get().max.to_string()
                    prop:value=move || slider.get().value.to_string()
                    on:input=move |ev| on_slider(event_target_value(&ev))
                />
                <span id=ids.slider_label.clone()>{move || slider.get().label()}</span>
                <button on:click=move |_| do_submit()>"Run"</button>
            </section>

            <div id=ids.computing.clone() style:display=move || panels.get().computing.css()>
                "Computing..."
            </div>

            <div id=ids.result_panel.clone() style:display=move || panels.get().result.css()>
                <section style="display: flex; gap: 10px; align-items: center; margin-bottom: 8px;">
                    <select
                        id=ids.dropdown.clone()
                        prop:value=move || selected.get().to_string()
                        on:change=move |ev| {
                            if let Ok(i) = event_target_value(&ev).parse::<usize>() {
                                do_select(i);
                            }
                        }
                    >
                        {move || {
                            options
                                .get()
                                .into_iter()
                                .map(|o| {
                                    let value = o.value.to_string();
                                    view! { <option value=value>{o.label}</option> }
                                })
                                .collect_view()
                        }}
                    </select>
                    <button on:click=move |_| do_play()>"Play"</button>
                </section>
                <div id=ids.chart.clone()></div>
            </div>

            <div id=ids.log_panel.clone() style:display=move || panels.get().log.css()>
                <h3 style="margin: 12px 0 4px 0;">"Log"</h3>
                <textarea
                    id=ids.log_text.clone()
                    readonly=true
                    style="width: 100%; min-height: 160px; font-family: ui-monospace, monospace;"
                    prop:value=move || log_text.get()
                ></textarea>
            </div>
        </main>
    }
}
